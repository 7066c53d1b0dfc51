//! In-memory raster source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::data::{RasterSource, RawBand};
use crate::error::AnalysisError;

/// Serves pre-built bands keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bands: HashMap<PathBuf, RawBand>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, band: RawBand) {
        self.bands.insert(path.into(), band);
    }

    pub fn with_band(mut self, path: impl Into<PathBuf>, band: RawBand) -> Self {
        self.insert(path, band);
        self
    }
}

impl RasterSource for MemorySource {
    fn read_first_band(&self, path: &Path) -> Result<RawBand, AnalysisError> {
        self.bands.get(path).cloned().ok_or_else(|| AnalysisError::Raster {
            path: path.display().to_string(),
            message: "no such in-memory band".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_bands_by_path() {
        let band = RawBand::new(1, 2, vec![1.0, 2.0], Some(-1.0)).unwrap();
        let source = MemorySource::new().with_band("a", band.clone());
        assert_eq!(source.read_first_band(Path::new("a")).unwrap(), band);
        assert!(source.read_first_band(Path::new("b")).is_err());
    }
}
