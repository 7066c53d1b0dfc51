//! Export paired samples and aggregate points to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use serde::Serialize;

use crate::binning::OutlierTrim;
use crate::domain::AggregatePoint;
use crate::error::AppError;
use crate::stats::ValidPairs;

#[derive(Debug, Serialize)]
struct PairRow {
    index: usize,
    a: f64,
    b: f64,
}

#[derive(Debug, Serialize)]
struct AggregateRow {
    bucket: usize,
    x: f64,
    y: f64,
    count: usize,
    retained: bool,
}

/// Write the validated pairs (`index,a,b`), `index` being the row-major cell index.
pub fn write_pairs_csv(path: &Path, pairs: &ValidPairs) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create pairs CSV '{}': {e}", path.display())))?;

    for ((&index, &a), &b) in pairs.indices.iter().zip(&pairs.a).zip(&pairs.b) {
        writer
            .serialize(PairRow { index, a, b })
            .map_err(|e| AppError::new(2, format!("Failed to write pairs CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush pairs CSV: {e}")))?;
    Ok(())
}

/// Write every aggregate point (`bucket,x,y,count,retained`), flagging the ones
/// the outlier trim removed.
pub fn write_aggregates_csv(path: &Path, aggregates: &[AggregatePoint], trim: &OutlierTrim) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create aggregate CSV '{}': {e}", path.display())))?;

    for p in aggregates {
        let retained = !trim.removed.iter().any(|r| r.bucket == p.bucket);
        writer
            .serialize(AggregateRow {
                bucket: p.bucket,
                x: p.x,
                y: p.y,
                count: p.count,
                retained,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write aggregate CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush aggregate CSV: {e}")))?;
    Ok(())
}
