//! GeoTIFF reading via the `tiff` crate.
//!
//! Only what the pipeline needs is decoded: the first band, the native shape and
//! the GDAL nodata tag. Georeferencing tags are ignored; callers pick target
//! dimensions that describe the common overlap of their inputs.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use num_traits::ToPrimitive;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::data::{RasterSource, RawBand};
use crate::error::AnalysisError;

/// `GDAL_NODATA` private tag (ASCII).
pub const GDAL_NODATA_TAG: u16 = 42113;

/// Reads GeoTIFF files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffSource;

impl RasterSource for GeoTiffSource {
    fn read_first_band(&self, path: &Path) -> Result<RawBand, AnalysisError> {
        let file = File::open(path).map_err(|e| raster_err(path, format!("cannot open: {e}")))?;
        // The handle is dropped when decoding returns, on success or failure.
        decode_first_band(BufReader::new(file)).map_err(|message| raster_err(path, message))
    }
}

/// Decode the first band of a TIFF from any `Read + Seek` source.
pub fn decode_first_band<R: Read + Seek>(reader: R) -> Result<RawBand, String> {
    let mut decoder = Decoder::new(reader).map_err(|e| format!("TIFF decode error: {e}"))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| format!("cannot read dimensions: {e}"))?;
    let rows = height as usize;
    let cols = width as usize;

    let nodata = read_nodata(&mut decoder)?;

    let image = decoder
        .read_image()
        .map_err(|e| format!("cannot read image data: {e}"))?;

    // The sentinel is compared against widened samples, so a float32 band needs
    // it rounded to f32 first (GDAL writes e.g. "-3.4e+38"). Integer sentinels
    // widen exactly; a fractional one matches no integer sample either way.
    let (samples, nodata) = match image {
        DecodingResult::U8(buf) => (to_f64(buf), nodata),
        DecodingResult::U16(buf) => (to_f64(buf), nodata),
        DecodingResult::U32(buf) => (to_f64(buf), nodata),
        DecodingResult::U64(buf) => (to_f64(buf), nodata),
        DecodingResult::I8(buf) => (to_f64(buf), nodata),
        DecodingResult::I16(buf) => (to_f64(buf), nodata),
        DecodingResult::I32(buf) => (to_f64(buf), nodata),
        DecodingResult::I64(buf) => (to_f64(buf), nodata),
        DecodingResult::F32(buf) => (to_f64(buf), nodata.map(as_f32_sample)),
        DecodingResult::F64(buf) => (buf, nodata),
        #[allow(unreachable_patterns)]
        _ => return Err("unsupported TIFF sample format".to_string()),
    };

    let cells = rows * cols;
    if cells == 0 || samples.len() % cells != 0 {
        return Err(format!(
            "decoded {} samples, not a multiple of {rows}x{cols} cells",
            samples.len()
        ));
    }

    // Chunky (pixel-interleaved) layout: band 0 is every `stride`-th sample.
    let stride = samples.len() / cells;
    let values = if stride == 1 {
        samples
    } else {
        samples.into_iter().step_by(stride).collect()
    };

    RawBand::new(rows, cols, values, nodata).map_err(|e| e.to_string())
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>, String> {
    let tag = Tag::from_u16_exhaustive(GDAL_NODATA_TAG);
    let Some(value) = decoder
        .find_tag(tag)
        .map_err(|e| format!("cannot read GDAL_NODATA tag: {e}"))?
    else {
        return Ok(None);
    };

    let text = value
        .into_string()
        .map_err(|e| format!("GDAL_NODATA tag is not text: {e}"))?;
    parse_nodata(&text).map(Some)
}

/// Parse a GDAL nodata string (`"-9999"`, `"nan"`, `"-3.4e+38"`, ...).
pub fn parse_nodata(text: &str) -> Result<f64, String> {
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| format!("invalid GDAL_NODATA value '{trimmed}'"))
}

/// `value` as stored in an f32 sample, widened back to f64.
///
/// Values outside the f32 range are returned unchanged; no sample can equal them.
fn as_f32_sample(value: f64) -> f64 {
    let narrowed = value as f32;
    if narrowed.is_finite() || !value.is_finite() {
        narrowed as f64
    } else {
        value
    }
}

fn to_f64<T: ToPrimitive>(buf: Vec<T>) -> Vec<f64> {
    buf.into_iter().map(|v| v.to_f64().unwrap_or(f64::NAN)).collect()
}

fn raster_err(path: &Path, message: impl Into<String>) -> AnalysisError {
    AnalysisError::Raster {
        path: path.display().to_string(),
        message: message.into(),
    }
}
