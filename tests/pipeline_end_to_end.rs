//! End-to-end runs over GeoTIFF files written to a temporary directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use gridcorr::app::pipeline::{run_correlation, run_grouped};
use gridcorr::data::{GeoTiffSource, SyntheticPair, SyntheticParams};
use gridcorr::domain::{AnalysisConfig, Reduction};
use gridcorr::error::{AnalysisError, AppError};
use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::Gray32Float;
use tiff::tags::Tag;

const NODATA: f32 = -9999.0;

fn write_tiff(path: &Path, width: u32, height: u32, data: &[f32]) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder.new_image::<Gray32Float>(width, height).unwrap();
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(42113), "-9999")
        .unwrap();
    image.write_data(data).unwrap();
}

fn raster(dir: &Path, name: &str, width: u32, height: u32, data: &[f32]) -> PathBuf {
    let path = dir.join(name);
    write_tiff(&path, width, height, data);
    path
}

#[test]
fn identical_rasters_correlate_perfectly_and_aggregate_their_own_maxima() {
    let dir = tempfile::tempdir().unwrap();
    let (width, height) = (40u32, 30u32);
    let data: Vec<f32> = (0..width * height)
        .map(|i| {
            if i % 17 == 0 {
                NODATA
            } else {
                0.5 + ((i * 37) % 95) as f32 * 0.1
            }
        })
        .collect();
    let a = raster(dir.path(), "a.tif", width, height, &data);

    let mut config = AnalysisConfig::new(&a, &a);
    config.target_width = width as usize;
    config.target_height = height as usize;
    config.bin_width = 1.0;

    let run = run_grouped(&GeoTiffSource, &config).unwrap();

    let valid: Vec<f64> = data.iter().filter(|&&v| v != NODATA).map(|&v| v as f64).collect();
    assert_eq!(run.stats.valid_pairs, valid.len());
    assert!((run.correlation.coefficient - 1.0).abs() < 1e-9);

    for point in &run.aggregates {
        let k = point.bucket;
        let expected = valid
            .iter()
            .copied()
            .filter(|&v| (v / config.bin_width).floor() as usize == k)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(point.y, expected, "bucket {k}");
        assert!((point.x - (k as f64 + 0.5)).abs() < 1e-12);
    }
    assert!(run.trim.removed.is_empty());
}

#[test]
fn window_larger_than_raster_is_a_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = vec![1.0f32; 100];
    let a = raster(dir.path(), "a.tif", 10, 10, &data);
    let b = raster(dir.path(), "b.tif", 10, 10, &data);

    let mut config = AnalysisConfig::new(&a, &b);
    config.target_width = 20;
    config.target_height = 20;

    let err = run_correlation(&GeoTiffSource, &config).unwrap_err();
    assert!(matches!(err, AnalysisError::Shape { .. }));
    assert_eq!(AppError::from(err).exit_code(), 3);
}

#[test]
fn constant_raster_is_degenerate() {
    let dir = tempfile::tempdir().unwrap();
    let a = raster(dir.path(), "a.tif", 4, 3, &[2.0f32; 12]);
    let b_data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let b = raster(dir.path(), "b.tif", 4, 3, &b_data);

    let mut config = AnalysisConfig::new(&a, &b);
    config.target_width = 4;
    config.target_height = 3;

    let err = run_correlation(&GeoTiffSource, &config).unwrap_err();
    assert!(matches!(err, AnalysisError::DegenerateInput(_)));
}

#[test]
fn synthetic_geotiffs_recover_the_generating_curve() {
    let params = SyntheticParams::default();
    let pair = SyntheticPair::generate(&params).unwrap();
    let to_f32 = |v: &[f64]| v.iter().map(|&x| x as f32).collect::<Vec<f32>>();

    let dir = tempfile::tempdir().unwrap();
    let (w, h) = (params.cols as u32, params.rows as u32);
    let a = raster(dir.path(), "a.tif", w, h, &to_f32(&pair.a.values));
    let b = raster(dir.path(), "b.tif", w, h, &to_f32(&pair.b.values));

    // Crop a little to exercise the alignment window.
    let mut config = AnalysisConfig::new(&a, &b);
    config.target_width = params.cols - 10;
    config.target_height = params.rows - 10;
    config.bin_width = 0.25;
    config.reduction = Reduction::Median;

    let run = run_grouped(&GeoTiffSource, &config).unwrap();
    assert_eq!(run.stats.cells, (params.cols - 10) * (params.rows - 10));
    assert!(run.correlation.coefficient < -0.5);
    assert!((run.fit.a - params.amplitude).abs() / params.amplitude < 0.1, "a = {}", run.fit.a);
    assert!((run.fit.b - params.rate).abs() / params.rate < 0.1, "b = {}", run.fit.b);
}
