//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the correlation or grouped pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, CorrelateArgs, DemoArgs, FitArgs, GroupedArgs, OutputArgs, PlotArgs, WindowArgs};
use crate::data::{GeoTiffSource, RasterSource, SyntheticPair, SyntheticParams};
use crate::domain::{AnalysisConfig, FitOptions, InitialGuess, ResultFile};
use crate::error::AppError;
use crate::plot::Chart;

pub mod pipeline;

const SVG_SIZE: (u32, u32) = (960, 640);

/// Entry point for the `gridcorr` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.verbose)?;

    match cli.command {
        Command::Correlate(args) => handle_correlate(args),
        Command::Grouped(args) => handle_grouped(args),
        Command::Demo(args) => handle_demo(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_correlate(args: CorrelateArgs) -> Result<(), AppError> {
    let mut config = AnalysisConfig::new(&args.raster_a, &args.raster_b);
    apply_window(&mut config, &args.window);

    let run = pipeline::run_correlation(&GeoTiffSource, &config)?;
    println!("{}", crate::report::format_correlation_summary(&run, &config));

    let chart = Chart::from_correlation(&run);
    present(&chart, &args.output)?;

    if let Some(path) = &args.export_pairs {
        crate::io::write_pairs_csv(path, &run.pairs)?;
    }
    if let Some(path) = &args.output.export_json {
        crate::io::write_result_json(path, &crate::io::correlation_result(&run, &config))?;
    }

    Ok(())
}

fn handle_grouped(args: GroupedArgs) -> Result<(), AppError> {
    let mut config = AnalysisConfig::new(&args.raster_a, &args.raster_b);
    apply_window(&mut config, &args.window);
    apply_fit(&mut config, &args.fit);

    let run = grouped(&GeoTiffSource, &config, &args.fit, &args.output)?;
    if let Some(path) = &args.export_points {
        crate::io::write_aggregates_csv(path, &run.aggregates, &run.trim)?;
    }
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let params = SyntheticParams {
        rows: args.rows,
        cols: args.cols,
        seed: args.seed,
        amplitude: args.amplitude,
        rate: args.rate,
        noise: args.noise,
        nodata_prob: args.nodata_prob,
        ..SyntheticParams::default()
    };
    let source = SyntheticPair::generate(&params)?.into_source("synthetic-a", "synthetic-b");

    let mut config = AnalysisConfig::new("synthetic-a", "synthetic-b");
    config.target_width = params.cols;
    config.target_height = params.rows;
    apply_fit(&mut config, &args.fit);

    println!(
        "Synthetic pair: {}x{} seed={} true a={} b={}\n",
        params.rows, params.cols, params.seed, params.amplitude, params.rate
    );
    grouped(&source, &config, &args.fit, &args.output)?;
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let result: ResultFile = crate::io::read_result_json(&args.result)?;
    let chart = Chart::from_result(&result);

    println!("{}", crate::plot::render_ascii_plot(&chart, args.width, args.height));
    if let Some(path) = &args.svg {
        crate::plot::write_svg_plot(path, &chart, SVG_SIZE.0, SVG_SIZE.1)?;
    }
    Ok(())
}

/// Shared tail of `grouped` and `demo`: run, report, plot, export JSON.
fn grouped<S: RasterSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
    fit: &FitArgs,
    output: &OutputArgs,
) -> Result<pipeline::GroupedRun, AppError> {
    let run = pipeline::run_grouped(source, config)?;

    println!("{}", crate::report::format_grouped_summary(&run, config));
    let residuals = crate::report::compute_residuals(&run.trim.retained, &run.fit)?;
    if fit.top > 0 {
        println!("Largest residuals:");
        println!(
            "{}",
            crate::report::format_residual_table(&crate::report::largest_residuals(&residuals, fit.top))
        );
    }

    present(&Chart::from_grouped(&run), output)?;
    if let Some(path) = &output.export_json {
        crate::io::write_result_json(path, &crate::io::grouped_result(&run, config))?;
    }
    Ok(run)
}

fn present(chart: &Chart, output: &OutputArgs) -> Result<(), AppError> {
    if output.show_plot() {
        println!(
            "{}",
            crate::plot::render_ascii_plot(chart, output.plot_width, output.plot_height)
        );
    }
    if let Some(path) = &output.svg {
        crate::plot::write_svg_plot(path, chart, SVG_SIZE.0, SVG_SIZE.1)?;
    }
    Ok(())
}

fn apply_window(config: &mut AnalysisConfig, window: &WindowArgs) {
    config.target_width = window.width;
    config.target_height = window.height;
}

fn apply_fit(config: &mut AnalysisConfig, args: &FitArgs) {
    config.bin_width = args.bin_width;
    config.reduction = args.reduce;
    config.outlier_sigma = args.outlier_sigma;
    config.model = args.model;
    config.initial_guess = InitialGuess { a: args.a0, b: args.b0 };
    config.fit_options = FitOptions {
        max_iterations: args.max_iter,
        ..FitOptions::default()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_flags_flow_into_config() {
        let cli = crate::cli::Cli::try_parse_from([
            "gridcorr", "grouped", "a.tif", "b.tif", "--width", "10", "--height", "8", "--a0", "4", "--max-iter",
            "50", "--outlier-sigma", "2.5",
        ])
        .unwrap();
        let Command::Grouped(args) = cli.command else {
            panic!("expected grouped");
        };
        let mut config = AnalysisConfig::new(&args.raster_a, &args.raster_b);
        apply_window(&mut config, &args.window);
        apply_fit(&mut config, &args.fit);

        assert_eq!((config.target_width, config.target_height), (10, 8));
        assert_eq!(config.initial_guess, InitialGuess { a: Some(4.0), b: None });
        assert_eq!(config.fit_options.max_iterations, 50);
        assert_eq!(config.outlier_sigma, 2.5);
    }
}
