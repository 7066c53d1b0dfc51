//! Command-line parsing for the raster correlation tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the numerical code. Every numeric knob also reads a `GRIDCORR_*`
//! environment variable (and therefore a `.env` file) when the flag is absent.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{AnalysisConfig, ExpModel, Reduction};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gridcorr", version, about = "Correlate two rasters and fit a binned exponential relationship")]
pub struct Cli {
    /// Log pipeline details (DEBUG level) to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pearson correlation of the cells valid in both rasters.
    Correlate(CorrelateArgs),
    /// Bin raster A, reduce raster B per bucket, trim outliers and fit an exponential.
    Grouped(GroupedArgs),
    /// Run the grouped pipeline on a seeded synthetic raster pair.
    Demo(DemoArgs),
    /// Plot a previously exported result JSON.
    Plot(PlotArgs),
}

/// Inputs and the common window shared by every analysis.
#[derive(Debug, Args, Clone)]
pub struct WindowArgs {
    /// Target window width (columns), cropped from the top-left corner.
    #[arg(long, env = "GRIDCORR_WIDTH", default_value_t = AnalysisConfig::DEFAULT_WIDTH)]
    pub width: usize,

    /// Target window height (rows), cropped from the top-left corner.
    #[arg(long, env = "GRIDCORR_HEIGHT", default_value_t = AnalysisConfig::DEFAULT_HEIGHT)]
    pub height: usize,
}

/// Terminal/SVG output options.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub plot_width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub plot_height: usize,

    /// Also write the chart to an SVG file.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Export the full result (inputs, statistics, fit, curve grid) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

impl OutputArgs {
    pub fn show_plot(&self) -> bool {
        self.plot && !self.no_plot
    }
}

#[derive(Debug, Parser, Clone)]
pub struct CorrelateArgs {
    /// Raster A (GeoTIFF).
    pub raster_a: PathBuf,

    /// Raster B (GeoTIFF).
    pub raster_b: PathBuf,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Export the validated pairs to CSV (`index,a,b`).
    #[arg(long = "export-pairs", value_name = "CSV")]
    pub export_pairs: Option<PathBuf>,
}

/// Binning and fit knobs.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Bucket width along raster A.
    #[arg(long, env = "GRIDCORR_BIN_WIDTH", default_value_t = AnalysisConfig::DEFAULT_BIN_WIDTH)]
    pub bin_width: f64,

    /// Reduction applied to raster B within each bucket.
    #[arg(long, value_enum, env = "GRIDCORR_REDUCE", default_value_t = Reduction::Max)]
    pub reduce: Reduction,

    /// Aggregates above mean + SIGMA·std are dropped before fitting.
    #[arg(long, env = "GRIDCORR_OUTLIER_SIGMA", default_value_t = AnalysisConfig::DEFAULT_OUTLIER_SIGMA)]
    pub outlier_sigma: f64,

    /// Sign convention of the exponential model.
    #[arg(long, value_enum, env = "GRIDCORR_MODEL", default_value_t = ExpModel::Decay)]
    pub model: ExpModel,

    /// Initial amplitude (default: largest aggregate).
    #[arg(long, env = "GRIDCORR_A0", allow_negative_numbers = true)]
    pub a0: Option<f64>,

    /// Initial rate (default: seed search).
    #[arg(long, env = "GRIDCORR_B0", allow_negative_numbers = true)]
    pub b0: Option<f64>,

    /// Solver iteration budget.
    #[arg(long, env = "GRIDCORR_MAX_ITER", default_value_t = 200)]
    pub max_iter: usize,

    /// Show the N aggregates furthest from the fitted curve.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct GroupedArgs {
    /// Raster A (GeoTIFF), the binned variable.
    pub raster_a: PathBuf,

    /// Raster B (GeoTIFF), the reduced variable.
    pub raster_b: PathBuf,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub fit: FitArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Export every aggregate point to CSV (`bucket,x,y,count,retained`).
    #[arg(long = "export-points", value_name = "CSV")]
    pub export_points: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Synthetic raster rows.
    #[arg(long, default_value_t = 120)]
    pub rows: usize,

    /// Synthetic raster columns.
    #[arg(long, default_value_t = 140)]
    pub cols: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// True amplitude of the generated relationship.
    #[arg(long, default_value_t = 5.0)]
    pub amplitude: f64,

    /// True decay rate of the generated relationship.
    #[arg(long, default_value_t = 0.3)]
    pub rate: f64,

    /// Standard deviation of the log-noise on raster B.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Probability that a generated cell is nodata.
    #[arg(long, default_value_t = 0.05)]
    pub nodata_prob: f64,

    #[command(flatten)]
    pub fit: FitArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for plotting a saved result.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Result JSON file produced by `--export-json`.
    #[arg(long, value_name = "JSON")]
    pub result: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also write the chart to an SVG file.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn grouped_defaults() {
        let cli = Cli::try_parse_from(["gridcorr", "grouped", "a.tif", "b.tif"]).unwrap();
        let Command::Grouped(args) = cli.command else {
            panic!("expected grouped");
        };
        assert_eq!(args.window.width, 275);
        assert_eq!(args.window.height, 254);
        assert_eq!(args.fit.bin_width, 0.001);
        assert_eq!(args.fit.reduce, Reduction::Max);
        assert_eq!(args.fit.outlier_sigma, 3.0);
        assert_eq!(args.fit.model, ExpModel::Decay);
        assert_eq!(args.fit.max_iter, 200);
        assert!(args.output.show_plot());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "gridcorr",
            "-v",
            "grouped",
            "a.tif",
            "b.tif",
            "--bin-width",
            "0.5",
            "--reduce",
            "median",
            "--model",
            "growth",
            "--b0",
            "-0.2",
            "--no-plot",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Grouped(args) = cli.command else {
            panic!("expected grouped");
        };
        assert_eq!(args.fit.bin_width, 0.5);
        assert_eq!(args.fit.reduce, Reduction::Median);
        assert_eq!(args.fit.model, ExpModel::Growth);
        assert_eq!(args.fit.b0, Some(-0.2));
        assert!(!args.output.show_plot());
    }
}
