//! Plotters-powered SVG chart.
//!
//! The chart is data-driven: series and bounds come from `Chart`, this module only
//! draws them.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::plot::Chart;

/// Write `chart` as an SVG file of `width` x `height` pixels.
pub fn write_svg_plot(path: &Path, chart: &Chart, width: u32, height: u32) -> Result<(), AppError> {
    if width < 100 || height < 100 {
        return Err(AppError::new(
            2,
            format!("SVG size {width}x{height} is too small (minimum 100x100)."),
        ));
    }
    draw(path, chart, width, height)
        .map_err(|e| AppError::new(2, format!("Failed to render SVG plot '{}': {e}", path.display())))
}

fn draw(path: &Path, chart: &Chart, width: u32, height: u32) -> Result<(), Box<dyn std::error::Error>> {
    let ([x0, x1], [y0, y1]) = chart.bounds().unwrap_or(([0.0, 1.0], [0.0, 1.0]));
    let (x0, x1) = pad(x0, x1);
    let (y0, y1) = pad(y0, y1);

    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 16))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_labels(6)
        .y_labels(6)
        .draw()?;

    let points_color = RGBColor(40, 40, 40);
    let removed_color = RGBColor(220, 30, 30);
    let curve_color = RGBColor(0, 120, 200);

    // 1) Observed points.
    ctx.draw_series(
        chart
            .points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 2, points_color.filled())),
    )?;

    // 2) Trimmed outliers.
    ctx.draw_series(
        chart
            .removed
            .iter()
            .map(|&(x, y)| Cross::new((x, y), 4, removed_color.stroke_width(2))),
    )?;

    // 3) Fitted curve.
    if chart.curve.len() >= 2 {
        ctx.draw_series(LineSeries::new(
            chart.curve.iter().copied(),
            curve_color.stroke_width(2),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn pad(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span > 0.0 {
        (min - span * 0.05, max + span * 0.05)
    } else {
        (min - 0.5, max + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_an_svg_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.svg");
        let chart = Chart {
            title: "test".to_string(),
            x_label: "A".to_string(),
            y_label: "B".to_string(),
            points: vec![(0.5, 4.0), (1.5, 3.0), (2.5, 2.2)],
            removed: vec![(3.5, 9.0)],
            curve: (0..20).map(|i| (i as f64 * 0.2, 4.0 * (-0.3 * i as f64 * 0.2).exp())).collect(),
        };
        write_svg_plot(&path, &chart, 640, 480).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("</svg>"));
    }

    #[test]
    fn tiny_canvas_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_svg_plot(&dir.path().join("p.svg"), &Chart::default(), 10, 10).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
