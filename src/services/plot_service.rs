//! SVG line charts of a day-range report.

use plotters::prelude::*;

use crate::models::solar::OptimizationResult;
use crate::services::report_service::ReportError;

/// Plot configuration
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub title: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: "Optimal Panel Orientation".to_string(),
            width: 1000,
            height: 600,
        }
    }
}

/// Optimal tilt (degrees) against day of year.
pub fn plot_optimal_tilt(
    results: &[OptimizationResult],
    config: &PlotConfig,
) -> Result<String, ReportError> {
    let points: Vec<(f64, f64)> = results
        .iter()
        .map(|r| (f64::from(r.day_of_year), r.optimal_tilt_degrees))
        .collect();
    render_line_chart(&points, config, "Beta (degrees)", &BLUE)
}

/// Daily total at the optimum (MJ/m²) against day of year.
pub fn plot_total_irradiation(
    results: &[OptimizationResult],
    config: &PlotConfig,
) -> Result<String, ReportError> {
    let points: Vec<(f64, f64)> = results
        .iter()
        .map(|r| (f64::from(r.day_of_year), r.total_irradiation))
        .collect();
    render_line_chart(&points, config, "Total Direct Irradiation (MJ/m²)", &RED)
}

fn render_line_chart(
    points: &[(f64, f64)],
    config: &PlotConfig,
    y_label: &str,
    color: &RGBColor,
) -> Result<String, ReportError> {
    if points.is_empty() {
        return Err(ReportError::Plot("no data to plot".to_string()));
    }

    let (x_min, x_max) = padded_range(points.iter().map(|p| p.0));
    let (y_min, y_max) = padded_range(points.iter().map(|p| p.1));

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&config.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .x_desc("Day")
            .y_desc(y_label)
            .draw()
            .map_err(plot_error)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color))
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
    }
    Ok(svg)
}

fn plot_error<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Plot(e.to_string())
}

// A single point or a constant series still needs a non-empty axis.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}
