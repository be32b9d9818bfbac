//! Plotters-powered SVG chart rendering.
//!
//! Why Plotters with the SVG backend?
//! - no native font/raster dependencies
//! - nicer axis + tick rendering than hand-rolled output
//! - easy to extend later (PNG backend, annotations, dashboards, etc.)
//!
//! The renderers are intentionally data-driven: all series and bounds are
//! computed by `series` before the draw call. Chart code only maps prepared
//! points onto Plotters primitives.

use std::collections::HashMap;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::{PriceSeries, QueryConfig, VolumeHistogram, WeightSeries};
use crate::error::AppError;

/// Display label for chart titles.
fn type_label(config: &QueryConfig) -> String {
    if config.type_filter.eq_ignore_ascii_case("all") || config.type_filter.is_empty() {
        "all types".to_string()
    } else {
        config.type_filter.clone()
    }
}

/// Render the price-trend chart (avg line, optional min/max range lines,
/// optional weight bars on a secondary axis).
pub fn render_price_chart(
    series: &PriceSeries,
    config: &QueryConfig,
    path: &Path,
) -> Result<(), AppError> {
    draw_price(series, config, path).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to render price chart '{}': {e}", path.display()),
        )
    })
}

/// Render the daily weight-trend chart.
pub fn render_weight_chart(
    series: &WeightSeries,
    config: &QueryConfig,
    path: &Path,
) -> Result<(), AppError> {
    draw_weight(series, config, path).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to render weight chart '{}': {e}", path.display()),
        )
    })
}

/// Render the volume histogram chart.
pub fn render_volume_chart(
    hist: &VolumeHistogram,
    config: &QueryConfig,
    path: &Path,
) -> Result<(), AppError> {
    draw_volume(hist, config, path).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to render volume chart '{}': {e}", path.display()),
        )
    })
}

fn draw_price(
    series: &PriceSeries,
    config: &QueryConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if series.is_empty() {
        return Err("price series is empty (no records with a known date)".into());
    }

    let root =
        SVGBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE)?;

    // The x-axis is the sequence index, not the calendar date, so gaps
    // between market days stay evenly spaced; tick labels re-attach dates.
    let x_max = (series.len() as i32 - 1).max(1);
    let ticks: HashMap<i32, String> = series
        .date_ticks()
        .into_iter()
        .map(|(seq, label)| (seq as i32, label))
        .collect();

    let mut y_lo = f64::INFINITY;
    let mut y_hi = f64::NEG_INFINITY;
    for p in &series.points {
        let (lo, hi) = if config.show_range {
            (p.min_price, p.max_price)
        } else {
            (p.avg_price, p.avg_price)
        };
        y_lo = y_lo.min(lo);
        y_hi = y_hi.max(hi);
    }
    let pad = ((y_hi - y_lo) * 0.05).max(0.5);
    let (y_lo, y_hi) = (y_lo - pad, y_hi + pad);

    let vol_max = series
        .points
        .iter()
        .map(|p| p.weight_kg)
        .fold(0.0, f64::max)
        .max(1.0);

    let title = format!("Price Trends of {} Over Time", type_label(config));
    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(10)
        .caption(&title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50);
    if config.show_volume {
        builder.right_y_label_area_size(50);
    }

    let mut chart = builder
        .build_cartesian_2d(-1..(x_max + 1), y_lo..y_hi)?
        .set_secondary_coord(-1.0..(x_max as f64 + 1.0), 0.0..vol_max * 1.1);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Date")
        .y_desc("Price (DKK)")
        .x_labels((series.len() + 2).min(400))
        .x_label_formatter(&|x| ticks.get(x).cloned().unwrap_or_default())
        .draw()?;

    if config.show_volume {
        chart
            .configure_secondary_axes()
            .y_desc("Weight (kg)")
            .draw()?;
        chart.draw_secondary_series(series.points.iter().map(|p| {
            let x = p.seq as f64;
            Rectangle::new(
                [(x - 0.4, 0.0), (x + 0.4, p.weight_kg)],
                GREEN.mix(0.25).filled(),
            )
        }))?;
    }

    if config.show_range {
        chart
            .draw_series(LineSeries::new(
                series.points.iter().map(|p| (p.seq as i32, p.max_price)),
                &RED,
            ))?
            .label("Max price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        chart
            .draw_series(LineSeries::new(
                series.points.iter().map(|p| (p.seq as i32, p.min_price)),
                &GREEN,
            ))?
            .label("Min price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));
    }

    chart
        .draw_series(LineSeries::new(
            series.points.iter().map(|p| (p.seq as i32, p.avg_price)),
            &BLUE,
        ))?
        .label("Avg price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_weight(
    series: &WeightSeries,
    config: &QueryConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(first), Some(last)) = (series.points.first(), series.points.last()) else {
        return Err("weight series is empty".into());
    };

    let root =
        SVGBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE)?;

    let d0 = first.date - chrono::Duration::days(1);
    let d1 = last.date + chrono::Duration::days(1);
    let y_hi = series
        .points
        .iter()
        .map(|p| p.total_kg)
        .fold(0.0, f64::max)
        .max(1.0)
        * 1.1;

    let title = format!("Daily Weight of {}", type_label(config));
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(&title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(d0..d1, 0.0..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Weight (kg)")
        .x_labels(8)
        .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            series.points.iter().map(|p| (p.date, p.total_kg)),
            &GREEN,
        ))?
        .label("Total weight")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_volume(
    hist: &VolumeHistogram,
    config: &QueryConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root =
        SVGBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_hi = hist
        .bins
        .iter()
        .map(|b| b.weight_kg)
        .fold(0.0, f64::max)
        .max(1.0)
        * 1.1;

    let title = format!("Volume by Price of {}", type_label(config));
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(&title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(hist.y_min..hist.y_max, 0.0..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Avg price (DKK)")
        .y_desc("Weight (kg)")
        .draw()?;

    chart.draw_series(hist.bins.iter().map(|b| {
        Rectangle::new([(b.lo, 0.0), (b.hi, b.weight_kg)], BLUE.mix(0.35).filled())
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketRecord, MarketTable};
    use std::fs;
    use std::path::PathBuf;

    fn config(dir: &Path) -> QueryConfig {
        QueryConfig {
            data_dir: dir.to_path_buf(),
            years: vec!["2025".to_string()],
            type_filter: "Torsk".to_string(),
            match_mode: crate::domain::MatchMode::Exact,
            bins: crate::series::DEFAULT_BIN_COUNT,
            out: None,
            chart_width: 640,
            chart_height: 480,
            show_range: true,
            show_volume: true,
            export_records: None,
            export_series: None,
        }
    }

    fn sample_table() -> MarketTable {
        let record = |raw: &str, avg: f64| MarketRecord {
            date: crate::io::loader::parse_market_date(raw),
            raw_date: raw.to_string(),
            fish_type: "Torsk".to_string(),
            weight_kg: 100.0,
            min_price: avg - 2.0,
            avg_price: avg,
            max_price: avg + 2.0,
            source_year: "2025".to_string(),
        };
        MarketTable::from_records(vec![
            record("20250101", 10.0),
            record("20250102", 12.0),
            record("20250103", 11.0),
        ])
    }

    fn assert_svg(path: &PathBuf) {
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    fn charts_render_to_svg_files() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let table = sample_table();

        let prices = crate::series::price_series(&table).unwrap();
        let weights = crate::series::weight_series(&table).unwrap();
        let hist = crate::series::volume_histogram(&prices, cfg.bins).unwrap();

        let price_path = dir.path().join("prices.svg");
        render_price_chart(&prices, &cfg, &price_path).unwrap();
        assert_svg(&price_path);

        let weight_path = dir.path().join("weight.svg");
        render_weight_chart(&weights, &cfg, &weight_path).unwrap();
        assert_svg(&weight_path);

        let volume_path = dir.path().join("volume.svg");
        render_volume_chart(&hist, &cfg, &volume_path).unwrap();
        assert_svg(&volume_path);
    }
}
