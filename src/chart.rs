use std::{ffi::OsStr, path::Path};

use chrono::{DateTime, TimeDelta, Utc};
use itertools::{Itertools, MinMaxResult};
use plotters::{coord::Shift, prelude::*, style::FontTransform};

use crate::{
    config::ChartSize,
    cyclicality::LAGS,
    error::{Error, Result},
    model::series::{LagCorrelation, NetLoadRecord},
};

const FONT: &str = "sans-serif";

#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend: Option<String>,
    pub color: RGBColor,
    pub rotate_x_labels: bool,
    pub grid: bool,
    pub size: ChartSize,
}

impl ChartStyle {
    pub fn net_load(size: ChartSize) -> Self {
        Self {
            title: "Net Load over time".to_string(),
            x_label: "Time (hours)".to_string(),
            y_label: "Net Load of Power (MegaW)".to_string(),
            legend: Some("Net Load (MW)".to_string()),
            color: RED,
            rotate_x_labels: true,
            grid: true,
            size,
        }
    }

    pub fn cyclicality(size: ChartSize) -> Self {
        Self {
            title: "Autocorrelation of Daily Net Load (Cyclicality Analysis)".to_string(),
            x_label: "Lag (days)".to_string(),
            y_label: "Autocorrelation".to_string(),
            legend: None,
            color: BLUE,
            rotate_x_labels: false,
            grid: true,
            size,
        }
    }
}

enum Chart<'a> {
    NetLoad(&'a [NetLoadRecord]),
    Cyclicality(&'a [LagCorrelation]),
}

/// Line chart of net load against time, in table order.
pub fn render_net_load(records: &[NetLoadRecord], path: &Path, style: &ChartStyle) -> Result<()> {
    render(&Chart::NetLoad(records), path, style)
}

/// Stem chart of lag against autocorrelation; undefined lags are left out.
pub fn render_cyclicality(
    correlations: &[LagCorrelation],
    path: &Path,
    style: &ChartStyle,
) -> Result<()> {
    render(&Chart::Cyclicality(correlations), path, style)
}

/// Picks the backend from the extension: SVG for `.svg`, a raster image otherwise.
fn render(chart: &Chart<'_>, path: &Path, style: &ChartStyle) -> Result<()> {
    let size = (style.size.width, style.size.height);
    let is_svg = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case("svg"));
    let result = if is_svg {
        chart
            .draw(&SVGBackend::new(path, size).into_drawing_area(), style)
            .map_err(|err| err.to_string())
    } else {
        chart
            .draw(&BitMapBackend::new(path, size).into_drawing_area(), style)
            .map_err(|err| err.to_string())
    };
    result.map_err(|reason| Error::Chart {
        path: path.to_path_buf(),
        reason,
    })
}

impl Chart<'_> {
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        style: &ChartStyle,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;
        match self {
            Self::NetLoad(records) => draw_net_load(root, records, style)?,
            Self::Cyclicality(correlations) => draw_cyclicality(root, correlations, style)?,
        }
        root.present()
    }
}

fn draw_net_load<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    records: &[NetLoadRecord],
    style: &ChartStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (start, end) = time_span(records.iter().map(|record| record.timestamp));
    let (low, high) = value_span(records.iter().map(|record| record.net_load_mw));
    let format_time =
        |timestamp: &DateTime<Utc>| timestamp.format("%Y-%m-%d %H:%M").to_string();

    let mut chart = ChartBuilder::on(root)
        .caption(&style.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(if style.rotate_x_labels { 130 } else { 50 })
        .y_label_area_size(90)
        .build_cartesian_2d(start..end, low..high)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&style.x_label)
        .y_desc(&style.y_label)
        .x_labels(24)
        .x_label_formatter(&format_time);
    if style.rotate_x_labels {
        mesh.x_label_style((FONT, 14).into_font().transform(FontTransform::Rotate90));
    }
    if !style.grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    let color = style.color;
    let series = chart.draw_series(LineSeries::new(
        records
            .iter()
            .map(|record| (record.timestamp, record.net_load_mw)),
        color.stroke_width(2),
    ))?;
    if let Some(legend) = &style.legend {
        series
            .label(legend)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_cyclicality<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    correlations: &[LagCorrelation],
    style: &ChartStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let last_lag = correlations
        .iter()
        .map(|point| point.lag)
        .max()
        .unwrap_or(*LAGS.end()) as f64;
    let format_lag = |lag: &f64| format!("{lag:.0}");

    let mut chart = ChartBuilder::on(root)
        .caption(&style.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..last_lag + 1.0, -1.05..1.05)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&style.x_label)
        .y_desc(&style.y_label)
        .x_labels(16)
        .x_label_formatter(&format_lag);
    if !style.grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    chart.draw_series(LineSeries::new([(0.0, 0.0), (last_lag + 1.0, 0.0)], &BLACK))?;

    let stems = correlations
        .iter()
        .filter_map(|point| Some((point.lag as f64, point.correlation?)))
        .collect_vec();
    let color = style.color;
    chart.draw_series(stems.iter().map(|&(lag, correlation)| {
        PathElement::new(vec![(lag, 0.0), (lag, correlation)], color.stroke_width(2))
    }))?;
    chart.draw_series(
        stems
            .iter()
            .map(|&(lag, correlation)| Circle::new((lag, correlation), 4, color.filled())),
    )?;
    Ok(())
}

/// Plot range for the time axis; a degenerate span is widened to one hour.
fn time_span(timestamps: impl Iterator<Item = DateTime<Utc>>) -> (DateTime<Utc>, DateTime<Utc>) {
    match timestamps.minmax() {
        MinMaxResult::MinMax(start, end) if start < end => (start, end),
        MinMaxResult::MinMax(start, _) | MinMaxResult::OneElement(start) => {
            (start, start + TimeDelta::hours(1))
        }
        MinMaxResult::NoElements => {
            let epoch = DateTime::<Utc>::default();
            (epoch, epoch + TimeDelta::hours(1))
        }
    }
}

/// Value range padded by 5% on each side.
fn value_span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    match values.minmax_by(f64::total_cmp) {
        MinMaxResult::MinMax(low, high) if low < high => {
            let padding = (high - low) * 0.05;
            (low - padding, high + padding)
        }
        MinMaxResult::MinMax(value, _) | MinMaxResult::OneElement(value) => {
            (value - 1.0, value + 1.0)
        }
        MinMaxResult::NoElements => (0.0, 1.0),
    }
}
