use std::{collections::BTreeMap, ops::RangeInclusive};

use chrono::NaiveDate;
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::model::series::{DailyNetLoad, LagCorrelation, NetLoadRecord};

/// Lags examined by the cyclicality analysis, in days.
pub const LAGS: RangeInclusive<usize> = 1..=30;

#[derive(Default)]
struct DayBucket {
    sum: f64,
    count: u32,
}

/// Averages net load per UTC calendar day.
///
/// Every day from the first to the last observed one is present; days without
/// any rows carry `None` instead of being dropped, so lags stay measured in days.
pub fn resample_daily(records: &[NetLoadRecord]) -> Vec<DailyNetLoad> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for record in records {
        let bucket = buckets.entry(record.timestamp.date_naive()).or_default();
        bucket.sum += record.net_load_mw;
        bucket.count += 1;
    }

    let (Some(first), Some(last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|date| date <= last)
        .map(|date| DailyNetLoad {
            date,
            mean_net_load_mw: buckets
                .get(&date)
                .map(|bucket| bucket.sum / f64::from(bucket.count)),
        })
        .collect()
}

/// Pearson correlation coefficient of two equally long samples.
///
/// `None` when fewer than two pairs are given or either side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if xs.iter().all_equal() || ys.iter().all_equal() {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (covariance, variance_x, variance_y) = xs.iter().zip(ys).fold(
        (0.0, 0.0, 0.0),
        |(covariance, variance_x, variance_y), (x, y)| {
            let dx = x - mean_x;
            let dy = y - mean_y;
            (
                covariance + dx * dy,
                variance_x + dx * dx,
                variance_y + dy * dy,
            )
        },
    );
    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }
    Some((covariance / (variance_x * variance_y).sqrt()).clamp(-1.0, 1.0))
}

/// Correlates `series[..n - lag]` with `series[lag..]`.
///
/// Undefined when the series is not longer than the lag or either window
/// contains a missing value.
pub fn autocorrelation(series: &[Option<f64>], lag: usize) -> Option<f64> {
    let n = series.len();
    if n <= lag {
        return None;
    }
    let head: Vec<f64> = series[..n - lag].iter().copied().collect::<Option<_>>()?;
    let tail: Vec<f64> = series[lag..].iter().copied().collect::<Option<_>>()?;
    pearson(&head, &tail)
}

pub fn autocorrelations(
    series: &[Option<f64>],
    lags: RangeInclusive<usize>,
) -> Vec<LagCorrelation> {
    lags.map(|lag| LagCorrelation {
        lag,
        correlation: autocorrelation(series, lag),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CyclicalityReport {
    pub daily: Vec<DailyNetLoad>,
    pub correlations: Vec<LagCorrelation>,
}

impl CyclicalityReport {
    pub fn gap_days(&self) -> usize {
        self.daily
            .iter()
            .filter(|day| day.mean_net_load_mw.is_none())
            .count()
    }

    /// The lag with the highest defined correlation, i.e. the dominant cycle length.
    ///
    /// Ties go to the shorter lag.
    pub fn strongest(&self) -> Option<LagCorrelation> {
        self.correlations
            .iter()
            .filter_map(|point| point.correlation.map(|correlation| (point, correlation)))
            .max_by(|(lhs_point, lhs), (rhs_point, rhs)| {
                lhs.total_cmp(rhs).then(rhs_point.lag.cmp(&lhs_point.lag))
            })
            .map(|(point, _)| *point)
    }
}

pub fn analyze(records: &[NetLoadRecord]) -> CyclicalityReport {
    let daily = resample_daily(records);
    let series = daily.iter().map(|day| day.mean_net_load_mw).collect_vec();
    let correlations = autocorrelations(&series, LAGS);
    let report = CyclicalityReport {
        daily,
        correlations,
    };

    let gap_days = report.gap_days();
    if gap_days > 0 {
        warn!(
            gap_days,
            "Some days have no net load rows, lags spanning them are undefined"
        );
    }
    for point in &report.correlations {
        debug!(lag = point.lag, correlation = ?point.correlation, "Autocorrelation");
    }
    match report.strongest() {
        Some(LagCorrelation {
            lag,
            correlation: Some(correlation),
        }) => info!(days = report.daily.len(), lag, correlation, "Dominant cycle"),
        _ => warn!(days = report.daily.len(), "No lag has a defined autocorrelation"),
    }
    report
}
