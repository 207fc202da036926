use chrono::{DateTime, NaiveDate, Utc};

/// A single generation source's output for one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRecord {
    pub timestamp: DateTime<Utc>,
    pub is_renewable: bool,
    pub power_mw: f64,
}

/// Forecast demand for one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadRecord {
    pub timestamp: DateTime<Utc>,
    pub forecast_load_mw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatedRenewable {
    pub timestamp: DateTime<Utc>,
    pub total_renewable_mw: f64,
}

/// Demand left for dispatchable sources once renewable output is subtracted.
///
/// `net_load_mw` is negative whenever renewables exceed the forecast load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetLoadRecord {
    pub timestamp: DateTime<Utc>,
    pub forecast_load_mw: f64,
    pub renewable_mw: f64,
    pub net_load_mw: f64,
}

impl NetLoadRecord {
    pub fn new(load: &LoadRecord, renewable_mw: f64) -> Self {
        Self {
            timestamp: load.timestamp,
            forecast_load_mw: load.forecast_load_mw,
            renewable_mw,
            net_load_mw: load.forecast_load_mw - renewable_mw,
        }
    }
}

/// Mean net load over one UTC calendar day, `None` for a day without any hourly rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyNetLoad {
    pub date: NaiveDate,
    pub mean_net_load_mw: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagCorrelation {
    pub lag: usize,
    pub correlation: Option<f64>,
}
