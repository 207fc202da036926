use std::path::PathBuf;

/// Default fraction of load rows that must find a renewable aggregate.
pub const DEFAULT_MIN_JOIN_MATCH_RATE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationColumns {
    pub timestamp: String,
    pub is_renewable: String,
    pub power_mw: String,
}

impl Default for GenerationColumns {
    fn default() -> Self {
        Self {
            timestamp: "datetime_beginning_utc".to_string(),
            is_renewable: "is_renewable".to_string(),
            power_mw: "mw".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadColumns {
    pub timestamp: String,
    pub forecast_load_mw: String,
}

impl Default for LoadColumns {
    fn default() -> Self {
        Self {
            timestamp: "forecast_hour_beginning_utc".to_string(),
            forecast_load_mw: "forecast_load_mw".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl ChartSize {
    /// 30×6 inch figure at 100 px per inch.
    pub const NET_LOAD: Self = Self {
        width: 3000,
        height: 600,
    };

    /// 10×6 inch figure at 100 px per inch.
    pub const CYCLICALITY: Self = Self {
        width: 1000,
        height: 600,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinPolicy {
    pub min_match_rate: f64,
    pub strict: bool,
}

impl Default for JoinPolicy {
    fn default() -> Self {
        Self {
            min_match_rate: DEFAULT_MIN_JOIN_MATCH_RATE,
            strict: false,
        }
    }
}

/// Everything the net load builder stage needs.
///
/// `net_load_plot` is optional so the table can be produced without rendering.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub generation_path: PathBuf,
    pub load_path: PathBuf,
    pub net_load_out: PathBuf,
    pub net_load_plot: Option<PathBuf>,
    pub generation_columns: GenerationColumns,
    pub load_columns: LoadColumns,
    pub join_policy: JoinPolicy,
    pub chart_size: ChartSize,
}

impl BuildConfig {
    pub fn new(
        generation_path: impl Into<PathBuf>,
        load_path: impl Into<PathBuf>,
        net_load_out: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generation_path: generation_path.into(),
            load_path: load_path.into(),
            net_load_out: net_load_out.into(),
            net_load_plot: None,
            generation_columns: GenerationColumns::default(),
            load_columns: LoadColumns::default(),
            join_policy: JoinPolicy::default(),
            chart_size: ChartSize::NET_LOAD,
        }
    }
}

/// Everything the cyclicality analyzer stage needs.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub net_load_path: PathBuf,
    pub cyclicality_plot: Option<PathBuf>,
    pub chart_size: ChartSize,
}

impl AnalyzeConfig {
    pub fn new(net_load_path: impl Into<PathBuf>) -> Self {
        Self {
            net_load_path: net_load_path.into(),
            cyclicality_plot: None,
            chart_size: ChartSize::CYCLICALITY,
        }
    }
}
