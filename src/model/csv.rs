use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::series::NetLoadRecord;

/// One row of the persisted net load table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NetLoadRow {
    #[serde(
        rename = "forecast_hour_beginning_utc",
        deserialize_with = "super::decoder::deserialize_datetime"
    )]
    pub timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "super::decoder::deserialize_megawatts")]
    pub forecast_load_mw: f64,
    #[serde(alias = "mw", deserialize_with = "super::decoder::deserialize_megawatts")]
    pub renewable_mw: f64,
    #[serde(deserialize_with = "super::decoder::deserialize_megawatts")]
    pub net_load_mw: f64,
}

impl From<&NetLoadRecord> for NetLoadRow {
    fn from(record: &NetLoadRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            forecast_load_mw: record.forecast_load_mw,
            renewable_mw: record.renewable_mw,
            net_load_mw: record.net_load_mw,
        }
    }
}

impl From<NetLoadRow> for NetLoadRecord {
    fn from(
        NetLoadRow {
            timestamp,
            forecast_load_mw,
            renewable_mw,
            net_load_mw,
        }: NetLoadRow,
    ) -> Self {
        Self {
            timestamp,
            forecast_load_mw,
            renewable_mw,
            net_load_mw,
        }
    }
}
