pub mod csv;
pub mod series;

pub use decoder::{parse_flag, parse_megawatts, parse_timestamp};

mod decoder {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize as _, Deserializer, de::Error};

    /// Layouts with an explicit UTC offset, tried after RFC 3339.
    const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

    /// Layouts without an offset; these are read as UTC.
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%-d %b %Y %H:%M",
    ];

    pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty timestamp".to_string());
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, format) {
                return Ok(dt.with_timezone(&Utc));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| "unrecognised timestamp layout".to_string())
    }

    pub fn parse_megawatts(s: &str) -> Result<f64, String> {
        let cleaned = s.trim().trim_matches('"').replace(',', "");
        if cleaned.is_empty() {
            return Err("empty numeric value".to_string());
        }
        let value: f64 = cleaned.parse().map_err(|err| format!("{err}"))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err("value is not finite".to_string())
        }
    }

    pub fn parse_flag(s: &str) -> Result<bool, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" => Ok(true),
            "false" | "f" | "0" | "no" | "n" => Ok(false),
            other => Err(format!("expected a boolean, got {other:?}")),
        }
    }

    pub fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s).map_err(|reason| D::Error::custom(format!("{s:?}: {reason}")))
    }

    pub fn deserialize_megawatts<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).and_then(|s| {
            parse_megawatts(&s).map_err(|reason| Error::custom(format!("{s:?}: {reason}")))
        })
    }
}
