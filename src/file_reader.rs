use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use csv::StringRecord;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::{GenerationColumns, LoadColumns},
    error::{Error, Result},
    model::{
        csv::NetLoadRow,
        parse_flag, parse_megawatts, parse_timestamp,
        series::{GenerationRecord, LoadRecord, NetLoadRecord},
    },
};

pub fn csv_reader<R: io::Read>(buffer: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(buffer)
}

/// Header-aware CSV reader that reports failures against the file it came from.
pub struct RowReader<R> {
    path: PathBuf,
    reader: csv::Reader<R>,
    headers: StringRecord,
}

impl RowReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::InputUnreadable {
                path: path.to_path_buf(),
                source: err.into(),
            },
        })?;
        Self::new(path, file)
    }
}

impl<R: io::Read> RowReader<R> {
    pub fn new(path: impl Into<PathBuf>, buffer: R) -> Result<Self> {
        let path = path.into();
        let mut reader = csv_reader(buffer);
        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(source) => return Err(Error::InputUnreadable { path, source }),
        };
        Ok(Self {
            path,
            reader,
            headers,
        })
    }

    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| Error::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Decodes every remaining row, stopping at the first failure.
    pub fn collect_rows<T>(
        mut self,
        mut decode: impl FnMut(&Row<'_>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut record = StringRecord::new();
        let mut rows = Vec::new();
        loop {
            match self.reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(source) => {
                    return Err(Error::InputUnreadable {
                        path: self.path,
                        source,
                    });
                }
            }
            let row = Row {
                path: &self.path,
                headers: &self.headers,
                record: &record,
            };
            rows.push(decode(&row)?);
        }
        Ok(rows)
    }
}

pub struct Row<'a> {
    path: &'a Path,
    headers: &'a StringRecord,
    record: &'a StringRecord,
}

impl Row<'_> {
    fn line(&self) -> u64 {
        self.record.position().map_or(0, csv::Position::line)
    }

    fn parse_error(&self, index: Option<usize>, reason: String) -> Error {
        let (column, value) = match index {
            Some(index) => (
                self.headers.get(index).unwrap_or_default().to_string(),
                self.record.get(index).unwrap_or_default().to_string(),
            ),
            None => ("*".to_string(), self.record.iter().join(",")),
        };
        Error::Parse {
            path: self.path.to_path_buf(),
            line: self.line(),
            column,
            value,
            reason,
        }
    }

    pub fn parse<T>(
        &self,
        index: usize,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<T> {
        parse(self.record.get(index).unwrap_or_default())
            .map_err(|reason| self.parse_error(Some(index), reason))
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        self.record
            .deserialize(Some(self.headers))
            .map_err(|err| match err.kind() {
                csv::ErrorKind::Deserialize { err, .. } => {
                    let index = err.field().and_then(|field| usize::try_from(field).ok());
                    self.parse_error(index, err.kind().to_string())
                }
                other => self.parse_error(None, other_reason(other)),
            })
    }
}

fn other_reason(kind: &csv::ErrorKind) -> String {
    match kind {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => "malformed record".to_string(),
    }
}

pub fn read_generation(path: &Path, columns: &GenerationColumns) -> Result<Vec<GenerationRecord>> {
    generation_records(RowReader::open(path)?, columns)
}

pub fn generation_records<R: io::Read>(
    rows: RowReader<R>,
    columns: &GenerationColumns,
) -> Result<Vec<GenerationRecord>> {
    let timestamp = rows.column(&columns.timestamp)?;
    let is_renewable = rows.column(&columns.is_renewable)?;
    let power_mw = rows.column(&columns.power_mw)?;
    let path = rows.path.clone();

    let records = rows.collect_rows(|row| {
        Ok(GenerationRecord {
            timestamp: row.parse(timestamp, parse_timestamp)?,
            is_renewable: row.parse(is_renewable, parse_flag)?,
            power_mw: row.parse(power_mw, parse_megawatts)?,
        })
    })?;
    debug!(path = %path.display(), rows = records.len(), "Read generation table");
    Ok(records)
}

pub fn read_load(path: &Path, columns: &LoadColumns) -> Result<Vec<LoadRecord>> {
    load_records(RowReader::open(path)?, columns)
}

pub fn load_records<R: io::Read>(
    rows: RowReader<R>,
    columns: &LoadColumns,
) -> Result<Vec<LoadRecord>> {
    let timestamp = rows.column(&columns.timestamp)?;
    let forecast_load_mw = rows.column(&columns.forecast_load_mw)?;
    let path = rows.path.clone();

    let records = rows.collect_rows(|row| {
        Ok(LoadRecord {
            timestamp: row.parse(timestamp, parse_timestamp)?,
            forecast_load_mw: row.parse(forecast_load_mw, parse_megawatts)?,
        })
    })?;
    debug!(path = %path.display(), rows = records.len(), "Read load table");
    Ok(records)
}

pub fn read_net_load(path: &Path) -> Result<Vec<NetLoadRecord>> {
    net_load_records(RowReader::open(path)?)
}

pub fn net_load_records<R: io::Read>(rows: RowReader<R>) -> Result<Vec<NetLoadRecord>> {
    rows.collect_rows(|row| row.deserialize::<NetLoadRow>().map(NetLoadRecord::from))
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;

    const GENERATION: &str = "\
datetime_beginning_utc,fuel_type,mw,is_renewable
1/1/2024 12:00:00 AM,Solar,\"1,000.5\",True
1/1/2024 12:00:00 AM,Gas,5000,False
1/1/2024 1:00:00 AM,Wind,250,True
";

    #[test]
    fn test_generation_decoding() {
        let rows = RowReader::new("generation.csv", GENERATION.as_bytes()).unwrap();
        let records = generation_records(rows, &GenerationColumns::default()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            GenerationRecord {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                is_renewable: true,
                power_mw: 1000.5,
            }
        );
        assert!(!records[1].is_renewable);
        assert_eq!(
            records[2].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_load_decoding_with_custom_columns() {
        let data = "hour,load\n2024-01-01T00:00:00Z,100\n2024-01-01T01:00:00Z,110.5\n";
        let columns = LoadColumns {
            timestamp: "hour".to_string(),
            forecast_load_mw: "load".to_string(),
        };
        let rows = RowReader::new("load.csv", data.as_bytes()).unwrap();
        let records = load_records(rows, &columns).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].forecast_load_mw, 110.5);
    }

    #[test]
    fn test_missing_column() {
        let rows = RowReader::new("load.csv", "hour,load\n".as_bytes()).unwrap();
        let err = load_records(rows, &LoadColumns::default()).unwrap_err();

        assert!(matches!(
            err,
            Error::MissingColumn { ref column, .. } if column == "forecast_hour_beginning_utc"
        ));
    }

    #[test]
    fn test_parse_error_names_row_and_column() {
        let data = "\
forecast_hour_beginning_utc,forecast_load_mw
2024-01-01 00:00:00,100
not-a-date,110
";
        let rows = RowReader::new("load.csv", data.as_bytes()).unwrap();
        let err = load_records(rows, &LoadColumns::default()).unwrap_err();

        let Error::Parse {
            line,
            column,
            value,
            ..
        } = err
        else {
            panic!("expected a parse error");
        };
        assert_eq!(line, 3);
        assert_eq!(column, "forecast_hour_beginning_utc");
        assert_eq!(value, "not-a-date");
    }

    #[test]
    fn test_invalid_numeric_value() {
        let data = "forecast_hour_beginning_utc,forecast_load_mw\n2024-01-01 00:00:00,lots\n";
        let rows = RowReader::new("load.csv", data.as_bytes()).unwrap();
        let err = load_records(rows, &LoadColumns::default()).unwrap_err();

        assert!(matches!(err, Error::Parse { ref column, .. } if column == "forecast_load_mw"));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = read_load(&path, &LoadColumns::default()).unwrap_err();

        assert!(matches!(err, Error::InputNotFound { path: ref p } if *p == path));
    }

    #[test]
    fn test_net_load_decoding_accepts_original_header() {
        let data = "\
forecast_hour_beginning_utc,forecast_load_mw,mw,net_load_mw
2024-01-01 00:00:00,100.0,30.0,70.0
";
        let rows = RowReader::new("net_load.csv", data.as_bytes()).unwrap();
        let records = net_load_records(rows).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].renewable_mw, 30.0);
        assert_eq!(records[0].net_load_mw, 70.0);
    }

    #[test]
    fn test_net_load_decoding_reports_bad_field() {
        let data = "\
forecast_hour_beginning_utc,forecast_load_mw,renewable_mw,net_load_mw
2024-01-01 00:00:00,100.0,oops,70.0
";
        let rows = RowReader::new("net_load.csv", data.as_bytes()).unwrap();
        let err = net_load_records(rows).unwrap_err();

        assert!(matches!(
            err,
            Error::Parse { line: 2, ref reason, .. } if reason.contains("oops")
        ));
    }
}
