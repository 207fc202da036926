use std::{fs::File, io, path::Path};

use crate::{
    error::{Error, Result},
    model::{csv::NetLoadRow, series::NetLoadRecord},
};

/// Writes the net load table to `path`, replacing any previous file.
pub fn export_net_load(records: &[NetLoadRecord], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|err| Error::output_write(path, err))?;
    write_net_load(records, io::BufWriter::new(file)).map_err(|err| Error::output_write(path, err))
}

/// Header row, then one row per record in order.
pub fn write_net_load(records: &[NetLoadRecord], writer: impl io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if records.is_empty() {
        // `serialize` only emits the header alongside the first row.
        writer.write_record([
            "forecast_hour_beginning_utc",
            "forecast_load_mw",
            "renewable_mw",
            "net_load_mw",
        ])?;
    }
    for record in records {
        writer.serialize(NetLoadRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}
