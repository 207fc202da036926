use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::{
    chart::{ChartStyle, render_cyclicality, render_net_load},
    config::{AnalyzeConfig, BuildConfig},
    cyclicality::{self, CyclicalityReport},
    error::Result,
    file_reader::{read_generation, read_load, read_net_load},
    file_writer::export_net_load,
    net_load::{NetLoadTable, build_net_load},
    staging::Staging,
};

const PREVIEW_ROWS: usize = 5;

/// Reads both inputs, derives net load, then writes the table and its chart.
///
/// Inputs are fully parsed and validated before anything is written, and the
/// artifacts only replace previous ones once all of them were produced.
#[instrument(
    skip_all,
    fields(
        generation = %config.generation_path.display(),
        load = %config.load_path.display(),
    ),
)]
pub fn build(config: &BuildConfig) -> Result<NetLoadTable> {
    let mut staging = Staging::new("net-load");
    let (table, _) = stage_build(config, &mut staging)?;
    staging.commit()?;
    Ok(table)
}

/// Re-reads a net load table and measures its daily cyclicality.
#[instrument(skip_all, fields(net_load = %config.net_load_path.display()))]
pub fn analyze(config: &AnalyzeConfig) -> Result<CyclicalityReport> {
    let mut staging = Staging::new("cyclicality");
    let report = stage_analyze(&config.net_load_path, config, &mut staging)?;
    staging.commit()?;
    Ok(report)
}

/// Both stages in sequence, committed together.
///
/// The analyzer reads the staged copy of the table the builder just wrote, so
/// `analyze_config.net_load_path` is not consulted. Nothing replaces a previous
/// artifact unless every artifact of both stages was produced.
pub fn run(
    build_config: &BuildConfig,
    analyze_config: &AnalyzeConfig,
) -> Result<(NetLoadTable, CyclicalityReport)> {
    let mut staging = Staging::new("net-load");
    let (table, staged_table) = stage_build(build_config, &mut staging)?;
    let report = stage_analyze(&staged_table, analyze_config, &mut staging)?;
    staging.commit()?;
    Ok((table, report))
}

fn stage_build(config: &BuildConfig, staging: &mut Staging) -> Result<(NetLoadTable, PathBuf)> {
    let generation = read_generation(&config.generation_path, &config.generation_columns)?;
    let load = read_load(&config.load_path, &config.load_columns)?;

    let table = build_net_load(&load, &generation);
    table.check_join(&config.join_policy)?;
    for record in table.records.iter().take(PREVIEW_ROWS) {
        info!(
            timestamp = %record.timestamp,
            forecast_load_mw = record.forecast_load_mw,
            renewable_mw = record.renewable_mw,
            net_load_mw = record.net_load_mw,
            "Net load preview"
        );
    }
    if let Some(summary) = table.summary() {
        info!(
            rows = summary.rows,
            matched = summary.matched,
            min_mw = summary.min_mw,
            mean_mw = summary.mean_mw,
            max_mw = summary.max_mw,
            "Net load summary"
        );
    }

    let staged_table = staging.stage(&config.net_load_out)?;
    export_net_load(&table.records, &staged_table)?;
    if let Some(plot) = &config.net_load_plot {
        let style = ChartStyle::net_load(config.chart_size);
        render_net_load(&table.records, &staging.stage(plot)?, &style)?;
    }
    Ok((table, staged_table))
}

fn stage_analyze(
    net_load_path: &Path,
    config: &AnalyzeConfig,
    staging: &mut Staging,
) -> Result<CyclicalityReport> {
    let records = read_net_load(net_load_path)?;
    info!(rows = records.len(), "Read net load table");
    let report = cyclicality::analyze(&records);

    if let Some(plot) = &config.cyclicality_plot {
        let style = ChartStyle::cyclicality(config.chart_size);
        render_cyclicality(&report.correlations, &staging.stage(plot)?, &style)?;
    }
    Ok(report)
}
