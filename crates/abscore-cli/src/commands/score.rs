use crate::cli::{InputFormat, ScoreArgs};
use crate::config::builder::build_config;
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use abscore::{
    core::io::{LongCsv, MetricSource, WideCsv, report_csv::write_table_to_path},
    core::models::record::MetricRecord,
    engine::{progress::ProgressReporter, table::ReportLayout},
    workflows,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(args: ScoreArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    info!("Building configuration from profiles and CLI arguments...");
    let config = build_config(&args)?;

    info!("Loading raw metrics from {:?}", &config.input_path);
    let records = read_records(&config)?;
    if records.is_empty() {
        warn!("Input file contains no designs; the report will only have a header.");
    }

    let progress_handler = CliProgressHandler::new(ui_sender.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core scoring workflow...");
    let outcome = tokio::task::block_in_place(|| {
        workflows::score::run(&records, &config.registry, &reporter)
    })?;

    let layout = ReportLayout::for_table(&outcome.table, &config.registry);
    write_table_to_path(&config.output_path, &outcome.table, &layout, config.ranked).map_err(
        |e| CliError::ReportOutput {
            path: config.output_path.clone(),
            source: e,
        },
    )?;

    let viable = outcome
        .table
        .iter()
        .filter(|r| r.viability().is_viable())
        .count();
    let summary = format!(
        "✓ Scored {} design(s), {} viable. Report written to: {}",
        outcome.table.len(),
        viable,
        config.output_path.display()
    );
    if ui_sender.send(UiEvent::Log(summary)).await.is_err() {
        warn!("UI manager is not receiving events; summary was not displayed.");
    }

    if !outcome.rejected.is_empty() {
        let keys = outcome
            .rejected
            .iter()
            .map(|e| e.key.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CliError::DuplicateDesigns {
            count: outcome.rejected.len(),
            keys,
        });
    }

    Ok(())
}

fn read_records(config: &AppConfig) -> Result<Vec<MetricRecord>> {
    let result = match config.format {
        InputFormat::Long => LongCsv.read_from_path(&config.input_path),
        InputFormat::Wide => {
            WideCsv::new(Some(config.default_challenge.clone())).read_from_path(&config.input_path)
        }
    };
    let records = result.map_err(|e| CliError::MetricsInput {
        path: config.input_path.clone(),
        source: e,
    })?;
    info!("Read {} design(s) from input.", records.len());
    Ok(records)
}
