use anyhow::{Context, Result};
use extractors::OrderConfirmationExtractor;
use shared_types::{ExtractOutcome, OrderRecord, EXPORT_COLUMNS};

use crate::config::CliConfig;
use crate::helpers::google_oauth::{obtain_access_token, GoogleOAuthClient};
use crate::helpers::token_store::TokenStore;
use crate::integrations::gmail::GmailClient;
use crate::storage::MessageArchive;

/// Counters for one batch run. `listed - fetched` were lost to fetch
/// failures; `fetched - extracted - skipped_extraction` is always zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub listed: usize,
    pub fetched: usize,
    pub extracted: usize,
    pub skipped_extraction: usize,
    pub failed_fetch: usize,
}

/// The whole pipeline: authorize, list, then per message fetch → archive →
/// extract, and finally write the export. Per-message failures are logged
/// and skipped; authorization and export failures abort the run.
pub async fn run(config: &CliConfig) -> Result<RunReport> {
    let oauth = GoogleOAuthClient::new(
        &config.gmail.client_id,
        config.gmail.client_secret.as_deref(),
    )?;
    let token_store = TokenStore::new(config.output.token_path.clone());
    let access_token = obtain_access_token(&oauth, &token_store)
        .await
        .context("gmail authorization failed")?;

    let client = GmailClient::new(access_token);
    let ids = client
        .list_message_ids(&config.fetch.query, config.fetch.max_messages)
        .await
        .context("list candidate messages")?;
    tracing::info!("Found {} candidate messages", ids.len());

    let archive = MessageArchive::new(config.output.archive_dir.clone());
    let extractor = OrderConfirmationExtractor::new();

    let mut report = RunReport {
        listed: ids.len(),
        ..RunReport::default()
    };
    let mut records = Vec::new();

    for id in &ids {
        process_fetched(
            client.fetch_raw(id).await,
            id,
            &archive,
            &extractor,
            &mut records,
            &mut report,
        )?;
    }

    let export_file = std::fs::File::create(&config.output.export_path)
        .with_context(|| format!("create export file {:?}", config.output.export_path))?;
    write_export(export_file, &records).context("write export")?;
    tracing::info!(
        "Wrote {} rows to {:?}",
        records.len(),
        config.output.export_path
    );

    Ok(report)
}

/// Archives and extracts one fetched message, updating the counters. Fetch
/// failures are logged and counted; only an archive write failure is fatal.
/// Skipped messages leave no trace in `records`.
fn process_fetched(
    fetch_result: Result<Vec<u8>>,
    message_id: &str,
    archive: &MessageArchive,
    extractor: &OrderConfirmationExtractor,
    records: &mut Vec<OrderRecord>,
    report: &mut RunReport,
) -> Result<()> {
    let raw = match fetch_result {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Failed to fetch message {}: {}", message_id, e);
            report.failed_fetch += 1;
            return Ok(());
        }
    };
    report.fetched += 1;

    let path = archive.store(message_id, &raw)?;

    match extractor.extract(&raw) {
        ExtractOutcome::Extracted(record) => {
            records.push(record);
            report.extracted += 1;
        }
        ExtractOutcome::Skipped(reason) => {
            tracing::warn!("No order data in {}: {}", path.display(), reason);
            report.skipped_extraction += 1;
        }
    }
    Ok(())
}

/// One header row, then one row per record in encounter order. The header is
/// written explicitly so an empty run still produces it.
pub fn write_export<W: std::io::Write>(writer: W, records: &[OrderRecord]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer
        .write_record(EXPORT_COLUMNS)
        .context("write export header")?;
    for record in records {
        csv_writer.serialize(record).context("write export row")?;
    }
    csv_writer.flush().context("flush export")?;
    Ok(())
}
