//! Export and verify commands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use infra_store::InMemoryStore;
use nhia_export::{parse_batch_xml, BatchSnapshot, ExportService, ParsedBatch};

use crate::config::AppConfig;
use crate::error::CliError;

pub fn read_snapshot(path: &Path) -> Result<BatchSnapshot, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Renders a snapshot's batch as NHIA XML and writes it to the output
/// directory. Returns the path written.
#[instrument(skip(config, snapshot), fields(batch = %snapshot.batch.batch_number))]
pub async fn export_snapshot(config: &AppConfig, snapshot: BatchSnapshot) -> Result<PathBuf, CliError> {
    let batch_id = snapshot.batch.id;
    let store = Arc::new(InMemoryStore::new());
    store.restore([snapshot.batch], snapshot.claims).await;

    let service = ExportService::new(store.clone(), store, config.facility());
    let document = service.export_batch(batch_id).await?;

    std::fs::create_dir_all(&config.output_dir).map_err(|source| CliError::Write {
        path: config.output_dir.clone(),
        source,
    })?;
    let path = config.output_dir.join(&document.filename);
    std::fs::write(&path, document.body.as_bytes()).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "Export written");
    Ok(path)
}

pub fn verify_file(path: &Path) -> Result<ParsedBatch, CliError> {
    let xml = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_batch_xml(&xml)?)
}
