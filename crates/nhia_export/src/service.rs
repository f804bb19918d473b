//! Loads a batch and its claims through the ports and renders the XML

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use core_kernel::BatchId;
use domain_claims::{BatchPort, ClaimPort};

use crate::error::ExportError;
use crate::model::{BatchExport, FacilityInfo};
use crate::writer::{export_filename, NhiaXmlWriter, CONTENT_TYPE};

/// A rendered export, ready to be saved or sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub filename: String,
    pub content_type: String,
    pub body: String,
}

impl ExportDocument {
    pub fn render(export: &BatchExport) -> Result<Self, ExportError> {
        Ok(Self {
            filename: export_filename(&export.details.batch_number),
            content_type: CONTENT_TYPE.to_string(),
            body: NhiaXmlWriter.generate(export)?,
        })
    }
}

#[derive(Clone)]
pub struct ExportService {
    batches: Arc<dyn BatchPort>,
    claims: Arc<dyn ClaimPort>,
    facility: FacilityInfo,
}

impl ExportService {
    pub fn new(batches: Arc<dyn BatchPort>, claims: Arc<dyn ClaimPort>, facility: FacilityInfo) -> Self {
        Self {
            batches,
            claims,
            facility,
        }
    }

    #[instrument(skip(self))]
    pub async fn export_batch(&self, batch_id: BatchId) -> Result<ExportDocument, ExportError> {
        let batch = self.batches.get_batch(batch_id).await?;

        let mut claims = Vec::with_capacity(batch.items.len());
        for claim_id in batch.claim_ids() {
            claims.push(self.claims.get_claim(claim_id).await?);
        }

        let export = BatchExport::build(self.facility.clone(), &batch, &claims, Utc::now())?;
        let document = ExportDocument::render(&export)?;

        info!(batch = %batch.batch_number, file = %document.filename, "Batch exported");
        Ok(document)
    }
}
