//! Batch status history
//!
//! An append-only log keyed by batch id. Rows are created once per status
//! change and never edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::BatchId;

use crate::batch::BatchStatus;

/// One row of the batch status log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatusChange {
    pub batch_id: BatchId,
    /// `None` for the row written when the batch is created
    pub previous_status: Option<BatchStatus>,
    pub new_status: BatchStatus,
    pub actor: String,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl BatchStatusChange {
    pub fn new(
        batch_id: BatchId,
        previous_status: Option<BatchStatus>,
        new_status: BatchStatus,
        actor: impl Into<String>,
        notes: Option<&str>,
    ) -> Self {
        Self {
            batch_id,
            previous_status,
            new_status,
            actor: actor.into(),
            notes: notes.map(str::to_string),
            recorded_at: Utc::now(),
        }
    }
}
