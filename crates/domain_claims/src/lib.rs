//! Claims Domain
//!
//! Claims for insured patient attendances, from draft through vetting,
//! submission to the payer in batches, and payment.
//!
//! # Claim Lifecycle
//!
//! ```text
//! draft -> pending_vetting -> vetted -> submitted -> approved -> paid
//!                               ^                 \-> rejected
//!                               └──── prepare_for_resubmission ───┘
//! ```
//!
//! Vetting freezes the G-DRG amount and each mapped line's Tariff Master
//! price on the claim, so later tariff updates never change a vetted claim.

pub mod claim;
pub mod details;
pub mod item;
pub mod aggregator;
pub mod workflow;
pub mod batch;
pub mod history;
pub mod ports;
pub mod services;
pub mod batching;
pub mod error;

pub use claim::{Claim, ClaimStatus, NewClaim, VettingDecision};
pub use details::{Attendance, ClaimDiagnosis, GdrgSelection, PatientDetails};
pub use item::ClaimItem;
pub use aggregator::{calculate_totals, ClaimTotals};
pub use workflow::ClaimTransition;
pub use batch::{BatchItem, BatchItemStatus, BatchStatus, ClaimBatch, ClaimResponse};
pub use history::BatchStatusChange;
pub use ports::{BatchCommit, BatchHistoryPort, BatchPort, ClaimPort};
pub use services::{ClaimService, ClaimVettingService, NewClaimItem, VetRequest};
pub use batching::{BatchAddResult, BatchPayment, BatchService, ResponseResult};
pub use error::ClaimError;
