//! NHIA Export
//!
//! Renders a finalized claim batch as the `NHIAClaimBatch` XML document the
//! payer accepts, and parses such documents back for verification.
//!
//! ```text
//! NHIAClaimBatch
//! ├── Facility
//! ├── BatchDetails
//! └── Claims count=".."
//!     └── Claim id=".."
//!         ├── Patient, Attendance, GDRG
//!         ├── Diagnoses/Diagnosis isPrimary=".."
//!         ├── Items/Item type=".."
//!         └── Totals
//! ```

pub mod model;
pub mod writer;
pub mod parser;
pub mod service;
pub mod error;

pub use model::{
    AttendanceRecord, BatchDetails, BatchExport, BatchSnapshot, ClaimRecord, DiagnosisRecord, FacilityInfo,
    GdrgRecord, ItemRecord, ParsedBatch, PatientRecord, TotalsRecord,
};
pub use writer::{export_filename, NhiaXmlWriter, CONTENT_TYPE, NHIA_NAMESPACE, SCHEMA_VERSION};
pub use parser::parse_batch_xml;
pub use service::{ExportDocument, ExportService};
pub use error::ExportError;
