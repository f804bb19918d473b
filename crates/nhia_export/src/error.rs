//! Export errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Batch {0} must be finalized before it can be exported")]
    BatchNotFinalized(String),

    #[error("Claim {0} is listed in the batch but was not supplied")]
    MissingClaim(String),

    #[error("Missing element <{0}>")]
    MissingElement(String),

    #[error("Unexpected root element <{0}>, expected <NHIAClaimBatch>")]
    UnexpectedRoot(String),

    #[error("Invalid value {value:?} in <{element}>")]
    InvalidValue { element: String, value: String },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generated document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Storage error: {0}")]
    Port(#[from] core_kernel::PortError),
}

impl ExportError {
    pub fn invalid(element: &str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            element: element.to_string(),
            value: value.into(),
        }
    }
}
