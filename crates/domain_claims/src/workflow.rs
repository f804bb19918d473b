//! Claim status workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claim::ClaimStatus;

/// One recorded status change on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTransition {
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub actor: String,
    pub at: DateTime<Utc>,
}

/// Whether a claim may move directly from one status to another
pub fn is_allowed(from: ClaimStatus, to: ClaimStatus) -> bool {
    use ClaimStatus::*;
    matches!(
        (from, to),
        (Draft, PendingVetting) |
        (PendingVetting, Vetted) |
        (Vetted, Submitted) |
        (Submitted, Approved) |
        (Submitted, Rejected) |
        (Approved, Paid) |
        (Rejected, Vetted)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resubmission_path_allowed() {
        assert!(is_allowed(ClaimStatus::Rejected, ClaimStatus::Vetted));
        assert!(!is_allowed(ClaimStatus::Paid, ClaimStatus::Vetted));
        assert!(!is_allowed(ClaimStatus::Draft, ClaimStatus::Vetted));
    }
}
