use serde::{Deserialize, Serialize};
use std::fmt;

use super::issue::{ComplianceIssue, Priority};

/// Compliance classification with severity ordering.
///
/// Statuses are ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ComplianceStatus {
    /// No issues detected
    Compliant = 0,
    /// Only MEDIUM/LOW issues, manual review recommended
    Review = 1,
    /// At least one HIGH priority issue
    Flagged = 2,
    /// Shipment contains a prohibited item (hard block)
    Rejected = 3,
}

impl ComplianceStatus {
    /// Resolve the status of a non-rejected shipment from its issues.
    pub fn resolve(issues: &[ComplianceIssue]) -> Self {
        if issues.is_empty() {
            ComplianceStatus::Compliant
        } else if issues.iter().any(|i| i.priority == Some(Priority::High)) {
            ComplianceStatus::Flagged
        } else {
            ComplianceStatus::Review
        }
    }

    /// Returns true if this is a hard rejection.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        *self == ComplianceStatus::Rejected
    }

    /// Returns true if no issues were detected.
    #[inline]
    pub fn is_compliant(&self) -> bool {
        *self == ComplianceStatus::Compliant
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "COMPLIANT",
            ComplianceStatus::Review => "REVIEW",
            ComplianceStatus::Flagged => "FLAGGED",
            ComplianceStatus::Rejected => "REJECTED",
        }
    }

    /// Parse from string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "COMPLIANT" => Some(ComplianceStatus::Compliant),
            "REVIEW" => Some(ComplianceStatus::Review),
            "FLAGGED" => Some(ComplianceStatus::Flagged),
            "REJECTED" => Some(ComplianceStatus::Rejected),
            _ => None,
        }
    }
}

impl Default for ComplianceStatus {
    fn default() -> Self {
        ComplianceStatus::Compliant
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
