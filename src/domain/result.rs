use chrono::{DateTime, Utc};
use serde::Serialize;
use smallvec::SmallVec;

use super::issue::ComplianceIssue;
use super::shipment::Shipment;
use super::status::ComplianceStatus;

/// Issue list; most shipments produce at most a handful of issues.
pub type Issues = SmallVec<[ComplianceIssue; 4]>;

pub const COMPLIANT_DETAILS: &str = "This shipment complies with all regulations.";

/// Rule name of the issue attached to shipments that could not be evaluated.
pub const EVALUATION_ERROR: &str = "Evaluation Error";

/// Outcome of evaluating one shipment.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceResult {
    pub status: ComplianceStatus,

    pub shipment: Shipment,

    /// Summary chosen from the status
    pub details: String,

    pub issues: Issues,

    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl ComplianceResult {
    /// Result for a shipment that hit a prohibited item.
    pub fn rejected(shipment: Shipment, issue: ComplianceIssue, item_name: &str) -> Self {
        let mut issues = Issues::new();
        issues.push(issue);

        ComplianceResult {
            status: ComplianceStatus::Rejected,
            shipment,
            details: format!(
                "Shipment contains prohibited item: {}. Export is not allowed.",
                item_name
            ),
            issues,
            last_updated: Utc::now(),
        }
    }

    /// Result resolved from the collected issues.
    pub fn from_issues(shipment: Shipment, issues: Issues) -> Self {
        let status = ComplianceStatus::resolve(&issues);

        ComplianceResult {
            status,
            details: details_for(status, issues.len()),
            shipment,
            issues,
            last_updated: Utc::now(),
        }
    }

    /// Result for a shipment that could not be evaluated.
    ///
    /// Degrades to REVIEW with an explanatory issue so a batch can continue.
    pub fn degraded(shipment: Shipment, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut issues = Issues::new();
        issues.push(
            ComplianceIssue::medium(
                EVALUATION_ERROR,
                "This shipment could not be evaluated automatically. Manual review required.",
            )
            .with_reason(reason),
        );

        ComplianceResult {
            status: ComplianceStatus::Review,
            details: details_for(ComplianceStatus::Review, issues.len()),
            shipment,
            issues,
            last_updated: Utc::now(),
        }
    }

    /// Whether this result came from [`ComplianceResult::degraded`].
    pub fn is_degraded(&self) -> bool {
        self.issues.iter().any(|i| i.rule_name == EVALUATION_ERROR)
    }
}

fn details_for(status: ComplianceStatus, count: usize) -> String {
    match status {
        ComplianceStatus::Compliant => COMPLIANT_DETAILS.to_string(),
        ComplianceStatus::Flagged => format!(
            "Significant compliance issues detected: shipment is flagged for {} issue(s).",
            count
        ),
        ComplianceStatus::Review => format!(
            "Minor compliance issues detected: {} issue(s) found. Review recommended.",
            count
        ),
        // Rejections carry the prohibited item name and are built by `rejected`.
        ComplianceStatus::Rejected => "Shipment contains a prohibited item.".to_string(),
    }
}
