use std::fmt::Debug;

use crate::domain::{ComplianceIssue, Shipment};

/// A finding that ends evaluation with a REJECTED status.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub issue: ComplianceIssue,

    /// Name of the prohibited item that caused the rejection
    pub item_name: String,
}

/// Result of running one check against a shipment.
#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    /// Issues raised by the check, in order
    pub issues: Vec<ComplianceIssue>,

    /// Set when the shipment must be rejected outright
    pub rejection: Option<Rejection>,
}

impl CheckResult {
    /// The check found nothing.
    #[inline]
    pub fn pass() -> Self {
        CheckResult::default()
    }

    /// The check raised one issue.
    pub fn flag(issue: ComplianceIssue) -> Self {
        CheckResult {
            issues: vec![issue],
            rejection: None,
        }
    }

    /// The check raised an issue that ends evaluation.
    pub fn reject(issue: ComplianceIssue, item_name: impl Into<String>) -> Self {
        CheckResult {
            issues: Vec::new(),
            rejection: Some(Rejection {
                issue,
                item_name: item_name.into(),
            }),
        }
    }

    #[inline]
    pub fn hit(&self) -> bool {
        !self.issues.is_empty() || self.rejection.is_some()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.rejection.is_some()
    }
}

/// A single compliance check over one shipment.
///
/// Checks are pure and synchronous: they read only the shipment and the
/// data they were built with. A check that cannot evaluate because its
/// inputs are missing or malformed must pass rather than fail.
pub trait ShipmentCheck: Send + Sync + Debug {
    /// Identifier used in logs and metrics.
    fn id(&self) -> &str;

    /// Evaluate the check against a shipment.
    fn evaluate(&self, shipment: &Shipment) -> CheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct AlwaysFlag;

    impl ShipmentCheck for AlwaysFlag {
        fn id(&self) -> &str {
            "always_flag"
        }

        fn evaluate(&self, _shipment: &Shipment) -> CheckResult {
            CheckResult::flag(ComplianceIssue::medium("Test", "always flags"))
        }
    }

    #[test]
    fn test_check_trait() {
        let check = AlwaysFlag;
        let result = check.evaluate(&Shipment::new("Books", "DE"));

        assert_eq!(check.id(), "always_flag");
        assert!(result.hit());
        assert!(!result.is_terminal());
    }

    #[test]
    fn test_reject_is_terminal() {
        let result = CheckResult::reject(ComplianceIssue::high("PROHIBITED ITEM", "x"), "ivory");
        assert!(result.is_terminal());
        assert!(result.hit());
        assert_eq!(result.rejection.unwrap().item_name, "ivory");
        assert!(!CheckResult::pass().hit());
    }
}
