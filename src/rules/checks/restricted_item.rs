use std::sync::Arc;

use crate::domain::{ComplianceIssue, RestrictedItem, Shipment};
use crate::rules::traits::{CheckResult, ShipmentCheck};

/// Restricted-item keyword screening.
///
/// The first entry whose name is a case-insensitive substring of the
/// shipment's item name wins; there is no ranking between matches.
/// A PROHIBITED match ends evaluation, a RESTRICTED match only flags.
#[derive(Debug)]
pub struct RestrictedItemCheck {
    id: String,
    items: Arc<[RestrictedItem]>,
}

impl RestrictedItemCheck {
    pub fn new(id: impl Into<String>, items: impl Into<Arc<[RestrictedItem]>>) -> Self {
        RestrictedItemCheck {
            id: id.into(),
            items: items.into(),
        }
    }

    /// Find the first restricted item matching an item name.
    pub fn find_match(&self, item_name: &str) -> Option<&RestrictedItem> {
        let lower = item_name.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        self.items.iter().find(|item| item.matches_lower(&lower))
    }
}

impl ShipmentCheck for RestrictedItemCheck {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, shipment: &Shipment) -> CheckResult {
        let Some(item) = self.find_match(&shipment.item_name) else {
            return CheckResult::pass();
        };

        let requirements = item
            .requirements
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .map(|r| format!(". {}", r))
            .unwrap_or_default();

        let issue = ComplianceIssue::high(
            format!("{} ITEM", item.severity),
            format!(
                "This item ({}) matches a {} item: {}. {}{}",
                shipment.item_name,
                item.severity.as_str().to_lowercase(),
                item.item_name,
                item.description,
                requirements
            ),
        )
        .with_source(item.source_link.clone(), item.effective_date.clone());

        if item.is_prohibited() {
            CheckResult::reject(issue, item.item_name.clone())
        } else {
            CheckResult::flag(issue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Severity};
    use uuid::Uuid;

    fn item(name: &str, severity: Severity) -> RestrictedItem {
        RestrictedItem {
            id: Uuid::new_v4(),
            item_name: name.to_string(),
            severity,
            category: "General".to_string(),
            description: "Listed item.".to_string(),
            requirements: Some("Permit required".to_string()),
            source_link: None,
            effective_date: None,
        }
    }

    #[test]
    fn test_clean_item() {
        let check = RestrictedItemCheck::new("restricted_item", vec![item("ivory", Severity::Prohibited)]);
        let result = check.evaluate(&Shipment::new("Wooden Chair", "US"));

        assert!(!result.hit());
    }

    #[test]
    fn test_prohibited_item_rejects() {
        let check = RestrictedItemCheck::new("restricted_item", vec![item("ivory", Severity::Prohibited)]);
        let result = check.evaluate(&Shipment::new("Ivory Carving", "US"));

        assert!(result.is_terminal());
        assert!(result.issues.is_empty());
        let rejection = result.rejection.unwrap();
        assert_eq!(rejection.item_name, "ivory");
        assert_eq!(rejection.issue.rule_name, "PROHIBITED ITEM");
        assert_eq!(rejection.issue.priority, Some(Priority::High));
        assert!(rejection.issue.description.contains("Permit required"));
    }

    #[test]
    fn test_restricted_item_flags_without_rejecting() {
        let check = RestrictedItemCheck::new(
            "restricted_item",
            vec![item("battery", Severity::Restricted)],
        );
        let result = check.evaluate(&Shipment::new("Lithium BATTERY pack", "US"));

        assert!(result.hit());
        assert!(!result.is_terminal());
        assert_eq!(result.issues[0].rule_name, "RESTRICTED ITEM");
        assert!(result.issues[0]
            .description
            .contains("matches a restricted item: battery"));
    }

    #[test]
    fn test_first_match_wins() {
        let check = RestrictedItemCheck::new(
            "restricted_item",
            vec![
                item("carving", Severity::Restricted),
                item("ivory", Severity::Prohibited),
            ],
        );
        let result = check.evaluate(&Shipment::new("Ivory Carving", "US"));

        assert!(!result.is_terminal());
        assert!(result.issues[0].description.contains("carving"));
    }

    #[test]
    fn test_blank_item_name_never_matches() {
        let check = RestrictedItemCheck::new("restricted_item", vec![item("ivory", Severity::Prohibited)]);
        assert!(check.find_match("   ").is_none());
    }
}
