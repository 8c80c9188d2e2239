pub mod checks;
pub mod traits;

pub use checks::{
    ProductRuleCheck, RestrictedCountryCheck, RestrictedItemCheck, ValueThresholdCheck,
    WeightThresholdCheck,
};
pub use traits::{CheckResult, Rejection, ShipmentCheck};

use std::sync::Arc;
use tracing::debug;

use crate::domain::{
    ComplianceResult, ComplianceRule, Issues, RestrictedCountry, RestrictedItem, RuleBook,
    RuleConditions, Shipment,
};

/// Checks compiled from one fetch of the rule store, in priority order.
///
/// Order is significant: restricted items first (a PROHIBITED hit ends
/// evaluation), then restricted countries, the value and weight thresholds,
/// and finally product-specific rules.
pub struct RuleSet {
    pub checks: Vec<Arc<dyn ShipmentCheck>>,
    pub version: String,
}

impl RuleSet {
    /// Compile checks from the three collections.
    ///
    /// Only active rules participate. The first active VALUE and WEIGHT
    /// rules are used; later ones of the same type are ignored.
    pub fn build(
        rules: &[ComplianceRule],
        restricted_countries: &[RestrictedCountry],
        restricted_items: &[RestrictedItem],
    ) -> Self {
        let mut checks: Vec<Arc<dyn ShipmentCheck>> = vec![
            Arc::new(RestrictedItemCheck::new(
                "restricted_item",
                restricted_items.to_vec(),
            )),
            Arc::new(RestrictedCountryCheck::new(
                "restricted_country",
                restricted_countries.to_vec(),
            )),
        ];

        let active: Vec<&ComplianceRule> = rules.iter().filter(|r| r.is_active).collect();

        let value_rule = active.iter().find_map(|r| match &r.conditions {
            RuleConditions::Value(c) => Some((r.id, c)),
            _ => None,
        });
        if let Some((id, conditions)) = value_rule {
            checks.push(Arc::new(ValueThresholdCheck::new(
                format!("value:{}", id),
                conditions.clone(),
            )));
        }

        let weight_rule = active.iter().find_map(|r| match &r.conditions {
            RuleConditions::Weight(c) => Some((r.id, c)),
            _ => None,
        });
        if let Some((id, conditions)) = weight_rule {
            checks.push(Arc::new(WeightThresholdCheck::new(
                format!("weight:{}", id),
                conditions.clone(),
            )));
        }

        for rule in &active {
            if let Some(check) = ProductRuleCheck::from_rule(rule) {
                checks.push(Arc::new(check));
            }
        }

        RuleSet {
            checks,
            version: "adhoc".to_string(),
        }
    }

    /// Compile checks from a fetched rulebook.
    pub fn from_rulebook(book: &RuleBook) -> Self {
        let mut ruleset = RuleSet::build(
            &book.rules,
            &book.restricted_countries,
            &book.restricted_items,
        );
        ruleset.version = book.version.clone();
        ruleset
    }

    /// Create an empty rule set.
    pub fn empty() -> Self {
        RuleSet {
            checks: Vec::new(),
            version: "0.0.0".to_string(),
        }
    }

    /// Evaluate one shipment.
    ///
    /// Pure apart from the result timestamp; never fails.
    pub fn evaluate(&self, shipment: &Shipment) -> ComplianceResult {
        let mut issues = Issues::new();

        for check in &self.checks {
            let result = check.evaluate(shipment);

            if let Some(rejection) = result.rejection {
                debug!(
                    check = check.id(),
                    item = %shipment.item_name,
                    "Shipment rejected"
                );
                return ComplianceResult::rejected(
                    shipment.clone(),
                    rejection.issue,
                    &rejection.item_name,
                );
            }

            if !result.issues.is_empty() {
                debug!(check = check.id(), count = result.issues.len(), "Check triggered");
                issues.extend(result.issues);
            }
        }

        ComplianceResult::from_issues(shipment.clone(), issues)
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("version", &self.version)
            .field("checks", &self.checks.iter().map(|c| c.id()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComplianceStatus, RuleDraft, Severity};
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    fn rule(rule_type: &str, conditions: serde_json::Value, active: bool) -> ComplianceRule {
        ComplianceRule::from_draft(
            Uuid::new_v4(),
            RuleDraft {
                rule_name: None,
                rule_type: rule_type.to_string(),
                product_name: None,
                rule_conditions: conditions,
                description: None,
                source_link: None,
                last_verified: None,
                is_active: active,
            },
        )
    }

    #[test]
    fn test_build_orders_checks() {
        let mut tariff = rule("TARIFF", json!({}), true);
        tariff.product_name = Some("Steel".to_string());

        let rules = vec![
            tariff,
            rule("WEIGHT", json!({"max_weight": 30}), true),
            rule("VALUE", json!({"threshold": 1000}), true),
            rule("VALUE", json!({"threshold": 10}), true),
        ];
        let ruleset = RuleSet::build(&rules, &[], &[]);

        let ids: Vec<&str> = ruleset.checks.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(ids[0], "restricted_item");
        assert_eq!(ids[1], "restricted_country");
        assert!(ids[2].starts_with("value:"));
        assert!(ids[3].starts_with("weight:"));
        assert!(ids[4].starts_with("product:"));
    }

    #[test]
    fn test_first_active_value_rule_is_used() {
        let rules = vec![
            rule("VALUE", json!({"threshold": 10}), false),
            rule("VALUE", json!({"threshold": 1000}), true),
            rule("VALUE", json!({"threshold": 10}), true),
        ];
        let ruleset = RuleSet::build(&rules, &[], &[]);

        let shipment = Shipment::new("Books", "DE").with_value(Decimal::new(500, 0));
        let result = ruleset.evaluate(&shipment);

        assert_eq!(result.status, ComplianceStatus::Compliant);
    }

    #[test]
    fn test_rejection_stops_evaluation() {
        let items = vec![RestrictedItem {
            id: Uuid::new_v4(),
            item_name: "ivory".to_string(),
            severity: Severity::Prohibited,
            category: "Wildlife".to_string(),
            description: String::new(),
            requirements: None,
            source_link: None,
            effective_date: None,
        }];
        let countries = vec![RestrictedCountry {
            id: Uuid::new_v4(),
            country_code: "US".to_string(),
            country_name: "United States".to_string(),
            restriction_level: "HIGH".to_string(),
            restriction_reason: None,
        }];
        let ruleset = RuleSet::build(&[], &countries, &items);

        let result = ruleset.evaluate(&Shipment::new("Ivory Carving", "US"));

        assert_eq!(result.status, ComplianceStatus::Rejected);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].rule_name, "PROHIBITED ITEM");
    }

    #[test]
    fn test_ruleset_from_rulebook_keeps_version() {
        let book = RuleBook {
            version: "2025-03-01.1".to_string(),
            ..RuleBook::empty()
        };
        let ruleset = RuleSet::from_rulebook(&book);

        assert_eq!(ruleset.version, "2025-03-01.1");
        assert_eq!(ruleset.checks.len(), 2);
    }
}
