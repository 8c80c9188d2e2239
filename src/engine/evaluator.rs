use crate::domain::{
    ComplianceResult, ComplianceRule, RestrictedCountry, RestrictedItem, Shipment,
};
use crate::rules::RuleSet;

/// Evaluate one shipment against the three rule collections.
///
/// Equivalent to compiling a [`RuleSet`] and evaluating once; callers that
/// evaluate many shipments against the same collections should compile the
/// rule set once and share it.
pub fn evaluate(
    shipment: &Shipment,
    rules: &[ComplianceRule],
    restricted_countries: &[RestrictedCountry],
    restricted_items: &[RestrictedItem],
) -> ComplianceResult {
    RuleSet::build(rules, restricted_countries, restricted_items).evaluate(shipment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComplianceStatus, Priority, RuleDraft, Severity};
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    fn rule(rule_type: &str, conditions: serde_json::Value) -> ComplianceRule {
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
                is_active: true,
            },
        )
    }

    fn item(name: &str, severity: Severity) -> RestrictedItem {
        RestrictedItem {
            id: Uuid::new_v4(),
            item_name: name.to_string(),
            severity,
            category: "General".to_string(),
            description: String::new(),
            requirements: None,
            source_link: None,
            effective_date: None,
        }
    }

    fn country(code: &str) -> RestrictedCountry {
        RestrictedCountry {
            id: Uuid::new_v4(),
            country_code: code.to_string(),
            country_name: String::new(),
            restriction_level: "HIGH".to_string(),
            restriction_reason: None,
        }
    }

    #[test]
    fn test_no_matches_is_compliant() {
        let rules = vec![
            rule("VALUE", json!({"threshold": 10000})),
            rule("WEIGHT", json!({"max_weight": 100})),
        ];
        let shipment = Shipment::new("Books", "DE")
            .with_value(Decimal::new(20, 0))
            .with_weight(Decimal::new(1, 0));

        let result = evaluate(&shipment, &rules, &[country("KP")], &[item("ivory", Severity::Prohibited)]);

        assert_eq!(result.status, ComplianceStatus::Compliant);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_prohibited_item_suppresses_other_checks() {
        let rules = vec![rule("VALUE", json!({"threshold": 1}))];
        let shipment = Shipment::new("Ivory Carving", "US").with_value(Decimal::new(5000, 0));

        let result = evaluate(&shipment, &rules, &[country("US")], &[item("ivory", Severity::Prohibited)]);

        assert_eq!(result.status, ComplianceStatus::Rejected);
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues.iter().all(|i| i.rule_name != "Restricted Country"));
        assert!(result.details.contains("prohibited item"));
        assert!(result.details.contains("ivory"));
    }

    #[test]
    fn test_restricted_item_alone_is_flagged() {
        let shipment = Shipment::new("Lithium Batteries", "DE");

        let result = evaluate(&shipment, &[], &[], &[item("lithium", Severity::Restricted)]);

        assert_eq!(result.status, ComplianceStatus::Flagged);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].priority, Some(Priority::High));
    }

    #[test]
    fn test_value_and_weight_over_is_review() {
        let rules = vec![
            rule("VALUE", json!({"threshold": 1000})),
            rule("WEIGHT", json!({"max_weight": 30})),
        ];
        let shipment = Shipment::new("Server rack", "DE")
            .with_value(Decimal::new(2000, 0))
            .with_weight(Decimal::new(45, 0));

        let result = evaluate(&shipment, &rules, &[], &[]);

        assert_eq!(result.status, ComplianceStatus::Review);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].rule_name, "High Value Shipment");
        assert_eq!(result.issues[1].rule_name, "Excess Weight");
        assert!(result.details.contains("2 issue(s)"));
    }

    #[test]
    fn test_country_match_ignores_case_and_whitespace() {
        let result = evaluate(&Shipment::new("Books", "US"), &[], &[country(" us ")], &[]);

        assert_eq!(result.status, ComplianceStatus::Flagged);
        assert_eq!(result.issues[0].rule_name, "Restricted Country");
    }

    #[test]
    fn test_lithium_batteries_scenario() {
        let rules = vec![rule("VALUE", json!({"threshold": 1000}))];
        let shipment = Shipment::new("Lithium Batteries", "US")
            .with_value(Decimal::new(5000, 0))
            .with_weight(Decimal::new(10, 0));

        let result = evaluate(&shipment, &rules, &[], &[]);

        assert_eq!(result.status, ComplianceStatus::Review);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].rule_name, "High Value Shipment");
        assert_eq!(result.shipment, shipment);
    }

    #[test]
    fn test_restricted_item_and_product_rule_accumulate() {
        let mut tariff = rule("TARIFF", json!({"to_countries": ["US"], "tariff_rate": "25%"}));
        tariff.product_name = Some("battery".to_string());
        let shipment = Shipment::new("Battery pack", "us");

        let result = evaluate(&shipment, &[tariff], &[], &[item("battery", Severity::Restricted)]);

        assert_eq!(result.status, ComplianceStatus::Flagged);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].rule_name, "RESTRICTED ITEM");
        assert_eq!(result.issues[1].rule_name, "TARIFF on battery");
    }

    #[test]
    fn test_destination_filter_on_documentation_rule() {
        let mut wine = rule("DOCUMENTATION", json!({"to_countries": ["FR"]}));
        wine.product_name = Some("Wine".to_string());
        let rules = vec![wine];

        let result = evaluate(&Shipment::new("Red wine", "JP"), &rules, &[], &[]);
        assert_eq!(result.status, ComplianceStatus::Compliant);

        let result = evaluate(&Shipment::new("Red wine", "FR"), &rules, &[], &[]);
        assert_eq!(result.status, ComplianceStatus::Review);
        assert_eq!(result.issues[0].rule_name, "DOCUMENTATION on Wine");
    }

    #[test]
    fn test_country_name_match_is_unicode_case_insensitive() {
        let ivory_coast = RestrictedCountry {
            country_code: "CI".to_string(),
            country_name: "Côte d'Ivoire".to_string(),
            ..country("CI")
        };

        let result = evaluate(&Shipment::new("Cocoa", "CÔTE D'IVOIRE"), &[], &[ivory_coast], &[]);

        assert_eq!(result.status, ComplianceStatus::Flagged);
        assert_eq!(result.issues[0].rule_name, "Restricted Country");
    }

    #[test]
    fn test_malformed_numbers_never_match() {
        let rules = vec![
            rule("VALUE", json!({"threshold": "lots"})),
            rule("WEIGHT", json!({"max_weight": null})),
        ];
        let shipment = Shipment::new("Books", "DE")
            .with_value(Decimal::new(1_000_000, 0))
            .with_weight(Decimal::new(1_000, 0));

        let result = evaluate(&shipment, &rules, &[], &[]);

        assert_eq!(result.status, ComplianceStatus::Compliant);
    }

    #[test]
    fn test_inactive_rules_are_ignored() {
        let mut value = rule("VALUE", json!({"threshold": 1}));
        value.is_active = false;
        let shipment = Shipment::new("Books", "DE").with_value(Decimal::new(100, 0));

        let result = evaluate(&shipment, &[value], &[], &[]);

        assert_eq!(result.status, ComplianceStatus::Compliant);
    }
}
