use std::sync::Arc;

use crate::domain::{ComplianceIssue, RestrictedCountry, Shipment};
use crate::rules::traits::{CheckResult, ShipmentCheck};

/// Destination-country screening against the restricted-country list.
#[derive(Debug)]
pub struct RestrictedCountryCheck {
    id: String,
    countries: Arc<[RestrictedCountry]>,
}

impl RestrictedCountryCheck {
    pub fn new(id: impl Into<String>, countries: impl Into<Arc<[RestrictedCountry]>>) -> Self {
        RestrictedCountryCheck {
            id: id.into(),
            countries: countries.into(),
        }
    }
}

impl ShipmentCheck for RestrictedCountryCheck {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, shipment: &Shipment) -> CheckResult {
        let Some(country) = self.countries.iter().find(|c| c.matches(shipment)) else {
            return CheckResult::pass();
        };

        let reason = country
            .restriction_reason
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("Country is restricted");

        CheckResult::flag(
            ComplianceIssue::high(
                "Restricted Country",
                format!(
                    "{} has restriction level: {}",
                    country.display_name(),
                    country.restriction_level
                ),
            )
            .with_reason(reason),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use uuid::Uuid;

    fn country(code: &str, reason: Option<&str>) -> RestrictedCountry {
        RestrictedCountry {
            id: Uuid::new_v4(),
            country_code: code.to_string(),
            country_name: "Restricted Land".to_string(),
            restriction_level: "HIGH".to_string(),
            restriction_reason: reason.map(String::from),
        }
    }

    #[test]
    fn test_allowed_country() {
        let check = RestrictedCountryCheck::new("restricted_country", vec![country("IR", None)]);
        let result = check.evaluate(&Shipment::new("Books", "US"));

        assert!(!result.hit());
    }

    #[test]
    fn test_restricted_country_is_trimmed_and_case_insensitive() {
        let check = RestrictedCountryCheck::new("restricted_country", vec![country(" us ", None)]);
        let result = check.evaluate(&Shipment::new("Books", "US"));

        assert!(result.hit());
        assert!(!result.is_terminal());
        let issue = &result.issues[0];
        assert_eq!(issue.rule_name, "Restricted Country");
        assert_eq!(issue.priority, Some(Priority::High));
        assert_eq!(issue.reason.as_deref(), Some("Country is restricted"));
        assert_eq!(issue.description, "Restricted Land has restriction level: HIGH");
    }

    #[test]
    fn test_restriction_reason_is_carried() {
        let check = RestrictedCountryCheck::new(
            "restricted_country",
            vec![country("KP", Some("UN sanctions"))],
        );
        let result = check.evaluate(&Shipment::new("Books", "kp"));

        assert_eq!(result.issues[0].reason.as_deref(), Some("UN sanctions"));
    }

    #[test]
    fn test_empty_destination() {
        let check = RestrictedCountryCheck::new("restricted_country", vec![country("IR", None)]);
        let result = check.evaluate(&Shipment::new("Books", ""));

        assert!(!result.hit());
    }
}
