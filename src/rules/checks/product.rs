use crate::domain::rule::ProductConditions;
use crate::domain::{ComplianceIssue, ComplianceRule, Shipment};
use crate::rules::traits::{CheckResult, ShipmentCheck};

/// Product-specific trade rule (tariff, ban, quota...).
///
/// Applies when the shipment's item name contains the product name or the
/// product name contains the item name. Destination and origin filters,
/// when present, narrow the rule further.
#[derive(Debug)]
pub struct ProductRuleCheck {
    id: String,
    rule_type: String,
    product_name: String,
    product_lower: String,
    filters: ProductConditions,
    description: Option<String>,
    source_link: Option<String>,
    last_verified: Option<String>,
}

impl ProductRuleCheck {
    /// Build a check from a rule that carries a product name.
    pub fn from_rule(rule: &ComplianceRule) -> Option<Self> {
        let product_name = rule.product_name()?.to_string();

        Some(ProductRuleCheck {
            id: format!("product:{}", rule.id),
            rule_type: rule.rule_type().to_string(),
            product_lower: product_name.to_lowercase(),
            product_name,
            filters: rule.product_filters.clone(),
            description: rule.description.clone().filter(|d| !d.trim().is_empty()),
            source_link: rule.source_link.clone(),
            last_verified: rule.last_verified.clone(),
        })
    }

    fn name_matches(&self, item_lower: &str) -> bool {
        !item_lower.is_empty()
            && (item_lower.contains(&self.product_lower) || self.product_lower.contains(item_lower))
    }

    fn route_matches(&self, shipment: &Shipment) -> bool {
        let to = &self.filters.to_countries;
        if !to.is_empty() && !to.iter().any(|c| shipment.destination_country.matches(c)) {
            return false;
        }

        // Origin filters only apply when the shipment states an origin.
        let from = &self.filters.from_countries;
        match &shipment.origin_country {
            Some(origin) if !from.is_empty() && !origin.is_blank() => {
                from.iter().any(|c| origin.matches(c))
            }
            _ => true,
        }
    }

    fn describe(&self) -> String {
        let mut details = self
            .description
            .clone()
            .unwrap_or_else(|| format!("Trade restriction applies to {}", self.product_name));

        if let Some(rate) = &self.filters.tariff_rate {
            details.push_str(&format!(" Tariff rate: {}", rate));
        }
        if let Some(date) = &self.filters.effective_date {
            details.push_str(&format!(" Effective: {}", date));
        }
        details
    }
}

impl ShipmentCheck for ProductRuleCheck {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, shipment: &Shipment) -> CheckResult {
        if !self.name_matches(&shipment.item_name_lower()) || !self.route_matches(shipment) {
            return CheckResult::pass();
        }

        CheckResult::flag(
            ComplianceIssue::medium(
                format!("{} on {}", self.rule_type, self.product_name),
                self.describe(),
            )
            .with_source(self.source_link.clone(), self.last_verified.clone()),
        )
    }
}
