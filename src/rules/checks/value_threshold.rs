use crate::domain::numeric::{effective_bound, exceeds};
use crate::domain::rule::ValueConditions;
use crate::domain::{ComplianceIssue, Shipment};
use crate::rules::traits::{CheckResult, ShipmentCheck};

const DEFAULT_DOCUMENTATION: &str = "Commercial Invoice";

/// Declared-value threshold rule.
///
/// Fires when the declared value strictly exceeds the threshold. A missing,
/// zero, or malformed threshold (or declared value) disables the check.
#[derive(Debug)]
pub struct ValueThresholdCheck {
    id: String,
    conditions: ValueConditions,
}

impl ValueThresholdCheck {
    pub fn new(id: impl Into<String>, conditions: ValueConditions) -> Self {
        ValueThresholdCheck {
            id: id.into(),
            conditions,
        }
    }

    fn threshold_label(&self) -> Option<String> {
        let threshold = effective_bound(self.conditions.threshold)?.normalize();
        Some(match self.conditions.currency.as_deref() {
            None => format!("${}", threshold),
            Some(c) if c.eq_ignore_ascii_case("USD") => format!("${}", threshold),
            Some(c) => format!("{} {}", threshold, c),
        })
    }

    fn documentation(&self) -> String {
        if self.conditions.documentation_required.is_empty() {
            DEFAULT_DOCUMENTATION.to_string()
        } else {
            self.conditions.documentation_required.join(", ")
        }
    }
}

impl ShipmentCheck for ValueThresholdCheck {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, shipment: &Shipment) -> CheckResult {
        if !exceeds(shipment.declared_value, self.conditions.threshold) {
            return CheckResult::pass();
        }

        let Some(threshold) = self.threshold_label() else {
            return CheckResult::pass();
        };

        CheckResult::flag(ComplianceIssue::medium(
            "High Value Shipment",
            format!(
                "Value exceeds {}. Additional documentation required: {}",
                threshold,
                self.documentation()
            ),
        ))
    }
}
