use crate::domain::numeric::{effective_bound, exceeds};
use crate::domain::rule::WeightConditions;
use crate::domain::{ComplianceIssue, Shipment};
use crate::rules::traits::{CheckResult, ShipmentCheck};

const DEFAULT_UNIT: &str = "kg";

/// Maximum-weight rule.
#[derive(Debug)]
pub struct WeightThresholdCheck {
    id: String,
    conditions: WeightConditions,
}

impl WeightThresholdCheck {
    pub fn new(id: impl Into<String>, conditions: WeightConditions) -> Self {
        WeightThresholdCheck {
            id: id.into(),
            conditions,
        }
    }
}

impl ShipmentCheck for WeightThresholdCheck {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, shipment: &Shipment) -> CheckResult {
        if !exceeds(shipment.weight, self.conditions.max_weight) {
            return CheckResult::pass();
        }

        let Some(max_weight) = effective_bound(self.conditions.max_weight) else {
            return CheckResult::pass();
        };
        let unit = self.conditions.unit.as_deref().unwrap_or(DEFAULT_UNIT);

        CheckResult::flag(ComplianceIssue::medium(
            "Excess Weight",
            format!(
                "Weight exceeds {}{}. Consider splitting shipment or using specialized shipping service.",
                max_weight.normalize(),
                unit
            ),
        ))
    }
}
