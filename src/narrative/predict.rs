use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ComplianceRule, Shipment};

pub const NO_RECOMMENDATIONS: &str =
    "No specific compliance recommendations available at this time.";

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub prediction: String,
    pub timestamp: DateTime<Utc>,
}

impl Prediction {
    /// Wrap model text, falling back when it is blank.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        Prediction {
            prediction: if text.is_empty() {
                NO_RECOMMENDATIONS.to_string()
            } else {
                text.to_string()
            },
            timestamp: Utc::now(),
        }
    }
}

fn rule_line(rule: &ComplianceRule) -> String {
    let to_countries = &rule.product_filters.to_countries;
    let applies_to = if to_countries.is_empty() {
        "All countries".to_string()
    } else {
        to_countries.join(", ")
    };

    format!(
        "{}: {} (Applies to: {})",
        rule.label(),
        rule.description.as_deref().unwrap_or("No description"),
        applies_to
    )
}

pub fn predict_prompt(shipment: &Shipment, rules: &[ComplianceRule]) -> String {
    let rule_descriptions = if rules.is_empty() {
        "No specific rules found.".to_string()
    } else {
        rules.iter().map(rule_line).collect::<Vec<_>>().join("\n")
    };

    let value = shipment
        .declared_value
        .map(|v| format!("${}", v))
        .unwrap_or_else(|| "Not provided".to_string());
    let weight = shipment
        .weight
        .map(|w| format!("{} kg", w))
        .unwrap_or_else(|| "Not provided".to_string());

    format!(
        r#"You are a compliance expert specializing in international shipping regulations.

PRODUCT INFORMATION:
- Product Name: {item}
- Commodity Code (if available): {code}
- Declared Value: {value}
- Weight: {weight}
- Destination Country: {destination}

EXISTING RULES IN THE SYSTEM:
{rule_descriptions}

Please provide specific compliance recommendations for shipping this product to {destination}.
Focus on:
1. Documentation requirements specific to this product and destination
2. Packaging requirements
3. Labeling requirements
4. Import duties and taxes expectations
5. Any special permits or certifications needed

If there are no special requirements beyond standard shipping procedures, state "NO SPECIAL REQUIREMENTS" and provide brief general guidance.

Format your response in HTML paragraphs that can be included directly in a report. Keep it concise (max 250 words) and professional."#,
        item = shipment.item_name,
        code = shipment.commodity_code.as_deref().unwrap_or("Not provided"),
        destination = shipment.destination_country,
    )
}

pub fn help_chat_prompt(message: &str) -> String {
    format!(
        r#"I need help with a compliance question related to trade compliance systems.

As a compliance assistant, please help me with: {message}

When answering, focus on:
- How to check shipments for compliance issues
- How to interpret compliance flags and warnings
- Understanding restricted items and countries
- Navigating compliance dashboards"#
    )
}
