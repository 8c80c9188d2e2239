use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::{RestrictedItem, Severity};

use super::research::extract_json;

pub const ASSESSMENT_FALLBACK_DETAILS: &str =
    "Could not verify trade restriction details due to technical issues.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum AssessmentStatus {
    Compliant,
    NonCompliant,
    Warning,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentMetadata {
    #[serde(default)]
    pub region_restrictions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tariff_rate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,

    /// Free-form; models return both numbers and strings here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
}

/// Model verdict on whether an item carries trade restrictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAssessment {
    pub status: AssessmentStatus,
    pub item: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub metadata: AssessmentMetadata,
}

impl ItemAssessment {
    /// Used when the model fails or its output cannot be read.
    pub fn fallback(item: &str) -> Self {
        ItemAssessment {
            status: AssessmentStatus::Warning,
            item: item.to_string(),
            details: ASSESSMENT_FALLBACK_DETAILS.to_string(),
            metadata: AssessmentMetadata {
                regulation_type: Some("unknown".to_string()),
                confidence: Some(json!(50)),
                ..Default::default()
            },
        }
    }

    /// Parse model output, trying the whole text first and then the
    /// outermost braces.
    pub fn parse(text: &str, item: &str) -> Option<Self> {
        let mut assessment = serde_json::from_str::<ItemAssessment>(text.trim())
            .ok()
            .or_else(|| extract_json(text).and_then(|json| serde_json::from_str(json).ok()))?;

        if assessment.item.trim().is_empty() {
            assessment.item = item.to_string();
        }
        Some(assessment)
    }

    /// Convert a NON-COMPLIANT verdict into a RESTRICTED item record.
    ///
    /// Region names go into the description so destination-based lookups
    /// can find the entry.
    pub fn to_restricted_item(&self) -> Option<RestrictedItem> {
        if self.status != AssessmentStatus::NonCompliant || self.item.trim().is_empty() {
            return None;
        }

        let mut description = self.details.trim().to_string();
        if !self.metadata.region_restrictions.is_empty() {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(&format!(
                "Regions: {}.",
                self.metadata.region_restrictions.join(", ")
            ));
        }

        Some(RestrictedItem {
            id: Uuid::new_v4(),
            item_name: self.item.trim().to_string(),
            severity: Severity::Restricted,
            category: self
                .metadata
                .regulation_type
                .clone()
                .unwrap_or_else(|| "Trade Restriction".to_string()),
            description,
            requirements: self
                .metadata
                .tariff_rate
                .as_ref()
                .map(|rate| format!("Tariff rate: {}", rate)),
            source_link: None,
            effective_date: self.metadata.effective_date.clone(),
        })
    }
}

/// First-pass screening from a local model, fed into the full assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCheck {
    pub potential_issue: bool,

    #[serde(default)]
    pub reason: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_restrictions: Vec<String>,
}

impl QuickCheck {
    /// Used when the local model fails; errs towards flagging.
    pub fn fallback() -> Self {
        QuickCheck {
            potential_issue: true,
            reason: "Error checking compliance, assuming potential issue".to_string(),
            possible_restrictions: Vec::new(),
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text.trim())
            .ok()
            .or_else(|| extract_json(text).and_then(|json| serde_json::from_str(json).ok()))
    }

    /// Compact JSON form for embedding in the assessment prompt.
    pub fn to_prompt_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.reason.clone())
    }
}

pub fn quick_check_prompt(item: &str) -> String {
    format!(
        r#"You are a trade compliance officer examining import/export regulations.
Assess if this product might be subject to tariffs, sanctions, or restrictions in major jurisdictions.
Return JSON: {{"potentialIssue": boolean, "reason": "brief reason if issue exists", "possibleRestrictions": ["tariff", "sanction", "ban"]}}

Check trade restrictions for product: {item}"#
    )
}

pub fn assessment_prompt(
    item: &str,
    quick_check: Option<&QuickCheck>,
    context: Option<&str>,
) -> String {
    let quick_check = quick_check
        .map(QuickCheck::to_prompt_text)
        .unwrap_or_else(|| "Not available.".to_string());
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("No additional context provided.");

    format!(
        r#"You are a trade compliance specialist verifying news about tariffs, sanctions, or trade barriers.

Analyze this product for import/export compliance: "{item}"

Quick check results: {quick_check}

Context: {context}

Based on the above information, determine if this product has CONFIRMED import/export restrictions.
Be conservative - only confirm restrictions if they are definitely real and in effect or announced.

Return ONLY valid JSON with this format:
{{
  "status": "COMPLIANT" or "NON-COMPLIANT" or "WARNING",
  "item": "{item}",
  "details": "clear explanation of compliance status with specific trade restrictions",
  "metadata": {{
    "regionRestrictions": ["country1", "country2"],
    "regulationType": "tariff/ban/quota/etc.",
    "tariffRate": "percentage or flat rate if applicable",
    "effectiveDate": "when restriction takes effect",
    "confidence": "percentage between 0-100 representing confidence in this assessment"
  }}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let text = r#"{"status":"NON-COMPLIANT","item":"Steel","details":"25% tariff","metadata":{"regionRestrictions":["United States"],"regulationType":"tariff","tariffRate":"25%","confidence":"90"}}"#;

        let assessment = ItemAssessment::parse(text, "Steel").unwrap();

        assert_eq!(assessment.status, AssessmentStatus::NonCompliant);
        assert_eq!(assessment.metadata.region_restrictions, vec!["United States"]);
        assert_eq!(assessment.metadata.confidence, Some(json!("90")));
    }

    #[test]
    fn test_parse_wrapped_json() {
        let text = "```json\n{\"status\":\"COMPLIANT\",\"item\":\"\",\"details\":\"none\"}\n```";

        let assessment = ItemAssessment::parse(text, "Books").unwrap();

        assert_eq!(assessment.status, AssessmentStatus::Compliant);
        assert_eq!(assessment.item, "Books");
    }

    #[test]
    fn test_parse_failure() {
        assert!(ItemAssessment::parse("I am not sure.", "Books").is_none());
        assert!(ItemAssessment::parse("{\"status\":\"MAYBE\",\"item\":\"x\"}", "x").is_none());
    }

    #[test]
    fn test_quick_check_parse() {
        let check = QuickCheck::parse(
            "Sure: {\"potentialIssue\": true, \"reason\": \"Section 232\", \"possibleRestrictions\": [\"tariff\"]}",
        )
        .unwrap();
        assert!(check.potential_issue);
        assert_eq!(check.possible_restrictions, vec!["tariff"]);

        assert!(QuickCheck::parse("no idea").is_none());
        assert!(QuickCheck::fallback().potential_issue);
    }

    #[test]
    fn test_assessment_prompt_includes_quick_check() {
        let check = QuickCheck {
            potential_issue: false,
            reason: "Unrestricted".into(),
            possible_restrictions: Vec::new(),
        };

        let prompt = assessment_prompt("Books", Some(&check), None);
        assert!(prompt.contains(r#"Quick check results: {"potentialIssue":false,"reason":"Unrestricted"}"#));
        assert!(prompt.contains("Context: No additional context provided."));

        let prompt = assessment_prompt("Books", None, Some("EU only"));
        assert!(prompt.contains("Quick check results: Not available."));
        assert!(prompt.contains("Context: EU only"));
    }

    #[test]
    fn test_fallback_is_warning() {
        let fallback = ItemAssessment::fallback("Drones");
        assert_eq!(fallback.status, AssessmentStatus::Warning);
        assert_eq!(fallback.details, ASSESSMENT_FALLBACK_DETAILS);
        assert_eq!(
            serde_json::to_value(&fallback).unwrap()["status"],
            json!("WARNING")
        );
    }

    #[test]
    fn test_non_compliant_becomes_restricted_item() {
        let assessment = ItemAssessment {
            status: AssessmentStatus::NonCompliant,
            item: "Steel".into(),
            details: "Section 232 tariff.".into(),
            metadata: AssessmentMetadata {
                region_restrictions: vec!["United States".into()],
                regulation_type: Some("tariff".into()),
                tariff_rate: Some("25%".into()),
                effective_date: Some("2025-03-12".into()),
                confidence: None,
            },
        };

        let item = assessment.to_restricted_item().unwrap();

        assert_eq!(item.item_name, "Steel");
        assert_eq!(item.severity, Severity::Restricted);
        assert_eq!(item.category, "tariff");
        assert_eq!(item.description, "Section 232 tariff. Regions: United States.");
        assert_eq!(item.requirements.as_deref(), Some("Tariff rate: 25%"));
        assert!(ItemAssessment::fallback("Steel").to_restricted_item().is_none());
    }
}
