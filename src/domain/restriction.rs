use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

use super::shipment::Shipment;

/// Severity of a restricted-item entry.
///
/// Deserialization is lenient, matching how stored rows are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Shipment must be rejected
    Prohibited,
    /// Shipment is flagged but evaluation continues
    Restricted,
}

impl Severity {
    /// Parse a stored severity. Anything other than `PROHIBITED` is
    /// treated as `RESTRICTED`.
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("PROHIBITED") {
            Severity::Prohibited
        } else {
            Severity::Restricted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Prohibited => "PROHIBITED",
            Severity::Restricted => "RESTRICTED",
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Severity::parse_lenient(&raw))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Jurisdiction-level restriction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictedCountry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub country_code: String,

    #[serde(default)]
    pub country_name: String,

    #[serde(default)]
    pub restriction_level: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction_reason: Option<String>,
}

impl RestrictedCountry {
    /// Check whether a shipment's destination hits this restriction.
    ///
    /// Matches the code or the name, trimmed and case-insensitive.
    pub fn matches(&self, shipment: &Shipment) -> bool {
        let destination = &shipment.destination_country;
        destination.matches(&self.country_code) || destination.matches(&self.country_name)
    }

    /// Name shown in issue descriptions.
    pub fn display_name(&self) -> &str {
        if self.country_name.trim().is_empty() {
            self.country_code.trim()
        } else {
            &self.country_name
        }
    }
}

/// Item- or keyword-level restriction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictedItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub item_name: String,

    pub severity: Severity,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
}

impl RestrictedItem {
    /// Case-insensitive substring test against a lowercased item name.
    ///
    /// Entries with a blank name never match.
    pub fn matches_lower(&self, item_name_lower: &str) -> bool {
        let keyword = self.item_name.trim().to_lowercase();
        !keyword.is_empty() && item_name_lower.contains(&keyword)
    }

    #[inline]
    pub fn is_prohibited(&self) -> bool {
        self.severity == Severity::Prohibited
    }
}
