use serde::{Deserialize, Serialize};

use super::restriction::{RestrictedCountry, RestrictedItem};
use super::rule::ComplianceRule;

/// The three collections an evaluation reads, fetched together.
///
/// Also the on-disk rulebook format for the file-backed store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleBook {
    /// Rulebook version identifier
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub rules: Vec<ComplianceRule>,

    #[serde(default)]
    pub restricted_countries: Vec<RestrictedCountry>,

    #[serde(default)]
    pub restricted_items: Vec<RestrictedItem>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

impl RuleBook {
    /// Create an empty rulebook.
    pub fn empty() -> Self {
        RuleBook {
            version: default_version(),
            ..Default::default()
        }
    }

    /// Active rules only, in stored order.
    pub fn active_rules(&self) -> impl Iterator<Item = &ComplianceRule> {
        self.rules.iter().filter(|r| r.is_active)
    }
}
