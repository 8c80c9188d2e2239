use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::numeric::parse_decimal_opt;

/// Conditions for a `VALUE` rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueConditions {
    #[serde(
        serialize_with = "rust_decimal::serde::float_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub threshold: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documentation_required: Vec<String>,
}

/// Conditions for a `WEIGHT` rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightConditions {
    #[serde(
        serialize_with = "rust_decimal::serde::float_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_weight: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Conditions for a `COUNTRY` rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountryConditions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub restricted_countries: Vec<String>,
}

/// Conditions for an `ITEM` rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemConditions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub restricted_items: Vec<String>,
}

/// Conditions for a `DOCUMENTATION` rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentationConditions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documentation_required: Vec<String>,
}

/// Conditions for a product-specific trade rule (tariffs, bans, quotas).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductConditions {
    /// Destination countries the rule is limited to (empty = any)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to_countries: Vec<String>,

    /// Origin countries the rule is limited to (empty = any)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub from_countries: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_rate: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
}

impl ProductConditions {
    /// Read product filters from a raw payload of any rule type.
    pub fn from_raw(raw: &Value) -> Self {
        ProductConditions {
            to_countries: string_list(raw.get("to_countries")),
            from_countries: string_list(raw.get("from_countries")),
            tariff_rate: text(raw.get("tariff_rate")),
            effective_date: text(raw.get("effective_date")),
        }
    }
}

/// Typed rule conditions, keyed by rule type.
///
/// Any rule type outside the five fixed kinds is a product rule whose
/// type string (e.g. `TARIFF`, `SANCTION`) is kept verbatim. Product
/// filters are not part of the variant; every rule type may carry them
/// (see [`ProductConditions`]).
#[derive(Debug, Clone, PartialEq)]
pub enum RuleConditions {
    Value(ValueConditions),
    Weight(WeightConditions),
    Country(CountryConditions),
    Item(ItemConditions),
    Documentation(DocumentationConditions),
    Product { rule_type: String },
}

impl RuleConditions {
    /// Build typed conditions from a stored rule type and its raw payload.
    ///
    /// Missing or malformed fields become `None`/empty rather than errors.
    pub fn from_raw(rule_type: &str, raw: &Value) -> Self {
        match rule_type.trim().to_uppercase().as_str() {
            "VALUE" => RuleConditions::Value(ValueConditions {
                threshold: parse_decimal_opt(raw.get("threshold")),
                currency: text(raw.get("currency")),
                documentation_required: string_list(raw.get("documentation_required")),
            }),
            "WEIGHT" => RuleConditions::Weight(WeightConditions {
                max_weight: parse_decimal_opt(raw.get("max_weight")),
                unit: text(raw.get("unit")),
            }),
            "COUNTRY" => RuleConditions::Country(CountryConditions {
                restricted_countries: string_list(raw.get("restricted_countries")),
            }),
            "ITEM" => RuleConditions::Item(ItemConditions {
                restricted_items: string_list(raw.get("restricted_items")),
            }),
            "DOCUMENTATION" => RuleConditions::Documentation(DocumentationConditions {
                documentation_required: string_list(raw.get("documentation_required")),
            }),
            _ => RuleConditions::Product {
                rule_type: rule_type.trim().to_string(),
            },
        }
    }

    /// The rule type string this variant is stored under.
    pub fn rule_type(&self) -> &str {
        match self {
            RuleConditions::Value(_) => "VALUE",
            RuleConditions::Weight(_) => "WEIGHT",
            RuleConditions::Country(_) => "COUNTRY",
            RuleConditions::Item(_) => "ITEM",
            RuleConditions::Documentation(_) => "DOCUMENTATION",
            RuleConditions::Product { rule_type } => rule_type,
        }
    }

    /// Raw JSON payload for storage.
    pub fn to_raw(&self) -> Value {
        let raw = match self {
            RuleConditions::Value(c) => serde_json::to_value(c),
            RuleConditions::Weight(c) => serde_json::to_value(c),
            RuleConditions::Country(c) => serde_json::to_value(c),
            RuleConditions::Item(c) => serde_json::to_value(c),
            RuleConditions::Documentation(c) => serde_json::to_value(c),
            RuleConditions::Product { .. } => Ok(Value::Object(Default::default())),
        };
        raw.unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// Trimmed non-empty string field.
fn text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// List of non-blank strings; non-string entries are dropped.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn default_active() -> bool {
    true
}

/// Untyped rule as written by administrators and stored in the rule store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,

    pub rule_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default)]
    pub rule_conditions: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Wire/storage shape of a rule: a draft plus its identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(flatten)]
    pub draft: RuleDraft,
}

/// A configured compliance policy check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RuleRecord", from = "RuleRecord")]
pub struct ComplianceRule {
    pub id: Uuid,
    pub rule_name: Option<String>,
    pub product_name: Option<String>,
    pub conditions: RuleConditions,
    /// Destination/origin filters and tariff details, for any rule type
    pub product_filters: ProductConditions,
    pub description: Option<String>,
    pub source_link: Option<String>,
    pub last_verified: Option<String>,
    pub is_active: bool,
}

impl ComplianceRule {
    /// Build a typed rule from a draft.
    pub fn from_draft(id: Uuid, draft: RuleDraft) -> Self {
        let conditions = RuleConditions::from_raw(&draft.rule_type, &draft.rule_conditions);
        let product_filters = ProductConditions::from_raw(&draft.rule_conditions);

        ComplianceRule {
            id,
            rule_name: draft.rule_name,
            product_name: draft.product_name,
            conditions,
            product_filters,
            description: draft.description,
            source_link: draft.source_link,
            last_verified: draft.last_verified,
            is_active: draft.is_active,
        }
    }

    /// Convert back into the untyped storage shape.
    pub fn to_draft(&self) -> RuleDraft {
        RuleDraft {
            rule_name: self.rule_name.clone(),
            rule_type: self.rule_type().to_string(),
            product_name: self.product_name.clone(),
            rule_conditions: self.raw_conditions(),
            description: self.description.clone(),
            source_link: self.source_link.clone(),
            last_verified: self.last_verified.clone(),
            is_active: self.is_active,
        }
    }

    pub fn rule_type(&self) -> &str {
        self.conditions.rule_type()
    }

    /// Typed conditions and product filters merged into one payload.
    fn raw_conditions(&self) -> Value {
        let mut raw = self.conditions.to_raw();
        if let (Value::Object(target), Ok(Value::Object(filters))) =
            (&mut raw, serde_json::to_value(&self.product_filters))
        {
            for (key, value) in filters {
                target.entry(key).or_insert(value);
            }
        }
        raw
    }

    /// Product name, if set and non-blank.
    pub fn product_name(&self) -> Option<&str> {
        self.product_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Display label used in prompts and logs.
    pub fn label(&self) -> String {
        match (&self.rule_name, self.product_name()) {
            (Some(name), _) => name.clone(),
            (None, Some(product)) => format!("{} on {}", self.rule_type(), product),
            (None, None) => self.rule_type().to_string(),
        }
    }
}

impl From<RuleRecord> for ComplianceRule {
    fn from(record: RuleRecord) -> Self {
        ComplianceRule::from_draft(record.id, record.draft)
    }
}

impl From<ComplianceRule> for RuleRecord {
    fn from(rule: ComplianceRule) -> Self {
        RuleRecord {
            id: rule.id,
            draft: rule.to_draft(),
        }
    }
}
