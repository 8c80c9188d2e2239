use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Country code or name as supplied by the caller.
///
/// The raw text is preserved for echoing back; comparisons are
/// case-insensitive and ignore surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl Into<String>) -> Self {
        CountryCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the normalized (trimmed, uppercase) form.
    pub fn normalized(&self) -> String {
        normalize_country(&self.0)
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Check whether this country matches another code or name.
    ///
    /// Blank values never match.
    pub fn matches(&self, other: &str) -> bool {
        let other = other.trim();
        !other.is_empty()
            && !self.is_blank()
            && self.0.trim().to_lowercase() == other.to_lowercase()
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a country code or name for comparison.
pub fn normalize_country(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Why a shipment cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShipmentError {
    #[error("item name is required")]
    MissingItemName,

    #[error("destination country is required")]
    MissingDestination,
}

/// A single cross-border parcel under evaluation.
///
/// Numeric fields are `None` when the caller omitted them or supplied
/// something that does not parse as a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shipment {
    pub item_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    #[serde(serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub declared_value: Option<Decimal>,

    #[serde(serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub weight: Option<Decimal>,

    pub destination_country: CountryCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<CountryCode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodity_code: Option<String>,
}

impl Shipment {
    /// Create a shipment with only the required fields.
    pub fn new(item_name: impl Into<String>, destination_country: impl Into<String>) -> Self {
        Shipment {
            item_name: item_name.into(),
            item_id: None,
            declared_value: None,
            weight: None,
            destination_country: CountryCode::new(destination_country),
            origin_country: None,
            commodity_code: None,
        }
    }

    pub fn with_value(mut self, value: Decimal) -> Self {
        self.declared_value = Some(value);
        self
    }

    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin_country = Some(CountryCode::new(origin));
        self
    }

    /// Lowercased item name used for keyword matching.
    #[inline]
    pub fn item_name_lower(&self) -> String {
        self.item_name.trim().to_lowercase()
    }

    /// Check the required fields are present.
    pub fn validate(&self) -> Result<(), ShipmentError> {
        if self.item_name.trim().is_empty() {
            return Err(ShipmentError::MissingItemName);
        }
        if self.destination_country.is_blank() {
            return Err(ShipmentError::MissingDestination);
        }
        Ok(())
    }
}
