use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::numeric::parse_decimal_opt;
use crate::domain::{CountryCode, Shipment};
use crate::narrative::{DocumentRequest, DocumentType, ResearchFilters};

use super::error::ApiError;

/// Build a shipment from loosely-typed JSON.
///
/// Never fails: missing text fields become empty and malformed numbers
/// become `None`, leaving validation to the caller.
pub fn shipment_from_value(value: &Value) -> Shipment {
    let text = |key: &str| -> Option<String> {
        match value.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    };

    Shipment {
        item_name: text("item_name").unwrap_or_default(),
        item_id: text("item_id"),
        declared_value: parse_decimal_opt(value.get("declared_value")),
        weight: parse_decimal_opt(value.get("weight")),
        destination_country: CountryCode::new(text("destination_country").unwrap_or_default()),
        origin_country: text("origin_country").map(CountryCode::new),
        commodity_code: text("commodity_code"),
    }
}

/// Parse and validate a single shipment.
pub fn require_shipment(value: Option<&Value>) -> Result<Shipment, ApiError> {
    let value = value
        .filter(|v| v.is_object())
        .ok_or_else(|| ApiError::BadRequest("Shipment data is required".into()))?;

    let shipment = shipment_from_value(value);
    shipment
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Invalid shipment data: {}", e)))?;

    Ok(shipment)
}

/// Body of `POST /v1/compliance/check` and `/v1/compliance/predict`.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub shipment: Option<Value>,
}

/// Body of `POST /v1/compliance/check-bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkCheckRequest {
    #[serde(default)]
    pub shipments: Option<Value>,
}

impl BulkCheckRequest {
    /// Convert every element; invalid elements are kept and degrade during
    /// evaluation.
    pub fn into_shipments(self) -> Result<Vec<Shipment>, ApiError> {
        match self.shipments {
            Some(Value::Array(items)) if !items.is_empty() => {
                Ok(items.iter().map(shipment_from_value).collect())
            }
            _ => Err(ApiError::BadRequest(
                "Shipments must be a non-empty array".into(),
            )),
        }
    }
}

/// Body of `POST /v1/documentation/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentRequest {
    #[serde(default)]
    pub products: Option<Value>,
    #[serde(default)]
    pub from_country: Option<String>,
    #[serde(default)]
    pub to_country: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub shipment_details: Option<Map<String, Value>>,
    #[serde(default)]
    pub company_details: Option<Map<String, Value>>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl GenerateDocumentRequest {
    pub fn validate(self) -> Result<DocumentRequest, ApiError> {
        let missing = || ApiError::BadRequest("Missing required fields".into());

        let products: Vec<String> = match self.products {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
            _ => return Err(missing()),
        };
        if products.is_empty() {
            return Err(missing());
        }

        let from_country = non_blank(self.from_country).ok_or_else(missing)?;
        let to_country = non_blank(self.to_country).ok_or_else(missing)?;
        let document_type = non_blank(self.document_type).ok_or_else(missing)?;

        let document_type = DocumentType::parse(&document_type)
            .ok_or_else(|| ApiError::BadRequest("Unsupported document type".into()))?;

        Ok(DocumentRequest {
            products,
            from_country,
            to_country,
            document_type,
            shipment_details: self.shipment_details.unwrap_or_default(),
            company_details: self.company_details.unwrap_or_default(),
        })
    }
}

/// Body of `POST /v1/research`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub filters: Option<ResearchFilters>,
    #[serde(default)]
    pub include_summary: bool,
}

/// Query string of `GET /v1/research`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub max_results: Option<String>,
    /// Comma-separated
    #[serde(default)]
    pub categories: Option<String>,
}

impl ResearchParams {
    pub fn into_parts(self) -> Result<(String, ResearchFilters), ApiError> {
        let query = non_blank(self.query)
            .ok_or_else(|| ApiError::BadRequest("Query parameter is required".into()))?;

        let filters = ResearchFilters {
            max_results: self.max_results.and_then(|m| m.trim().parse().ok()),
            categories: self
                .categories
                .map(|c| {
                    c.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            ..Default::default()
        };

        Ok((query, filters))
    }
}

/// Body of `POST /v1/help-chat`.
#[derive(Debug, Deserialize)]
pub struct HelpChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /v1/restricted-items/assess`.
#[derive(Debug, Deserialize)]
pub struct AssessItemRequest {
    #[serde(default, alias = "itemName")]
    pub item_name: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    /// Store a NON-COMPLIANT verdict as a restricted item
    #[serde(default)]
    pub persist: bool,
}

pub(crate) fn require_text(value: Option<String>, message: &str) -> Result<String, ApiError> {
    non_blank(value).ok_or_else(|| ApiError::BadRequest(message.to_string()))
}
