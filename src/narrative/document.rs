use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use crate::domain::{RestrictedItem, Severity};

pub const DOCUMENT_DISCLAIMER: &str =
    "This document is AI-generated. Review by a compliance officer is recommended.";

/// Trade document templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    CertificateOfOrigin,
    CommercialInvoice,
    ExportDeclaration,
}

impl DocumentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "certificate-of-origin" => Some(DocumentType::CertificateOfOrigin),
            "commercial-invoice" => Some(DocumentType::CommercialInvoice),
            "export-declaration" => Some(DocumentType::ExportDeclaration),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::CertificateOfOrigin => "certificate-of-origin",
            DocumentType::CommercialInvoice => "commercial-invoice",
            DocumentType::ExportDeclaration => "export-declaration",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentType::CertificateOfOrigin => "Certificate of Origin",
            DocumentType::CommercialInvoice => "Commercial Invoice",
            DocumentType::ExportDeclaration => "Export Declaration",
        }
    }

    pub fn sections(&self) -> &'static [&'static str] {
        match self {
            DocumentType::CertificateOfOrigin => &[
                "exporter_details",
                "importer_details",
                "product_details",
                "origin_declaration",
                "applicable_restrictions",
                "certification",
            ],
            DocumentType::CommercialInvoice => &[
                "seller_details",
                "buyer_details",
                "invoice_details",
                "product_listing",
                "trade_restriction_declarations",
                "terms_and_conditions",
            ],
            DocumentType::ExportDeclaration => &[
                "exporter_information",
                "export_control_classification",
                "shipment_details",
                "product_description",
                "compliance_statements",
                "authorization",
            ],
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated document generation request.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    pub products: Vec<String>,
    pub from_country: String,
    pub to_country: String,
    pub document_type: DocumentType,
    pub shipment_details: Map<String, Value>,
    pub company_details: Map<String, Value>,
}

/// Restriction summary returned alongside a generated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedRestriction {
    pub id: Uuid,
    pub item_name: String,
    pub severity: Severity,
    pub requirements: Option<String>,
}

impl From<&RestrictedItem> for AppliedRestriction {
    fn from(item: &RestrictedItem) -> Self {
        AppliedRestriction {
            id: item.id,
            item_name: item.item_name.clone(),
            severity: item.severity,
            requirements: item.requirements.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub document: String,
    pub restrictions: Vec<AppliedRestriction>,
    pub document_type: DocumentType,
    pub disclaimer: &'static str,
}

/// Keep restrictions whose description mentions the destination.
pub fn applicable_restrictions(items: Vec<RestrictedItem>, to_country: &str) -> Vec<RestrictedItem> {
    let destination = to_country.trim().to_lowercase();
    if destination.is_empty() {
        return Vec::new();
    }

    items
        .into_iter()
        .filter(|item| item.description.to_lowercase().contains(&destination))
        .collect()
}

/// Remove markdown code fences from model output.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```html", "").replace("```", "").trim().to_string()
}

fn detail_lines(details: &Map<String, Value>) -> String {
    details
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}: {}", key, s),
            other => format!("{}: {}", key, other),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn document_prompt(request: &DocumentRequest, restrictions: &[RestrictedItem]) -> String {
    let title = request.document_type.title();

    let products = request
        .products
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {}", i + 1, p))
        .collect::<Vec<_>>()
        .join("\n");

    let restriction_lines = if restrictions.is_empty() {
        "No specific restrictions identified.".to_string()
    } else {
        restrictions
            .iter()
            .map(|r| {
                format!(
                    "- {}: {}, {}",
                    r.item_name,
                    r.severity,
                    r.requirements.as_deref().unwrap_or("No specific requirements")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Generate a formal {title} document based on the following information:

PRODUCTS:
{products}

TRADE ROUTE:
From: {from}
To: {to}

APPLICABLE RESTRICTIONS:
{restriction_lines}

SHIPMENT DETAILS:
{shipment}

COMPANY DETAILS:
{company}

DOCUMENT SECTIONS:
{sections}

Please create a properly formatted, legally-accurate {title} that includes appropriate language for all identified trade restrictions. Document should be formatted in HTML with proper semantic elements.

Create a professional, legally-appropriate document that would satisfy customs requirements. Include appropriate legal disclaimers, certifications, and declarations based on the trade restrictions identified."#,
        from = request.from_country,
        to = request.to_country,
        shipment = detail_lines(&request.shipment_details),
        company = detail_lines(&request.company_details),
        sections = request.document_type.sections().join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(name: &str, description: &str) -> RestrictedItem {
        RestrictedItem {
            id: Uuid::new_v4(),
            item_name: name.to_string(),
            severity: Severity::Restricted,
            category: "Metals".to_string(),
            description: description.to_string(),
            requirements: Some("Import licence".to_string()),
            source_link: None,
            effective_date: None,
        }
    }

    #[test]
    fn test_document_type_parse() {
        assert_eq!(
            DocumentType::parse("commercial-invoice"),
            Some(DocumentType::CommercialInvoice)
        );
        assert_eq!(DocumentType::parse("packing-list"), None);
        assert_eq!(
            serde_json::to_value(DocumentType::CertificateOfOrigin).unwrap(),
            json!("certificate-of-origin")
        );
        assert_eq!(DocumentType::ExportDeclaration.sections().len(), 6);
    }

    #[test]
    fn test_restrictions_filtered_by_destination() {
        let items = vec![
            item("Steel", "25% tariff on imports into the United States"),
            item("Steel Wire", "Quota applies in Canada"),
        ];

        let applicable = applicable_restrictions(items, "united states");

        assert_eq!(applicable.len(), 1);
        assert_eq!(applicable[0].item_name, "Steel");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            strip_code_fences("```html\n<h1>Invoice</h1>\n```\n"),
            "<h1>Invoice</h1>"
        );
        assert_eq!(strip_code_fences("<p>plain</p>"), "<p>plain</p>");
    }

    #[test]
    fn test_prompt_contents() {
        let request = DocumentRequest {
            products: vec!["Steel coil".into(), "Copper wire".into()],
            from_country: "CN".into(),
            to_country: "US".into(),
            document_type: DocumentType::CommercialInvoice,
            shipment_details: json!({ "value": 12000, "currency": "USD" })
                .as_object()
                .cloned()
                .unwrap(),
            company_details: Map::new(),
        };

        let prompt = document_prompt(&request, &[item("Steel", "US tariff")]);

        assert!(prompt.contains("Generate a formal Commercial Invoice document"));
        assert!(prompt.contains("1. Steel coil\n2. Copper wire"));
        assert!(prompt.contains("- Steel: RESTRICTED, Import licence"));
        assert!(prompt.contains("currency: USD"));
        assert!(prompt.contains("value: 12000"));
        assert!(prompt.contains("trade_restriction_declarations"));
    }
}
