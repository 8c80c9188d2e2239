use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::{ComplianceRule, RestrictedCountry, RestrictedItem, RuleBook, RuleDraft};

/// Audit record for a generated trade document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub document_type: String,
    pub products: Vec<String>,
    pub from_country: String,
    pub to_country: String,
    pub restrictions_applied: Vec<Uuid>,
    pub document_content: String,
    pub generated_at: DateTime<Utc>,
}

/// Cached research findings.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchRecord {
    pub query: String,
    pub results: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Persistence for rules, restrictions and audit records.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Version label reported with snapshots.
    fn version(&self) -> String {
        "live".to_string()
    }

    // Evaluation inputs
    async fn active_rules(&self) -> anyhow::Result<Vec<ComplianceRule>>;
    async fn restricted_countries(&self) -> anyhow::Result<Vec<RestrictedCountry>>;
    async fn restricted_items(&self) -> anyhow::Result<Vec<RestrictedItem>>;

    /// Fetch the three evaluation collections concurrently.
    async fn snapshot(&self) -> anyhow::Result<RuleBook> {
        let (rules, restricted_countries, restricted_items) = tokio::try_join!(
            self.active_rules(),
            self.restricted_countries(),
            self.restricted_items()
        )?;

        Ok(RuleBook {
            version: self.version(),
            rules,
            restricted_countries,
            restricted_items,
        })
    }

    /// Restricted items whose name equals or contains one of the products,
    /// deduplicated by id.
    async fn find_restricted_items(&self, products: &[String]) -> anyhow::Result<Vec<RestrictedItem>> {
        let items = self.restricted_items().await?;
        Ok(match_products(items, products))
    }

    // Rule administration
    async fn list_rules(&self) -> anyhow::Result<Vec<ComplianceRule>>;
    async fn create_rule(&self, draft: RuleDraft) -> anyhow::Result<ComplianceRule>;
    async fn update_rule(&self, id: Uuid, draft: RuleDraft) -> anyhow::Result<Option<ComplianceRule>>;
    async fn delete_rule(&self, id: Uuid) -> anyhow::Result<bool>;

    // Restriction administration
    async fn create_restricted_item(&self, item: RestrictedItem) -> anyhow::Result<RestrictedItem>;
    async fn create_restricted_country(
        &self,
        country: RestrictedCountry,
    ) -> anyhow::Result<RestrictedCountry>;

    // Audit and cache
    async fn record_document(&self, record: &DocumentRecord) -> anyhow::Result<Uuid>;
    async fn cache_research(&self, record: &ResearchRecord) -> anyhow::Result<()>;

    /// Check the store is reachable.
    async fn ping(&self) -> anyhow::Result<()>;
}

/// Keep items whose name equals or contains a product, case-insensitively.
pub fn match_products(items: Vec<RestrictedItem>, products: &[String]) -> Vec<RestrictedItem> {
    let needles: Vec<String> = products
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let name = item.item_name.trim().to_lowercase();
            !name.is_empty() && needles.iter().any(|p| name.contains(p.as_str()))
        })
        .filter(|item| seen.insert(item.id))
        .collect()
}
