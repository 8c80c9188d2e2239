use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::domain::{ComplianceRule, RestrictedCountry, RestrictedItem, RuleBook, RuleDraft};

use super::traits::{DocumentRecord, ResearchRecord, RuleStore};

/// Read-only store backed by a hot-reloaded YAML rulebook.
///
/// Mutations fail. Audit and cache writes are logged and dropped.
pub struct FileStore {
    rulebook_rx: watch::Receiver<Arc<RuleBook>>,
}

impl FileStore {
    pub fn new(rulebook_rx: watch::Receiver<Arc<RuleBook>>) -> Self {
        FileStore { rulebook_rx }
    }

    fn current(&self) -> Arc<RuleBook> {
        self.rulebook_rx.borrow().clone()
    }
}

fn read_only<T>() -> anyhow::Result<T> {
    anyhow::bail!("rulebook store is read-only")
}

#[async_trait]
impl RuleStore for FileStore {
    fn version(&self) -> String {
        self.current().version.clone()
    }

    async fn active_rules(&self) -> anyhow::Result<Vec<ComplianceRule>> {
        Ok(self.current().active_rules().cloned().collect())
    }

    async fn restricted_countries(&self) -> anyhow::Result<Vec<RestrictedCountry>> {
        Ok(self.current().restricted_countries.clone())
    }

    async fn restricted_items(&self) -> anyhow::Result<Vec<RestrictedItem>> {
        Ok(self.current().restricted_items.clone())
    }

    /// Single borrow so all three collections come from the same version.
    async fn snapshot(&self) -> anyhow::Result<RuleBook> {
        let book = self.current();
        Ok(RuleBook {
            version: book.version.clone(),
            rules: book.active_rules().cloned().collect(),
            restricted_countries: book.restricted_countries.clone(),
            restricted_items: book.restricted_items.clone(),
        })
    }

    async fn list_rules(&self) -> anyhow::Result<Vec<ComplianceRule>> {
        Ok(self.current().rules.clone())
    }

    async fn create_rule(&self, _draft: RuleDraft) -> anyhow::Result<ComplianceRule> {
        read_only()
    }

    async fn update_rule(&self, _id: Uuid, _draft: RuleDraft) -> anyhow::Result<Option<ComplianceRule>> {
        read_only()
    }

    async fn delete_rule(&self, _id: Uuid) -> anyhow::Result<bool> {
        read_only()
    }

    async fn create_restricted_item(&self, _item: RestrictedItem) -> anyhow::Result<RestrictedItem> {
        read_only()
    }

    async fn create_restricted_country(
        &self,
        _country: RestrictedCountry,
    ) -> anyhow::Result<RestrictedCountry> {
        read_only()
    }

    async fn record_document(&self, record: &DocumentRecord) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        info!(
            id = %id,
            document_type = %record.document_type,
            from = %record.from_country,
            to = %record.to_country,
            restrictions = record.restrictions_applied.len(),
            "Document generated (not persisted)"
        );
        Ok(id)
    }

    async fn cache_research(&self, _record: &ResearchRecord) -> anyhow::Result<()> {
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
