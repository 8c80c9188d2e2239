use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::{ComplianceRule, RestrictedCountry, RestrictedItem, RuleBook, RuleDraft};

use super::traits::{DocumentRecord, ResearchRecord, RuleStore};

/// In-memory store used by tests and as the default when no database or
/// rulebook is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rules: Mutex<Vec<ComplianceRule>>,
    restricted_countries: Mutex<Vec<RestrictedCountry>>,
    restricted_items: Mutex<Vec<RestrictedItem>>,
    documents: Mutex<Vec<DocumentRecord>>,
    research: Mutex<Vec<ResearchRecord>>,
    failing: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a rulebook.
    pub fn from_rulebook(book: RuleBook) -> Self {
        let store = Self::default();
        *store.rules.lock() = book.rules;
        *store.restricted_countries.lock() = book.restricted_countries;
        *store.restricted_items.lock() = book.restricted_items;
        store
    }

    /// Make every read fail (for testing error paths).
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// Get recorded documents (for assertions).
    pub fn recorded_documents(&self) -> Vec<DocumentRecord> {
        self.documents.lock().clone()
    }

    /// Get cached research records (for assertions).
    pub fn cached_research(&self) -> Vec<ResearchRecord> {
        self.research.lock().clone()
    }

    fn check_available(&self) -> anyhow::Result<()> {
        if *self.failing.lock() {
            anyhow::bail!("memory store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl RuleStore for MemoryStore {
    fn version(&self) -> String {
        "memory".to_string()
    }

    async fn active_rules(&self) -> anyhow::Result<Vec<ComplianceRule>> {
        self.check_available()?;
        Ok(self
            .rules
            .lock()
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn restricted_countries(&self) -> anyhow::Result<Vec<RestrictedCountry>> {
        self.check_available()?;
        Ok(self.restricted_countries.lock().clone())
    }

    async fn restricted_items(&self) -> anyhow::Result<Vec<RestrictedItem>> {
        self.check_available()?;
        Ok(self.restricted_items.lock().clone())
    }

    async fn list_rules(&self) -> anyhow::Result<Vec<ComplianceRule>> {
        self.check_available()?;
        Ok(self.rules.lock().clone())
    }

    async fn create_rule(&self, draft: RuleDraft) -> anyhow::Result<ComplianceRule> {
        self.check_available()?;
        let rule = ComplianceRule::from_draft(Uuid::new_v4(), draft);
        self.rules.lock().push(rule.clone());
        Ok(rule)
    }

    async fn update_rule(&self, id: Uuid, draft: RuleDraft) -> anyhow::Result<Option<ComplianceRule>> {
        self.check_available()?;
        let mut rules = self.rules.lock();

        let Some(slot) = rules.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        *slot = ComplianceRule::from_draft(id, draft);
        Ok(Some(slot.clone()))
    }

    async fn delete_rule(&self, id: Uuid) -> anyhow::Result<bool> {
        self.check_available()?;
        let mut rules = self.rules.lock();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        Ok(rules.len() != before)
    }

    async fn create_restricted_item(&self, item: RestrictedItem) -> anyhow::Result<RestrictedItem> {
        self.check_available()?;
        self.restricted_items.lock().push(item.clone());
        Ok(item)
    }

    async fn create_restricted_country(
        &self,
        country: RestrictedCountry,
    ) -> anyhow::Result<RestrictedCountry> {
        self.check_available()?;
        self.restricted_countries.lock().push(country.clone());
        Ok(country)
    }

    async fn record_document(&self, record: &DocumentRecord) -> anyhow::Result<Uuid> {
        self.check_available()?;
        self.documents.lock().push(record.clone());
        Ok(Uuid::new_v4())
    }

    async fn cache_research(&self, record: &ResearchRecord) -> anyhow::Result<()> {
        self.check_available()?;
        self.research.lock().push(record.clone());
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.check_available()
    }
}
