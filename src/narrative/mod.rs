//! Model-generated narratives: compliance guidance, trade documents,
//! research findings, help chat and item assessments.
//!
//! Every model call goes through the service's [`RetryPolicy`].

pub mod assess;
pub mod document;
pub mod error;
pub mod gemini;
pub mod model;
pub mod ollama;
pub mod predict;
pub mod research;
pub mod retry;

pub use assess::{AssessmentStatus, ItemAssessment, QuickCheck};
pub use document::{DocumentRequest, DocumentType, GeneratedDocument};
pub use error::NarrativeError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use model::NarrativeModel;
pub use ollama::{OllamaClient, OllamaConfig};
pub use predict::Prediction;
pub use research::{ResearchFilters, ResearchFinding};
pub use retry::RetryPolicy;

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{ComplianceRule, Shipment};
use crate::observability::MetricsRegistry;
use crate::storage::{DocumentRecord, ResearchRecord, RuleStore};

/// Narrative operations over a shared model.
pub struct NarrativeService {
    model: Arc<dyn NarrativeModel>,
    retry: RetryPolicy,
    metrics: Option<Arc<MetricsRegistry>>,
    /// Local model for first-pass item screening
    quick_check: Option<Arc<dyn NarrativeModel>>,
}

impl NarrativeService {
    pub fn new(model: Arc<dyn NarrativeModel>, retry: RetryPolicy) -> Self {
        NarrativeService {
            model,
            retry,
            metrics: None,
            quick_check: None,
        }
    }

    pub fn with_quick_check(mut self, model: Arc<dyn NarrativeModel>) -> Self {
        self.quick_check = Some(model);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Call the model and parse its output; a parse failure counts as a
    /// failed attempt.
    async fn complete_with<T, P>(
        &self,
        operation: &str,
        prompt: &str,
        parse: P,
    ) -> Result<T, NarrativeError>
    where
        P: Fn(&str) -> Result<T, NarrativeError>,
    {
        let model = &self.model;
        let metrics = self.metrics.as_deref();
        let parse = &parse;

        self.retry
            .run(operation, move |_| async move {
                let result = model.generate(prompt).await.and_then(|text| parse(&text));
                if let Some(metrics) = metrics {
                    metrics.record_model_attempt(result.is_ok());
                }
                result
            })
            .await
    }

    async fn complete(&self, operation: &str, prompt: &str) -> Result<String, NarrativeError> {
        self.complete_with(operation, prompt, |text| Ok(text.to_string()))
            .await
    }

    /// Compliance guidance for a shipment given the active rules.
    pub async fn predict(
        &self,
        shipment: &Shipment,
        rules: &[ComplianceRule],
    ) -> Result<Prediction, NarrativeError> {
        let prompt = predict::predict_prompt(shipment, rules);
        let text = self.complete("predict", &prompt).await?;
        Ok(Prediction::from_text(&text))
    }

    pub async fn help_chat(&self, message: &str) -> Result<String, NarrativeError> {
        let prompt = predict::help_chat_prompt(message);
        self.complete("help_chat", &prompt).await
    }

    /// Generate a trade document and record it for audit.
    ///
    /// The audit write is best-effort.
    pub async fn generate_document(
        &self,
        store: &dyn RuleStore,
        request: DocumentRequest,
    ) -> Result<GeneratedDocument, NarrativeError> {
        let candidates = store
            .find_restricted_items(&request.products)
            .await
            .map_err(NarrativeError::Store)?;
        let restrictions = document::applicable_restrictions(candidates, &request.to_country);

        let prompt = document::document_prompt(&request, &restrictions);
        let raw = self.complete("generate_document", &prompt).await?;
        let content = document::strip_code_fences(&raw);

        let record = DocumentRecord {
            document_type: request.document_type.as_str().to_string(),
            products: request.products.clone(),
            from_country: request.from_country.clone(),
            to_country: request.to_country.clone(),
            restrictions_applied: restrictions.iter().map(|r| r.id).collect(),
            document_content: content.clone(),
            generated_at: Utc::now(),
        };
        match store.record_document(&record).await {
            Ok(id) => info!(id = %id, document_type = %request.document_type, "Document recorded"),
            Err(e) => warn!(error = %e, "Failed to record generated document"),
        }

        Ok(GeneratedDocument {
            document: content,
            restrictions: restrictions.iter().map(Into::into).collect(),
            document_type: request.document_type,
            disclaimer: document::DOCUMENT_DISCLAIMER,
        })
    }

    /// Research a query; results are cached best-effort.
    pub async fn research(
        &self,
        store: &dyn RuleStore,
        query: &str,
        filters: &ResearchFilters,
    ) -> Result<Vec<ResearchFinding>, NarrativeError> {
        info!(query, "Performing research");

        let prompt = research::research_prompt(query, filters);
        let mut findings = self
            .complete_with("research", &prompt, research::parse_findings)
            .await?;
        findings.truncate(filters.max_results());

        let record = ResearchRecord {
            query: query.to_string(),
            results: serde_json::to_value(&findings).unwrap_or_default(),
            timestamp: Utc::now(),
        };
        if let Err(e) = store.cache_research(&record).await {
            warn!(error = %e, "Failed to cache research results");
        }

        Ok(findings)
    }

    /// Summarize findings. Never fails; failures produce a fixed message.
    pub async fn summarize_research(&self, query: &str, findings: &[ResearchFinding]) -> String {
        if findings.is_empty() {
            return research::NO_RESULTS_SUMMARY.to_string();
        }

        let prompt = research::summary_prompt(query, findings);
        match self.complete("summarize_research", &prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Summary generation failed");
                research::SUMMARY_FAILED.to_string()
            }
        }
    }

    /// First-pass screening on the local model, if one is configured.
    ///
    /// Single attempt; failures or unreadable output give the flagging
    /// fallback.
    pub async fn quick_check(&self, item: &str) -> Option<QuickCheck> {
        let model = self.quick_check.as_ref()?;
        let prompt = assess::quick_check_prompt(item);

        let check = match model.generate(&prompt).await {
            Ok(text) => QuickCheck::parse(&text).unwrap_or_else(|| {
                warn!(item, model = model.name(), "Could not parse quick check");
                QuickCheck::fallback()
            }),
            Err(e) => {
                warn!(item, model = model.name(), error = %e, "Quick check failed");
                QuickCheck::fallback()
            }
        };
        Some(check)
    }

    /// Assess an item. Model or parse failures degrade to a WARNING.
    pub async fn assess_item(&self, item: &str, context: Option<&str>) -> ItemAssessment {
        let quick_check = self.quick_check(item).await;
        let prompt = assess::assessment_prompt(item, quick_check.as_ref(), context);

        match self.complete("assess_item", &prompt).await {
            Ok(text) => ItemAssessment::parse(&text, item).unwrap_or_else(|| {
                warn!(item, "Could not parse item assessment");
                ItemAssessment::fallback(item)
            }),
            Err(e) => {
                warn!(item, error = %e, "Item assessment failed");
                ItemAssessment::fallback(item)
            }
        }
    }
}

impl std::fmt::Debug for NarrativeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeService")
            .field("model", &self.model.name())
            .field("retry", &self.retry)
            .field("quick_check", &self.quick_check.as_ref().map(|m| m.name()))
            .finish()
    }
}
