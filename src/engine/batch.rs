use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    ComplianceResult, ComplianceRule, RestrictedCountry, RestrictedItem, Shipment,
};
use crate::rules::RuleSet;

/// Default number of shipments evaluated concurrently.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Evaluates batches of shipments in fixed-size chunks.
///
/// Each shipment in a chunk runs on its own task; results are collected in
/// input order. A shipment that cannot be evaluated (invalid input, or a
/// check that panics) degrades to a REVIEW result instead of failing the
/// whole batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    chunk_size: usize,
}

impl BatchRunner {
    pub fn new(chunk_size: usize) -> Self {
        BatchRunner {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Evaluate every shipment, preserving input order.
    pub async fn run(&self, ruleset: Arc<RuleSet>, shipments: Vec<Shipment>) -> Vec<ComplianceResult> {
        let mut results = Vec::with_capacity(shipments.len());

        for (chunk_index, chunk) in shipments.chunks(self.chunk_size).enumerate() {
            debug!(chunk = chunk_index, size = chunk.len(), "Evaluating chunk");

            let handles: Vec<_> = chunk
                .iter()
                .cloned()
                .map(|shipment| {
                    let ruleset = Arc::clone(&ruleset);
                    tokio::spawn(async move { evaluate_one(&ruleset, shipment) })
                })
                .collect();

            // Awaiting in spawn order keeps results aligned with the input.
            for (handle, shipment) in handles.into_iter().zip(chunk) {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(
                            item = %shipment.item_name,
                            error = %e,
                            "Shipment evaluation failed, degrading to review"
                        );
                        ComplianceResult::degraded(
                            shipment.clone(),
                            "Evaluation failed unexpectedly",
                        )
                    }
                };
                results.push(result);
            }
        }

        results
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        BatchRunner::new(DEFAULT_CHUNK_SIZE)
    }
}

/// Evaluate a batch against the three rule collections with the default
/// chunk size.
pub async fn evaluate_batch(
    shipments: Vec<Shipment>,
    rules: &[ComplianceRule],
    restricted_countries: &[RestrictedCountry],
    restricted_items: &[RestrictedItem],
) -> Vec<ComplianceResult> {
    let ruleset = Arc::new(RuleSet::build(rules, restricted_countries, restricted_items));
    BatchRunner::default().run(ruleset, shipments).await
}

fn evaluate_one(ruleset: &RuleSet, shipment: Shipment) -> ComplianceResult {
    match shipment.validate() {
        Ok(()) => ruleset.evaluate(&shipment),
        Err(e) => ComplianceResult::degraded(shipment, format!("Invalid shipment data: {}", e)),
    }
}
