use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    ComplianceResult, ComplianceRule, RestrictedCountry, RestrictedItem, RuleBook, RuleDraft,
};
use crate::engine::{evaluate, BatchRunner};
use crate::narrative::{NarrativeService, Prediction};
use crate::observability::{MetricsRegistry, TimingGuard};
use crate::rules::RuleSet;
use crate::storage::RuleStore;

use super::error::ApiError;
use super::request::{
    require_shipment, require_text, AssessItemRequest, BulkCheckRequest, CheckRequest,
    GenerateDocumentRequest, HelpChatRequest, ResearchParams, ResearchRequest,
};
use super::response::{
    AssessItemResponse, DeleteResponse, DocumentResponse, ErrorResponse, HealthResponse,
    HelpChatResponse, ReadyResponse, ResearchResponse,
};

/// Shared application state.
pub struct AppState {
    /// Rules, restrictions and audit records
    pub store: Arc<dyn RuleStore>,

    /// Narrative generators; `None` when no model is configured
    pub narrative: Option<Arc<NarrativeService>>,

    /// Bulk evaluation runner
    pub batch: BatchRunner,

    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl AppState {
    /// Fetch the evaluation collections.
    async fn snapshot(&self) -> Result<RuleBook, ApiError> {
        self.store.snapshot().await.map_err(|e| {
            self.metrics.record_store_error();
            ApiError::Store(e)
        })
    }

    fn narrative(&self) -> Result<&NarrativeService, ApiError> {
        self.narrative.as_deref().ok_or(ApiError::NotConfigured)
    }
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = state.request_timeout;

    Router::new()
        .route("/v1/compliance/check", post(handle_check))
        .route("/v1/compliance/check-bulk", post(handle_check_bulk))
        .route("/v1/compliance/predict", post(handle_predict))
        .route("/v1/documentation/generate", post(handle_generate_document))
        .route("/v1/research", get(handle_research_get).post(handle_research_post))
        .route("/v1/help-chat", post(handle_help_chat))
        .route("/v1/rules", get(handle_list_rules).post(handle_create_rule))
        .route("/v1/rules/:id", put(handle_update_rule).delete(handle_delete_rule))
        .route(
            "/v1/restricted-items",
            get(handle_list_items).post(handle_create_item),
        )
        .route("/v1/restricted-items/assess", post(handle_assess_item))
        .route(
            "/v1/restricted-countries",
            get(handle_list_countries).post(handle_create_country),
        )
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(timeout))
}

/// Evaluate a single shipment.
async fn handle_check(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<ComplianceResult>, ApiError> {
    let Json(req) = payload?;
    let shipment = require_shipment(req.shipment.as_ref())?;

    let book = state.snapshot().await?;

    let result = {
        let _timer = TimingGuard::new(&state.metrics);
        evaluate(
            &shipment,
            &book.rules,
            &book.restricted_countries,
            &book.restricted_items,
        )
    };
    state.metrics.record_status(result.status);

    info!(
        item = %shipment.item_name,
        destination = %shipment.destination_country,
        status = %result.status,
        issues = result.issues.len(),
        rules_version = %book.version,
        "Compliance check completed"
    );

    Ok(Json(result))
}

/// Evaluate a list of shipments, preserving order.
async fn handle_check_bulk(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BulkCheckRequest>, JsonRejection>,
) -> Result<Json<Vec<ComplianceResult>>, ApiError> {
    let Json(req) = payload?;
    let shipments = req.into_shipments()?;
    state.metrics.record_bulk_request();

    let book = state.snapshot().await?;
    let ruleset = Arc::new(RuleSet::from_rulebook(&book));

    let count = shipments.len();
    let results = {
        let _timer = TimingGuard::new(&state.metrics);
        state.batch.run(ruleset, shipments).await
    };

    let mut degraded = 0;
    for result in &results {
        state.metrics.record_status(result.status);
        if result.is_degraded() {
            state.metrics.record_degraded();
            degraded += 1;
        }
    }

    info!(
        shipments = count,
        degraded,
        rules_version = %book.version,
        "Bulk compliance check completed"
    );

    Ok(Json(results))
}

async fn handle_predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let narrative = state.narrative()?;
    let Json(req) = payload?;
    let shipment = require_shipment(req.shipment.as_ref())?;

    let rules = state.store.active_rules().await.map_err(ApiError::Store)?;
    let prediction = narrative.predict(&shipment, &rules).await?;

    Ok(Json(prediction))
}

async fn handle_generate_document(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateDocumentRequest>, JsonRejection>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let narrative = state.narrative()?;
    let Json(req) = payload?;
    let request = req.validate()?;

    let generated = narrative
        .generate_document(state.store.as_ref(), request)
        .await?;

    Ok(Json(DocumentResponse {
        success: true,
        generated,
    }))
}

async fn handle_research_get(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ResearchParams>, QueryRejection>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let narrative = state.narrative()?;
    let Query(params) = params?;
    let (query, filters) = params.into_parts()?;

    let results = narrative
        .research(state.store.as_ref(), &query, &filters)
        .await?;

    Ok(Json(ResearchResponse::new(results, None)))
}

async fn handle_research_post(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let narrative = state.narrative()?;
    let Json(req) = payload?;
    let query = require_text(req.query, "Query is required in the request body")?;
    let filters = req.filters.unwrap_or_default();

    let results = narrative
        .research(state.store.as_ref(), &query, &filters)
        .await?;

    let summary = if req.include_summary {
        Some(narrative.summarize_research(&query, &results).await)
    } else {
        None
    };

    Ok(Json(ResearchResponse::new(results, summary)))
}

async fn handle_help_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HelpChatRequest>, JsonRejection>,
) -> Result<Json<HelpChatResponse>, ApiError> {
    let narrative = state.narrative()?;
    let Json(req) = payload?;
    let message = require_text(req.message, "Message is required")?;

    let response = narrative.help_chat(&message).await?;

    Ok(Json(HelpChatResponse {
        response,
        success: true,
    }))
}

async fn handle_assess_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AssessItemRequest>, JsonRejection>,
) -> Result<Json<AssessItemResponse>, ApiError> {
    let narrative = state.narrative()?;
    let Json(req) = payload?;
    let item_name = require_text(req.item_name, "Item name is required")?;

    let assessment = narrative
        .assess_item(&item_name, req.context.as_deref())
        .await;

    let restricted_item = match assessment.to_restricted_item() {
        Some(item) if req.persist => {
            let stored = state
                .store
                .create_restricted_item(item)
                .await
                .map_err(ApiError::Store)?;
            info!(id = %stored.id, item = %stored.item_name, "Stored restricted item from assessment");
            Some(stored)
        }
        _ => None,
    };

    Ok(Json(AssessItemResponse {
        assessment,
        restricted_item,
    }))
}

async fn handle_list_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ComplianceRule>>, ApiError> {
    let rules = state.store.list_rules().await.map_err(ApiError::Store)?;
    Ok(Json(rules))
}

fn validate_draft(draft: &RuleDraft) -> Result<(), ApiError> {
    if draft.rule_type.trim().is_empty() {
        return Err(ApiError::BadRequest("rule_type is required".into()));
    }
    Ok(())
}

async fn handle_create_rule(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RuleDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ComplianceRule>), ApiError> {
    let Json(draft) = payload?;
    validate_draft(&draft)?;

    let rule = state.store.create_rule(draft).await.map_err(ApiError::Store)?;
    info!(id = %rule.id, rule_type = rule.rule_type(), "Rule created");

    Ok((StatusCode::CREATED, Json(rule)))
}

async fn handle_update_rule(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RuleDraft>, JsonRejection>,
) -> Result<Json<ComplianceRule>, ApiError> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    validate_draft(&draft)?;

    let rule = state
        .store
        .update_rule(id, draft)
        .await
        .map_err(ApiError::Store)?
        .ok_or_else(|| ApiError::NotFound(format!("Rule {} not found", id)))?;
    debug!(id = %id, "Rule updated");

    Ok(Json(rule))
}

async fn handle_delete_rule(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;

    let deleted = state.store.delete_rule(id).await.map_err(ApiError::Store)?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Rule {} not found", id)));
    }
    info!(id = %id, "Rule deleted");

    Ok(Json(DeleteResponse { deleted }))
}

async fn handle_list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RestrictedItem>>, ApiError> {
    let items = state.store.restricted_items().await.map_err(ApiError::Store)?;
    Ok(Json(items))
}

async fn handle_create_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RestrictedItem>, JsonRejection>,
) -> Result<(StatusCode, Json<RestrictedItem>), ApiError> {
    let Json(item) = payload?;
    if item.item_name.trim().is_empty() {
        return Err(ApiError::BadRequest("item_name is required".into()));
    }

    let item = state
        .store
        .create_restricted_item(item)
        .await
        .map_err(ApiError::Store)?;
    info!(id = %item.id, item = %item.item_name, severity = %item.severity, "Restricted item created");

    Ok((StatusCode::CREATED, Json(item)))
}

async fn handle_list_countries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RestrictedCountry>>, ApiError> {
    let countries = state
        .store
        .restricted_countries()
        .await
        .map_err(ApiError::Store)?;
    Ok(Json(countries))
}

async fn handle_create_country(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RestrictedCountry>, JsonRejection>,
) -> Result<(StatusCode, Json<RestrictedCountry>), ApiError> {
    let Json(country) = payload?;
    if country.country_code.trim().is_empty() && country.country_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "country_code or country_name is required".into(),
        ));
    }

    let country = state
        .store
        .create_restricted_country(country)
        .await
        .map_err(ApiError::Store)?;
    info!(id = %country.id, code = %country.country_code, "Restricted country created");

    Ok((StatusCode::CREATED, Json(country)))
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        narrative_enabled: state.narrative.is_some(),
    })
}

/// Readiness check endpoint.
async fn handle_ready(State(state): State<Arc<AppState>>) -> axum::response::Response {
    if let Err(e) = state.store.ping().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(
                format!("Store unavailable: {}", e),
                "NOT_READY",
            )),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            rules_version: state.store.version(),
        }),
    )
        .into_response()
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = format!(
        r#"# HELP shipcheck_uptime_seconds Application uptime in seconds
# TYPE shipcheck_uptime_seconds counter
shipcheck_uptime_seconds {}

{}"#,
        state.start_time.elapsed().as_secs(),
        state.metrics.to_prometheus(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        metrics,
    )
}
