//! HTTP surface for `studio serve`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use studio_form::{FormLayout, FormState, layout};
use studio_models::{ModelDescriptor, OutputKind, Registry};
use studio_relay::{ErrorBody, Relay, RelayError};

/// Shared server state.
pub struct AppState {
    pub registry: Registry,
    pub relay: Relay,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/generate", post(generate).get(generate_query))
        .route("/generate/run", post(run))
        .route("/models", get(list_models))
        .route("/models/{id}", get(model_detail))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

fn relay_error(err: RelayError) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err.to_string())
}

// ============================================================================
// Relay
// ============================================================================

pub async fn generate(State(state): State<SharedState>, body: Bytes) -> Response {
    match state.relay.generate(&body).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => relay_error(err),
    }
}

pub async fn run(State(state): State<SharedState>, body: Bytes) -> Response {
    match state.relay.run(&body).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => relay_error(err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    pub action: Option<String>,
    pub owner: Option<String>,
    pub model: Option<String>,
}

/// `?action=health` reports readiness; `?owner=..&model=..` checks a model
/// upstream.
pub async fn generate_query(
    State(state): State<SharedState>,
    Query(query): Query<GenerateQuery>,
) -> Response {
    if query.action.as_deref() == Some("health") {
        return match state.relay.health() {
            Ok(health) => Json(health).into_response(),
            Err(err) => relay_error(err),
        };
    }
    match state
        .relay
        .lookup(query.owner.as_deref(), query.model.as_deref())
        .await
    {
        Ok(found) => Json(found).into_response(),
        Err(err) => relay_error(err),
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub model_path: String,
    pub output_kind: OutputKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDetail<'a> {
    pub model: &'a ModelDescriptor,
    pub model_path: String,
    pub initial_values: FormState,
    pub form: FormLayout,
}

pub async fn list_models(State(state): State<SharedState>) -> Json<Vec<ModelSummary>> {
    let models = state
        .registry
        .list()
        .iter()
        .map(|m| ModelSummary {
            id: m.id.clone(),
            name: m.name.clone(),
            description: m.description.clone(),
            model_path: m.model_path(),
            output_kind: m.output_kind,
        })
        .collect();
    Json(models)
}

pub async fn model_detail(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let model = match state.registry.get(&id) {
        Ok(model) => model,
        Err(err) => return error_response(StatusCode::NOT_FOUND, err.to_string()),
    };
    let form = FormState::from_descriptor(model);
    let detail = ModelDetail {
        model,
        model_path: model.model_path(),
        form: layout(model, &form),
        initial_values: form,
    };
    Json(detail).into_response()
}
