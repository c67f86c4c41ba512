//! Route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{error, info};

use super::{AppState, json_error};
use crate::application::clients::ClientSyncService;
use crate::domain::api_request::ApiRequestDocument;
use crate::domain::client::WebhookPayload;
use crate::error::{GatewayError, Result};

pub const WELCOME: &str = "Welcome to Mobile Sync Gateway Mock Server";

#[derive(Debug, Deserialize)]
pub struct ApiRequestBody {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub jwt: String,
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /
pub(crate) async fn handle_root() -> &'static str {
    WELCOME
}

/// POST /api/v3/api-requests
pub(crate) async fn handle_process_api_request(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ApiRequestBody>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = body.map_err(decode_failed)?;

    // The detached phase outlives the response; its handle is not awaited.
    let handle = state.pipeline.process_request(&body.id).await?;
    info!(id = handle.id(), "API request accepted");

    Ok((
        StatusCode::CREATED,
        format!("Successfully created API request with id: {}", body.id),
    ))
}

/// GET /api/v3/api-requests/{id}
pub(crate) async fn handle_get_api_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let document = state.pipeline.document(&id).await?;
    Ok(Json(document))
}

/// PUT /api/v3/api-requests/{id}
///
/// Stands in for a device replicating a request into the writes collection.
pub(crate) async fn handle_queue_api_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: std::result::Result<Json<ApiRequestDocument>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(document) = body.map_err(decode_failed)?;
    state.pipeline.enqueue(&id, &document).await?;
    Ok((
        StatusCode::CREATED,
        format!("Queued API request with id: {}", id),
    ))
}

/// POST /api/v3/login
pub(crate) async fn handle_login(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<LoginBody>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = body.map_err(decode_failed)?;
    let user = state.login.login(&body.jwt).await?;
    Ok(Json(user))
}

/// POST /api/v3/client-initializations
pub(crate) async fn handle_client_initializations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse> {
    let clients = client_sync(&state)?;
    let records = clients.fetch_office_clients().await?;

    tokio::spawn(async move {
        clients.save_initial_clients(&records).await;
    });
    Ok("Saving clients to document store")
}

/// POST /api/v3/client-updates/
pub(crate) async fn handle_client_update(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<WebhookPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = body.map_err(decode_failed)?;
    let clients = client_sync(&state)?;

    let resource_id = payload.response.resource_id;
    info!(
        resource_id,
        entity = %payload.entity_name,
        action = %payload.action_name,
        "client webhook received"
    );
    tokio::spawn(async move {
        if let Err(e) = clients.update_from_webhook(resource_id).await {
            error!(resource_id, "failed to update client from webhook: {}", e);
        }
    });
    Ok("OK")
}

fn client_sync(state: &AppState) -> Result<Arc<ClientSyncService>> {
    state
        .clients
        .clone()
        .ok_or(GatewayError::NotConfigured("core banking API"))
}

fn decode_failed(rejection: JsonRejection) -> GatewayError {
    GatewayError::DecodeFailed(rejection.body_text())
}
