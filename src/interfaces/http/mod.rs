//! HTTP surface of the mock gateway.
//!
//! Endpoints:
//! - GET  /                              - Welcome text
//! - POST /api/v3/api-requests           - Start processing a queued API request
//! - GET  /api/v3/api-requests/{id}      - Stored API request document
//! - PUT  /api/v3/api-requests/{id}      - Queue an API request document
//! - POST /api/v3/login                  - Provision sync gateway users
//! - POST /api/v3/client-initializations - Load office clients into the reads collection
//! - POST /api/v3/client-updates/        - Core banking change webhook
//!
//! Errors are JSON bodies of the form `{"error": "..."}`.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use self::handlers::{
    handle_client_initializations, handle_client_update, handle_get_api_request, handle_login,
    handle_not_found, handle_process_api_request, handle_queue_api_request, handle_root,
};
use crate::application::auth::LoginService;
use crate::application::clients::ClientSyncService;
use crate::application::pipeline::RequestPipeline;

pub use self::handlers::{ApiRequestBody, LoginBody, WELCOME};

/// Shared state handed to every handler.
pub struct AppState {
    pub pipeline: RequestPipeline,
    pub login: LoginService,
    /// Absent when no core banking API is configured.
    pub clients: Option<Arc<ClientSyncService>>,
}

fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/api/v3/api-requests", post(handle_process_api_request))
        .route(
            "/api/v3/api-requests/{id}",
            get(handle_get_api_request).put(handle_queue_api_request),
        )
        .route("/api/v3/login", post(handle_login))
        .route(
            "/api/v3/client-initializations",
            post(handle_client_initializations),
        )
        .route("/api/v3/client-updates", post(handle_client_update))
        .route("/api/v3/client-updates/", post(handle_client_update))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serves `router` on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
