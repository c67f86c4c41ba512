mod common;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use common::spawn_stub;
use serde_json::Value;
use sgw_mock::application::auth::LoginService;
use sgw_mock::error::GatewayError;
use sgw_mock::infrastructure::sync_gateway::SyncGatewayAdmin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Gateway {
    users: Mutex<Vec<(String, Value)>>,
    reject: Option<&'static str>,
}

async fn create_user(
    State(gateway): State<Arc<Gateway>>,
    Path(database): Path<String>,
    Json(user): Json<Value>,
) -> StatusCode {
    if gateway.reject == Some(database.as_str()) {
        return StatusCode::CONFLICT;
    }
    gateway.users.lock().unwrap().push((database, user));
    StatusCode::CREATED
}

async fn login_service(gateway: Arc<Gateway>) -> LoginService {
    let app = Router::new()
        .route("/{database}/_user/", post(create_user))
        .with_state(gateway);
    let base_url = spawn_stub(app).await;
    let admin = SyncGatewayAdmin::new(format!("{}/", base_url), Duration::from_secs(5)).unwrap();
    LoginService::new(
        Arc::new(admin),
        vec!["offline_reads".to_string(), "offline_writes".to_string()],
    )
}

#[tokio::test]
async fn test_login_creates_users_on_gateway() {
    let gateway = Arc::new(Gateway::default());
    let service = login_service(gateway.clone()).await;

    let provisioned = service.login(&"j".repeat(128)).await.unwrap();

    let users = gateway.users.lock().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].0, "offline_reads");
    assert_eq!(users[1].0, "offline_writes");

    let user = &users[0].1;
    assert_eq!(user["name"], provisioned.name.as_str());
    assert_eq!(user["password"], provisioned.password.as_str());
    assert_eq!(user["disabled"], false);
    let all_channels = user["all_channels"].as_array().unwrap();
    assert_eq!(all_channels.last().unwrap(), "!");
    assert!(
        user["roles"]
            .as_array()
            .unwrap()
            .iter()
            .any(|role| role == "replicator")
    );
}

#[tokio::test]
async fn test_gateway_rejection_fails_login() {
    let gateway = Arc::new(Gateway {
        reject: Some("offline_writes"),
        ..Gateway::default()
    });
    let service = login_service(gateway.clone()).await;

    let err = service.login(&"j".repeat(128)).await.unwrap_err();

    assert!(matches!(err, GatewayError::RemoteCallFailed { status: Some(409), .. }));
    assert_eq!(gateway.users.lock().unwrap().len(), 1);
}
