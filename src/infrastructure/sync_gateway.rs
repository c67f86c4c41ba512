use crate::domain::ports::UserRegistry;
use crate::domain::user::SyncGatewayUser;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::warn;

/// Client for the sync gateway admin API.
#[derive(Clone)]
pub struct SyncGatewayAdmin {
    http: Client,
    base_url: String,
}

impl SyncGatewayAdmin {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl UserRegistry for SyncGatewayAdmin {
    async fn create_user(&self, database: &str, user: &SyncGatewayUser) -> Result<()> {
        let url = format!("{}/{}/_user/", self.base_url, database);
        let response = self.http.post(&url).json(user).send().await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            warn!(database, status = status.as_u16(), "error creating sync gateway user");
            return Err(GatewayError::remote(
                Some(status.as_u16()),
                format!("error creating {} user: {}", database, body),
            ));
        }
        Ok(())
    }
}
