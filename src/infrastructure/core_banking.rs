use crate::domain::client::{ClientCreationRequest, ClientPage, ClientRecord, CreateClientResponse};
use crate::domain::ports::{ClientDirectory, ClientProvisioner};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const CLIENTS_ENDPOINT: &str = "/fineract-provider/api/v1/clients";
const TENANT_HEADER: &str = "fineract-platform-tenantid";

/// Connection settings for the core banking API.
#[derive(Debug, Clone)]
pub struct CoreBankingConfig {
    pub base_url: String,
    pub token: String,
    pub tenant: String,
    /// Office new clients are created in.
    pub office_id: u32,
    pub timeout: Duration,
}

/// HTTP client for the core banking API.
#[derive(Clone)]
pub struct CoreBankingClient {
    http: Client,
    config: CoreBankingConfig,
}

impl CoreBankingClient {
    pub fn new(config: CoreBankingConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn clients_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            CLIENTS_ENDPOINT
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header(TENANT_HEADER, &self.config.tenant)
            .header(CONTENT_TYPE, "application/json")
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "core banking API rejected request: {}", body);
        return Err(GatewayError::remote(Some(status.as_u16()), body));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::remote(Some(status.as_u16()), e.to_string()))
}

#[async_trait]
impl ClientProvisioner for CoreBankingClient {
    async fn create_client(&self, request: &ClientCreationRequest) -> Result<CreateClientResponse> {
        let body = request.to_create_body(self.config.office_id, Utc::now().date_naive());
        debug!(firstname = %body.firstname, lastname = %body.lastname, "creating client");

        let response = self
            .request(Method::POST, &self.clients_url())
            .json(&body)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl ClientDirectory for CoreBankingClient {
    async fn get_client(&self, client_id: u64) -> Result<ClientRecord> {
        let url = format!("{}/{}", self.clients_url(), client_id);
        let response = self.request(Method::GET, &url).send().await?;
        read_json(response).await
    }

    async fn office_clients(&self, office_id: u32) -> Result<Vec<ClientRecord>> {
        let response = self
            .request(Method::GET, &self.clients_url())
            .query(&[("officeId", office_id)])
            .send()
            .await?;
        let page: ClientPage = read_json(response).await?;
        Ok(page.page_items)
    }
}
