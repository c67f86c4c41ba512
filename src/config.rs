//! Runtime settings: command-line flags with environment fallbacks.

use crate::domain::api_request::AuditTrail;
use crate::infrastructure::core_banking::CoreBankingConfig;
use crate::infrastructure::simulated::SimulatedProvisioner;
use clap::Args;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Address the HTTP server binds to
    #[arg(long, env = "SERVER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Base URL of the sync gateway admin API
    #[arg(long, env = "SGW_BASE_URL", default_value = "http://localhost:4985")]
    pub sgw_base_url: String,

    /// Core banking API base URL. Without it (or a token), client creation is simulated.
    #[arg(long, env = "CORE_BANKING_URL")]
    pub core_banking_url: Option<String>,

    #[arg(long, env = "CORE_BANKING_TOKEN", hide_env_values = true)]
    pub core_banking_token: Option<String>,

    #[arg(long, env = "CORE_BANKING_TENANT", default_value = "default")]
    pub core_banking_tenant: String,

    /// Office new clients are created in and initial clients are loaded from
    #[arg(long, env = "DEFAULT_OFFICE_ID", default_value_t = 240)]
    pub default_office_id: u32,

    /// Path to persistent document store (optional). If provided, uses RocksDB.
    #[arg(long, env = "STORE_PATH")]
    pub store_path: Option<PathBuf>,

    #[arg(long, env = "READS_COLLECTION", default_value = "offline_reads")]
    pub reads_collection: String,

    #[arg(long, env = "WRITES_COLLECTION", default_value = "offline_writes")]
    pub writes_collection: String,

    /// Delay of each simulated client creation, in milliseconds
    #[arg(long, env = "SIMULATED_DELAY_MS", default_value_t = 2000)]
    pub simulated_delay_ms: u64,

    /// Simulated client creation fails once in this many calls (0 = never)
    #[arg(long, env = "SIMULATED_FAILURE_ONE_IN", default_value_t = SimulatedProvisioner::DEFAULT_FAILURE_ONE_IN)]
    pub simulated_failure_one_in: u32,

    /// How a request's document states are treated when it is processed again
    #[arg(long, env = "AUDIT_TRAIL", value_enum, default_value_t = AuditTrail::Append)]
    pub audit_trail: AuditTrail,

    /// Timeout for outbound HTTP calls, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

impl Settings {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Connection settings for the real core banking API, when both its URL
    /// and token are set.
    pub fn core_banking(&self) -> Option<CoreBankingConfig> {
        let base_url = self.core_banking_url.as_deref().filter(|url| !url.is_empty())?;
        let token = self.core_banking_token.as_deref().filter(|token| !token.is_empty())?;
        Some(CoreBankingConfig {
            base_url: base_url.to_string(),
            token: token.to_string(),
            tenant: self.core_banking_tenant.clone(),
            office_id: self.default_office_id,
            timeout: self.http_timeout(),
        })
    }

    pub fn simulated_provisioner(&self) -> SimulatedProvisioner {
        SimulatedProvisioner::new(
            Duration::from_millis(self.simulated_delay_ms),
            self.simulated_failure_one_in,
        )
    }

    /// Sync gateway databases users are created in, reads first.
    pub fn user_databases(&self) -> Vec<String> {
        vec![self.reads_collection.clone(), self.writes_collection.clone()]
    }
}
