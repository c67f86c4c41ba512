use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use sgw_mock::application::auth::LoginService;
use sgw_mock::application::clients::ClientSyncService;
use sgw_mock::application::pipeline::RequestPipeline;
use sgw_mock::application::seed::DemoSeeder;
use sgw_mock::config::Settings;
use sgw_mock::domain::ports::{ApiRequestStoreRef, ClientProvisionerRef, SyncDocumentStoreRef};
use sgw_mock::infrastructure::core_banking::CoreBankingClient;
use sgw_mock::infrastructure::in_memory::InMemoryDocumentStore;
#[cfg(feature = "storage-rocksdb")]
use sgw_mock::infrastructure::rocksdb::{CollectionLayout, RocksDbStore};
use sgw_mock::infrastructure::sync_gateway::SyncGatewayAdmin;
use sgw_mock::interfaces::http::{self, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_FILES: [&str; 2] = [".env", "../.env"];

#[derive(Parser)]
#[command(author, version, about = "Mock mobile sync gateway", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Publish demo client and group documents to the reads collection
    Seed {
        /// Channels to publish to; the last containing `clients` and the
        /// last containing `groups` are used
        #[arg(long = "channel", required = true)]
        channels: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_env_file()?;
    let cli = Cli::parse();
    init_tracing();
    if let Some(path) = env_file {
        info!(path, "loaded environment file");
    }

    let settings = cli.settings;
    let (api_requests, sync_documents) = open_stores(&settings);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Seed { channels } => {
            let published = DemoSeeder::new(sync_documents).publish(&channels).await;
            println!("Published {} documents", published);
        }
        Command::Serve => run_server(settings, api_requests, sync_documents).await?,
    }

    Ok(())
}

/// Loads the first env file that exists. Variables already set take precedence.
fn load_env_file() -> Result<Option<&'static str>> {
    for path in ENV_FILES {
        match dotenvy::from_filename(path) {
            Ok(_) => return Ok(Some(path)),
            Err(e) if e.not_found() => continue,
            Err(e) => return Err(miette!("failed to load {}: {}", path, e)),
        }
    }
    Ok(None)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sgw_mock=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_stores(settings: &Settings) -> (ApiRequestStoreRef, SyncDocumentStoreRef) {
    if let Some(path) = &settings.store_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            let layout = CollectionLayout {
                reads: settings.reads_collection.clone(),
                writes: settings.writes_collection.clone(),
            };
            info!(path = %path.display(), "using RocksDB document store");
            let store = RocksDbStore::new(path, layout);
            return (Arc::new(store.clone()), Arc::new(store));
        }

        #[cfg(not(feature = "storage-rocksdb"))]
        {
            let _ = path;
            eprintln!(
                "WARNING: Persistent storage requested via --store-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
        }
    }

    let store = InMemoryDocumentStore::new();
    (Arc::new(store.clone()), Arc::new(store))
}

async fn run_server(
    settings: Settings,
    api_requests: ApiRequestStoreRef,
    sync_documents: SyncDocumentStoreRef,
) -> Result<()> {
    let (provisioner, clients) = match settings.core_banking() {
        Some(config) => {
            info!(base_url = %config.base_url, "using core banking API");
            let client = Arc::new(CoreBankingClient::new(config).into_diagnostic()?);
            let clients = ClientSyncService::new(
                client.clone(),
                sync_documents,
                settings.default_office_id,
            );
            let provisioner: ClientProvisionerRef = client;
            (provisioner, Some(Arc::new(clients)))
        }
        None => {
            info!(
                delay_ms = settings.simulated_delay_ms,
                failure_one_in = settings.simulated_failure_one_in,
                "core banking API not configured, simulating client creation"
            );
            let provisioner: ClientProvisionerRef = Arc::new(settings.simulated_provisioner());
            (provisioner, None)
        }
    };

    let pipeline =
        RequestPipeline::new(api_requests, provisioner).with_audit_trail(settings.audit_trail);
    let registry = SyncGatewayAdmin::new(&settings.sgw_base_url, settings.http_timeout())
        .into_diagnostic()?;
    let login = LoginService::new(Arc::new(registry), settings.user_databases());

    let app = http::router(AppState {
        pipeline,
        login,
        clients,
    });
    http::serve(settings.listen_addr(), app)
        .await
        .into_diagnostic()
}
