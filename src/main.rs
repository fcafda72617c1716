//! Order desk HTTP service
//!
//! Settings are layered: YAML file, then `ORDERDESK_*` / `RUST_LOG`
//! environment variables, then command line flags.

use anyhow::Context;
use clap::Parser;
use orderdesk::config::ServiceConfig;
use orderdesk::server::ServerBuilder;
use orderdesk::storage::SqliteStore;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "orderdesk", version, about = "Customer and order REST service")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "ORDERDESK_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite connection string, e.g. sqlite://orderdesk.db
    #[arg(long)]
    database_url: Option<String>,

    /// Listen address as host:port
    #[arg(long)]
    bind: Option<String>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<ServiceConfig> {
        let config = match &self.config {
            Some(path) => ServiceConfig::from_yaml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServiceConfig::default(),
        };
        let mut config = config.with_env()?;

        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if let Some(bind) = &self.bind {
            config = config.with_bind(bind)?;
        }
        Ok(config)
    }
}

fn init_tracing(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| "orderdesk=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    init_tracing(&config.log.filter);
    tracing::info!(
        database = %config.database.url,
        addr = %config.bind_addr(),
        "Configuration loaded"
    );

    let store = SqliteStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("connecting to database")?;
    store.migrate().await.context("running migrations")?;

    ServerBuilder::new()
        .with_store(store)
        .with_base_path(config.server.base_path.clone())
        .serve(config.bind_addr())
        .await
}
