//! Gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use orderfetch_core::{FetchConfig, StorageConfig};

/// Order fetch gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "orderfetch-gateway")]
#[command(about = "HTTP/JSON gateway comparing order fetch strategies")]
pub struct Args {
    /// Address to listen on for HTTP requests.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// SQLite database file. Uses a private in-memory database when unset.
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Number of pooled store connections.
    #[arg(long, default_value_t = 4)]
    pub pool_size: usize,

    /// Timeout (ms) when acquiring a pooled connection.
    #[arg(long, default_value_t = 30_000)]
    pub pool_acquire_timeout_ms: u64,

    /// Time (ms) SQLite waits on a locked database.
    #[arg(long, default_value_t = 5_000)]
    pub busy_timeout_ms: u64,

    /// Per-request timeout (ms) enforced at the gateway.
    #[arg(long, default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    /// Row cap for unpaged naive and to-one queries.
    #[arg(long, default_value_t = 1000)]
    pub max_results: usize,

    /// Limit used by the paged view when none is given.
    #[arg(long, default_value_t = 100)]
    pub default_limit: usize,

    /// Identifiers per `IN (...)` query in the two-phase plan.
    #[arg(long, default_value_t = 500)]
    pub in_clause_batch_size: usize,

    /// Owners per prefetched item collection query. 0 disables prefetching.
    #[arg(long, default_value_t = 100)]
    pub batch_fetch_size: usize,

    /// Load the demo members, items and orders on startup.
    #[arg(long)]
    pub seed_demo: bool,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Store configuration.
    pub storage: StorageConfig,
    /// Fetch tuning shared by every request.
    pub fetch: FetchConfig,
    /// Per-request timeout enforced at the gateway.
    pub request_timeout: Duration,
    /// Whether to seed demo data on startup.
    pub seed_demo: bool,
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        let storage = match &args.database {
            Some(path) => StorageConfig::new(path).with_pool_size(args.pool_size),
            None => StorageConfig::in_memory(),
        }
        .with_acquire_timeout(Duration::from_millis(args.pool_acquire_timeout_ms))
        .with_busy_timeout(Duration::from_millis(args.busy_timeout_ms));

        let fetch = FetchConfig::default()
            .with_max_results(args.max_results)
            .with_default_limit(args.default_limit)
            .with_in_clause_batch_size(args.in_clause_batch_size)
            .with_batch_fetch_size(args.batch_fetch_size);

        Self {
            listen_addr: args.listen.clone(),
            storage,
            fetch,
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            seed_demo: args.seed_demo,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            storage: StorageConfig::in_memory(),
            fetch: FetchConfig::default(),
            request_timeout: Duration::from_secs(30),
            seed_demo: false,
        }
    }
}
