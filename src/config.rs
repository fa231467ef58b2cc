use crate::application::MarketplaceConfig;
use crate::domain::ports::{PaymentGatewayRef, Stores};
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryStore;
use crate::infrastructure::password::DEFAULT_COST;
use crate::infrastructure::paystack::{DEFAULT_BASE_URL, PaystackGateway};
use crate::infrastructure::sandbox::SandboxGateway;
use crate::infrastructure::session::SessionSigner;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_SEED_SUPPLIER: &str = "catalog@procura.local";

#[derive(Parser, Debug)]
#[command(name = "procura", author, version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "PROCURA_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Import a supplier catalog CSV and print the resulting catalog
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "PROCURA_DB_PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Paystack,
    /// Approves every payment; for local runs
    Sandbox,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "PROCURA_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[arg(long, value_enum, env = "PROCURA_GATEWAY", default_value = "paystack")]
    pub gateway: GatewayKind,

    #[arg(long, env = "PAYSTACK_SECRET_KEY", hide_env_values = true)]
    pub paystack_secret_key: Option<String>,

    #[arg(long, env = "PAYSTACK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub paystack_base_url: String,

    /// Secret for signing session tokens. A random one is used when absent.
    #[arg(long, env = "PROCURA_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Base URL buyers are sent back to after checkout
    #[arg(long, env = "PROCURA_PUBLIC_URL", default_value = "http://localhost:3000")]
    pub public_url: String,

    /// Catalog CSV imported before the server starts
    #[arg(long)]
    pub seed_catalog: Option<PathBuf>,

    /// Supplier account that owns the seeded catalog
    #[arg(long, default_value = DEFAULT_SEED_SUPPLIER)]
    pub seed_supplier: String,
}

#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Input catalog CSV file
    pub input: PathBuf,

    /// Email of the supplier the products are listed under
    #[arg(long)]
    pub supplier: String,

    #[command(flatten)]
    pub storage: StorageArgs,
}

impl StorageArgs {
    /// Every store backed by one adapter: RocksDB when a path is given and
    /// the feature is compiled in, memory otherwise.
    pub fn stores(&self) -> Result<Stores> {
        #[cfg(feature = "storage-rocksdb")]
        if let Some(path) = &self.db_path {
            let store = crate::infrastructure::rocksdb::RocksDBStore::open(path)?;
            return Ok(Stores::from_adapter(store));
        }

        #[cfg(not(feature = "storage-rocksdb"))]
        if self.db_path.is_some() {
            warn!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' \
                 feature is not enabled. Falling back to In-Memory storage."
            );
        }

        Ok(Stores::from_adapter(InMemoryStore::new()))
    }
}

impl ServeArgs {
    pub fn gateway(&self) -> Result<PaymentGatewayRef> {
        match self.gateway {
            GatewayKind::Paystack => {
                let key = self.paystack_secret_key.clone().unwrap_or_default();
                Ok(Arc::new(PaystackGateway::new(key, &self.paystack_base_url)?))
            }
            GatewayKind::Sandbox => {
                warn!("sandbox gateway enabled, every payment will be approved");
                Ok(Arc::new(SandboxGateway::new(&self.public_url)))
            }
        }
    }

    pub fn session_signer(&self) -> Result<SessionSigner> {
        match self.session_secret.as_deref() {
            Some(secret) => SessionSigner::new(secret),
            None => {
                warn!("no session secret configured, sessions end when the process exits");
                Ok(SessionSigner::ephemeral())
            }
        }
    }

    pub fn marketplace_config(&self) -> MarketplaceConfig {
        MarketplaceConfig {
            public_url: self.public_url.trim_end_matches('/').to_string(),
            password_cost: DEFAULT_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketError;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["procura", "serve", "--gateway", "sandbox"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(args.gateway, GatewayKind::Sandbox);
        assert_eq!(args.seed_supplier, DEFAULT_SEED_SUPPLIER);
        assert!(args.gateway().is_ok());
    }

    #[test]
    fn test_paystack_requires_secret() {
        let cli = Cli::try_parse_from([
            "procura",
            "serve",
            "--gateway",
            "paystack",
            "--paystack-secret-key",
            "",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert!(matches!(args.gateway(), Err(MarketError::Internal(_))));
    }

    #[test]
    fn test_catalog_requires_supplier() {
        assert!(Cli::try_parse_from(["procura", "catalog", "items.csv"]).is_err());
        let cli = Cli::try_parse_from([
            "procura",
            "catalog",
            "items.csv",
            "--supplier",
            "sales@acme.test",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Catalog(_)));
    }
}
