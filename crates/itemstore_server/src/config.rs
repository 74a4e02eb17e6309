//! Server configuration.
//!
//! Every flag falls back to an environment variable, so the process can be
//! configured purely through `DATABASE_URL` and friends.

use clap::Parser;
use itemstore_core::db::{ConnectionStringError, DatabaseLocation};

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

/// Item catalog HTTP server.
#[derive(Parser, Debug, Clone)]
#[command(name = "itemstore-server")]
#[command(about = "CRUD service over the item catalog")]
#[command(version)]
pub struct ServerConfig {
    /// Connection string of the backing store, e.g. `sqlite://items.db`
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Listen address (host:port)
    #[arg(short, long, env = "ITEMSTORE_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Log level: trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, env = "ITEMSTORE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset
    #[arg(long, env = "ITEMSTORE_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Apply pending schema migrations before serving
    #[arg(long, env = "ITEMSTORE_PROVISION")]
    pub provision: bool,
}

impl ServerConfig {
    /// Builds a config for `database_url` with every other field defaulted.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            listen: DEFAULT_LISTEN.to_string(),
            log_level: None,
            log_dir: None,
            provision: false,
        }
    }

    /// Resolves `database_url` into a concrete location.
    pub fn database_location(&self) -> Result<DatabaseLocation, ConnectionStringError> {
        DatabaseLocation::parse(&self.database_url)
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| itemstore_core::default_log_level())
    }

    /// In-memory stores have no other way to get a schema.
    pub fn should_provision(&self, location: &DatabaseLocation) -> bool {
        self.provision || location.is_memory()
    }
}
