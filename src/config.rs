use clap::{Args, Parser};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Startup configuration for the web server
///
/// Every option can be given on the command line or through the
/// environment variable named next to it. Parsed once in `main` and handed
/// down to the store and the router.
#[derive(Debug, Clone, Parser)]
#[command(name = "website", version, about = "Fetch, restyle and save stored procedures")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    #[command(flatten)]
    pub database: DatabaseConfig,
}

/// Oracle connection parameters
#[derive(Clone, Args)]
pub struct DatabaseConfig {
    #[arg(long = "db-user", env = "ORACLE_USER")]
    pub user: String,

    #[arg(long = "db-password", env = "ORACLE_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long = "db-host", env = "ORACLE_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long = "db-port", env = "ORACLE_PORT", default_value_t = 1521)]
    pub port: u16,

    #[arg(long = "db-service", env = "ORACLE_SERVICE", default_value = "ORCL")]
    pub service: String,
}

impl DatabaseConfig {
    /// EZConnect descriptor, `//host:port/service`
    pub fn connect_string(&self) -> String {
        format!("//{}:{}/{}", self.host, self.port, self.service)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("service", &self.service)
            .finish()
    }
}
