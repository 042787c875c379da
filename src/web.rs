#![cfg(not(tarpaulin_include))]

use clap::Parser;
use plsql_restyle::app;
use plsql_restyle::config::Config;

/// Main entry point for the web application
///
/// Reads the configuration from flags and environment, sets up logging and
/// serves the procedure editor until the process is stopped.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::info!(
        "Using database {} as {}",
        config.database.connect_string(),
        config.database.user
    );

    app::run(config).await
}
