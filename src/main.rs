use clap::Parser;
use std::io;
use std::path::Path;

use rust_passgen::api;
use rust_passgen::cli::Args;
use rust_passgen::core::config::Config;
use rust_passgen::logging;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    if Path::new(".env").exists() {
        dotenvy::dotenv().ok();
    }

    let args = Args::parse();
    let mut config = Config::load();
    args.apply(&mut config);

    logging::init(config.log_level)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    log::debug!("Loaded config: {:?}", config);

    api::start_server(config).await.map_err(|e| {
        log::error!("API server failed: {}", e);
        e
    })
}
