// src/logging/mod.rs
use log::LevelFilter;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, LoggingError>;

/// Build the service logger.
///
/// `RUST_LOG` still applies on top of `level`, so individual modules (for
/// example `actix_web`) can be tuned without touching the configuration.
pub fn builder(level: LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp_secs()
        .format_module_path(true)
        .format_target(false)
        .parse_default_env();
    builder
}

pub fn init(level: LevelFilter) -> Result<()> {
    builder(level).try_init()?;
    log::debug!("Logger initialized at level {}", level);
    Ok(())
}
