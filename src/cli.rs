use clap::Parser;

use crate::core::config::{parse_log_level, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind the API server to (overrides WEB_ADDRESS)
    #[arg(long)]
    pub address: Option<String>,

    /// API server port (overrides WEB_PORT)
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Log level: off, error, warn, info, debug or trace (overrides LOG_LEVEL)
    #[arg(long, value_parser = parse_level_arg)]
    pub log_level: Option<log::LevelFilter>,
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(address) = &self.address {
            config.web_address = address.clone();
        }
        if let Some(port) = self.port {
            config.web_port = port;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

fn parse_level_arg(level: &str) -> Result<log::LevelFilter, String> {
    parse_log_level(level).ok_or_else(|| format!("unknown log level '{}'", level))
}
