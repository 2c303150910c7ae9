// src/core/config.rs
use std::env;
use std::str::FromStr;
use log::LevelFilter;

use crate::models::{
    CharacterSets, PasswordGenerationOptions, DEFAULT_DIGITS, DEFAULT_LOWER_LETTERS,
    DEFAULT_SYMBOLS, DEFAULT_UPPER_LETTERS,
};

// Configuration for the password service
#[derive(Debug, Clone)]
pub struct Config {
    // Web Interface
    pub web_address: String,
    pub web_port: u16,

    // Character classes used when a request doesn't supply its own
    pub lower_letters: String,
    pub upper_letters: String,
    pub digit_chars: String,
    pub symbol_chars: String,

    // Password Generation
    pub default_options: PasswordGenerationOptions,
    pub max_password_length: i64,

    // Logging
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Web Interface
            web_address: "127.0.0.1".to_string(),
            web_port: 8080,

            lower_letters: DEFAULT_LOWER_LETTERS.to_string(),
            upper_letters: DEFAULT_UPPER_LETTERS.to_string(),
            digit_chars: DEFAULT_DIGITS.to_string(),
            symbol_chars: DEFAULT_SYMBOLS.to_string(),

            // Password Generation
            default_options: PasswordGenerationOptions::default(),
            max_password_length: 4096,

            // Logging
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    // Load configuration from environment variables
    pub fn load() -> Self {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn load_from<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        // Web Interface
        if let Some(address) = lookup("WEB_ADDRESS") {
            config.web_address = address;
        }
        parse_into(&lookup, "WEB_PORT", &mut config.web_port);

        // Character classes
        if let Some(chars) = lookup("PASSWORD_LOWER_LETTERS") {
            config.lower_letters = chars;
        }
        if let Some(chars) = lookup("PASSWORD_UPPER_LETTERS") {
            config.upper_letters = chars;
        }
        if let Some(chars) = lookup("PASSWORD_DIGIT_CHARS") {
            config.digit_chars = chars;
        }
        if let Some(chars) = lookup("PASSWORD_SYMBOL_CHARS") {
            config.symbol_chars = chars;
        }

        // Password Generation
        let options = &mut config.default_options;
        parse_into(&lookup, "PASSWORD_LENGTH", &mut options.length);
        parse_into(&lookup, "PASSWORD_DIGITS", &mut options.num_digits);
        parse_into(&lookup, "PASSWORD_SYMBOLS", &mut options.num_symbols);
        parse_into(&lookup, "PASSWORD_NO_UPPER", &mut options.exclude_upper);
        parse_into(&lookup, "PASSWORD_ALLOW_REPEAT", &mut options.allow_repeat);
        parse_into(&lookup, "PASSWORD_MAX_LENGTH", &mut config.max_password_length);

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            match parse_log_level(&level) {
                Some(filter) => config.log_level = filter,
                None => log::warn!("Unknown log level '{}', keeping {}", level, config.log_level),
            }
        }

        config
    }

    pub fn charsets(&self) -> CharacterSets {
        CharacterSets::new(
            &self.lower_letters,
            &self.upper_letters,
            &self.digit_chars,
            &self.symbol_chars,
        )
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.web_address.clone(), self.web_port)
    }
}

pub fn parse_log_level(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn parse_into<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(val) = lookup(key) {
        match val.trim().parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => log::warn!("Ignoring invalid value '{}' for {}", val, key),
        }
    }
}
