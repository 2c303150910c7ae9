// src/api/types.rs
use serde::{Serialize, Deserialize};
use utoipa::ToSchema;

use crate::core::config::Config;
use crate::models::{CharacterSets, PasswordGenerationOptions};

// Password generator requests and responses
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordGenerationRequest {
    /// Characters usable as lowercase letters (default: a-z)
    pub lower_letters: Option<String>,
    /// Characters usable as uppercase letters (default: A-Z)
    pub upper_letters: Option<String>,
    /// Characters usable as symbols
    pub symbols: Option<String>,
    /// Characters usable as digits (default: 0-9)
    pub digits: Option<String>,
    /// Total password length (default: 64)
    #[schema(example = 64)]
    pub length: Option<i64>,
    /// Number of digits to place (default: 10)
    #[schema(example = 10)]
    pub num_digits: Option<i64>,
    /// Number of symbols to place (default: 10)
    #[schema(example = 10)]
    pub num_symbols: Option<i64>,
    /// Never fill letter positions with uppercase letters (default: false)
    pub no_upper: Option<bool>,
    /// Allow characters to repeat (default: true)
    pub allow_repeat: Option<bool>,
}

impl PasswordGenerationRequest {
    /// Character classes for this request, falling back to the configured ones.
    ///
    /// A field that is present but empty is an empty class, not a fallback.
    pub fn charsets(&self, config: &Config) -> CharacterSets {
        CharacterSets::new(
            self.lower_letters.as_deref().unwrap_or(&config.lower_letters),
            self.upper_letters.as_deref().unwrap_or(&config.upper_letters),
            self.digits.as_deref().unwrap_or(&config.digit_chars),
            self.symbols.as_deref().unwrap_or(&config.symbol_chars),
        )
    }

    pub fn options(&self, defaults: &PasswordGenerationOptions) -> PasswordGenerationOptions {
        PasswordGenerationOptions {
            length: self.length.unwrap_or(defaults.length),
            num_digits: self.num_digits.unwrap_or(defaults.num_digits),
            num_symbols: self.num_symbols.unwrap_or(defaults.num_symbols),
            exclude_upper: self.no_upper.unwrap_or(defaults.exclude_upper),
            allow_repeat: self.allow_repeat.unwrap_or(defaults.allow_repeat),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PasswordGenerationResponse {
    /// Generated password
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
