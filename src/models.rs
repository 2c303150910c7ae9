// src/models.rs
use std::collections::HashSet;
use serde::{Serialize, Deserialize};

pub const DEFAULT_LOWER_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DEFAULT_UPPER_LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DEFAULT_DIGITS: &str = "0123456789";
pub const DEFAULT_SYMBOLS: &str = "~!@#$%^&*()_+`-={}|[]\\:\"<>?,./";

/// The four character classes a password is drawn from.
///
/// Each class is stored deduplicated, in first-seen order, so every member
/// has the same chance of being picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSets {
    lower_letters: Vec<char>,
    upper_letters: Vec<char>,
    digits: Vec<char>,
    symbols: Vec<char>,
}

impl CharacterSets {
    pub fn new(lower_letters: &str, upper_letters: &str, digits: &str, symbols: &str) -> Self {
        Self {
            lower_letters: dedup_chars(lower_letters),
            upper_letters: dedup_chars(upper_letters),
            digits: dedup_chars(digits),
            symbols: dedup_chars(symbols),
        }
    }

    pub fn lower_letters(&self) -> &[char] {
        &self.lower_letters
    }

    pub fn upper_letters(&self) -> &[char] {
        &self.upper_letters
    }

    pub fn digits(&self) -> &[char] {
        &self.digits
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Characters eligible for positions not reserved for digits or symbols.
    ///
    /// With `exclude_upper` the upper class contributes nothing, but a
    /// character that is also a lower letter stays in the pool.
    pub fn fill_pool(&self, exclude_upper: bool) -> Vec<char> {
        let mut pool = self.lower_letters.clone();
        if !exclude_upper {
            let lower: HashSet<char> = self.lower_letters.iter().copied().collect();
            pool.extend(self.upper_letters.iter().filter(|c| !lower.contains(*c)));
        }
        pool
    }
}

impl Default for CharacterSets {
    fn default() -> Self {
        Self::new(
            DEFAULT_LOWER_LETTERS,
            DEFAULT_UPPER_LETTERS,
            DEFAULT_DIGITS,
            DEFAULT_SYMBOLS,
        )
    }
}

fn dedup_chars(s: &str) -> Vec<char> {
    let mut seen = HashSet::new();
    s.chars().filter(|c| seen.insert(*c)).collect()
}

// Password generation options
//
// Counts are signed so that negative values coming off the wire reach the
// generator's validation instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordGenerationOptions {
    pub length: i64,
    pub num_digits: i64,
    pub num_symbols: i64,
    pub exclude_upper: bool,
    pub allow_repeat: bool,
}

impl Default for PasswordGenerationOptions {
    fn default() -> Self {
        Self {
            length: 64,
            num_digits: 10,
            num_symbols: 10,
            exclude_upper: false,
            allow_repeat: true,
        }
    }
}
