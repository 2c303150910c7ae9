// src/generators/password.rs
use std::collections::HashMap;

use log::debug;
use rand::rngs::OsRng;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use rand_core::{CryptoRng, RngCore};
use thiserror::Error;

use crate::models::{CharacterSets, PasswordGenerationOptions};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Invalid length: {0} (must not be negative)")]
    InvalidLength(i64),

    #[error("Invalid count: digits={digits}, symbols={symbols} (must not be negative)")]
    InvalidCount { digits: i64, symbols: i64 },

    #[error("Digits ({digits}) plus symbols ({symbols}) exceed the length ({length})")]
    CountExceedsLength { length: i64, digits: i64, symbols: i64 },

    #[error("Character class '{0}' is empty but characters from it are required")]
    EmptyCharacterClass(&'static str),

    #[error("Not enough unique characters in '{class}': need {required}, have {available}")]
    InsufficientUniqueCharacters {
        class: String,
        required: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

const DIGITS: usize = 0;
const SYMBOLS: usize = 1;
const LETTERS: usize = 2;
const GROUP_NAMES: [&str; 3] = ["digits", "symbols", "letters"];

/// Validated counts and pools for a single generation call.
struct Plan {
    length: usize,
    demand: [usize; 3],
    pools: [Vec<char>; 3],
    // Present only when characters may not repeat.
    unused: Option<Buckets>,
}

/// Builds passwords from one set of character classes.
pub struct PasswordGenerator {
    charsets: CharacterSets,
}

impl PasswordGenerator {
    pub fn new(charsets: CharacterSets) -> Self {
        PasswordGenerator { charsets }
    }

    /// Generate a password from the operating system's CSPRNG.
    ///
    /// `OsRng` keeps no state, so this is safe to call from any number of
    /// threads at once.
    pub fn generate_password(&self, options: &PasswordGenerationOptions) -> Result<String> {
        self.generate_with(&mut OsRng, options)
    }

    /// Generate a password drawing every position and character from `rng`.
    ///
    /// All validation happens before the first draw; on error nothing has
    /// been consumed from `rng`.
    pub fn generate_with<R>(&self, rng: &mut R, options: &PasswordGenerationOptions) -> Result<String>
    where
        R: RngCore + CryptoRng,
    {
        let plan = self.validate(options)?;
        debug!(
            "Generating password: length={} digits={} symbols={} exclude_upper={} allow_repeat={}",
            plan.length,
            plan.demand[DIGITS],
            plan.demand[SYMBOLS],
            options.exclude_upper,
            options.allow_repeat
        );

        let length = plan.length;
        let (num_digits, num_symbols) = (plan.demand[DIGITS], plan.demand[SYMBOLS]);
        let mut buffer: Vec<Option<char>> = vec![None; length];
        let mut placer = Placer::new(plan);

        // Digits go anywhere, symbols into what's left, letters fill the rest.
        for slot in index::sample(rng, length, num_digits) {
            buffer[slot] = Some(placer.draw(rng, DIGITS)?);
        }

        let free: Vec<usize> = open_slots(&buffer);
        for i in index::sample(rng, free.len(), num_symbols) {
            buffer[free[i]] = Some(placer.draw(rng, SYMBOLS)?);
        }

        for slot in open_slots(&buffer) {
            buffer[slot] = Some(placer.draw(rng, LETTERS)?);
        }

        Ok(buffer.into_iter().flatten().collect())
    }

    fn validate(&self, options: &PasswordGenerationOptions) -> Result<Plan> {
        let PasswordGenerationOptions {
            length,
            num_digits,
            num_symbols,
            exclude_upper,
            allow_repeat,
        } = *options;

        if length < 0 {
            return Err(GeneratorError::InvalidLength(length));
        }
        if num_digits < 0 || num_symbols < 0 {
            return Err(GeneratorError::InvalidCount {
                digits: num_digits,
                symbols: num_symbols,
            });
        }
        if num_digits.saturating_add(num_symbols) > length {
            return Err(GeneratorError::CountExceedsLength {
                length,
                digits: num_digits,
                symbols: num_symbols,
            });
        }

        let length = usize::try_from(length).map_err(|_| GeneratorError::InvalidLength(length))?;
        // Both counts are non-negative and bounded by `length` here.
        let num_digits = num_digits as usize;
        let num_symbols = num_symbols as usize;
        let num_letters = length - num_digits - num_symbols;

        let pools = [
            self.charsets.digits().to_vec(),
            self.charsets.symbols().to_vec(),
            self.charsets.fill_pool(exclude_upper),
        ];
        let demand = [num_digits, num_symbols, num_letters];

        for group in [DIGITS, SYMBOLS, LETTERS] {
            if demand[group] > 0 && pools[group].is_empty() {
                return Err(GeneratorError::EmptyCharacterClass(GROUP_NAMES[group]));
            }
        }

        let unused = if allow_repeat {
            None
        } else {
            let buckets = Buckets::new(&pools);
            if let Some((mask, required, available)) = first_shortfall(&buckets.counts(), &demand) {
                return Err(GeneratorError::InsufficientUniqueCharacters {
                    class: group_label(mask),
                    required,
                    available,
                });
            }
            Some(buckets)
        };

        Ok(Plan { length, demand, pools, unused })
    }
}

/// Convenience wrapper around a fresh `PasswordGenerator`.
pub fn generate(charsets: &CharacterSets, options: &PasswordGenerationOptions) -> Result<String> {
    PasswordGenerator::new(charsets.clone()).generate_password(options)
}

/// Unused characters keyed by the set of draw groups they belong to.
///
/// Bit `g` of an index is set when the character is in group `g`'s pool, so
/// a character shared by digits and letters lives in bucket `0b101`.
struct Buckets {
    by_mask: [Vec<char>; 8],
}

impl Buckets {
    fn new(pools: &[Vec<char>; 3]) -> Self {
        let mut membership: HashMap<char, usize> = HashMap::new();
        for (group, pool) in pools.iter().enumerate() {
            for c in pool {
                *membership.entry(*c).or_default() |= 1 << group;
            }
        }

        // Walk the pools again so bucket order doesn't depend on hashing.
        let mut by_mask: [Vec<char>; 8] = Default::default();
        for c in pools.iter().flatten() {
            if let Some(mask) = membership.remove(c) {
                by_mask[mask].push(*c);
            }
        }
        Self { by_mask }
    }

    fn counts(&self) -> [usize; 8] {
        let mut counts = [0; 8];
        for (mask, bucket) in self.by_mask.iter().enumerate() {
            counts[mask] = bucket.len();
        }
        counts
    }
}

/// Draws characters for one call while tracking the repeat policy.
struct Placer {
    pools: [Vec<char>; 3],
    remaining: [usize; 3],
    unused: Option<Buckets>,
}

impl Placer {
    fn new(plan: Plan) -> Self {
        Self {
            pools: plan.pools,
            remaining: plan.demand,
            unused: plan.unused,
        }
    }

    fn draw<R: RngCore + CryptoRng>(&mut self, rng: &mut R, group: usize) -> Result<char> {
        self.remaining[group] -= 1;

        let picked = match self.unused.as_mut() {
            None => self.pools[group].choose(rng).copied(),
            Some(unused) => {
                let counts = unused.counts();

                // A bucket is eligible if taking one character from it still
                // leaves enough for every later draw.
                let mut eligible = [false; 8];
                let mut total = 0;
                for mask in 1..8 {
                    if mask & (1 << group) == 0 || counts[mask] == 0 {
                        continue;
                    }
                    let mut after = counts;
                    after[mask] -= 1;
                    if first_shortfall(&after, &self.remaining).is_none() {
                        eligible[mask] = true;
                        total += counts[mask];
                    }
                }

                if total == 0 {
                    None
                } else {
                    let mut pick = rng.gen_range(0..total);
                    let mut found = None;
                    for mask in 1..8 {
                        if !eligible[mask] {
                            continue;
                        }
                        if pick < counts[mask] {
                            found = Some(unused.by_mask[mask].swap_remove(pick));
                            break;
                        }
                        pick -= counts[mask];
                    }
                    found
                }
            }
        };

        picked.ok_or_else(|| GeneratorError::InsufficientUniqueCharacters {
            class: GROUP_NAMES[group].to_string(),
            required: self.remaining[group] + 1,
            available: 0,
        })
    }
}

/// Finds a combination of draw groups whose remaining demand exceeds the
/// unused characters they can draw from.
///
/// `counts[m]` is the number of unused characters whose group membership is
/// exactly `m`. Returns `(group mask, required, available)` for the first
/// shortfall. When none exists a repeat-free assignment is possible.
fn first_shortfall(counts: &[usize; 8], demand: &[usize; 3]) -> Option<(usize, usize, usize)> {
    // Single groups first so the error names the most specific class.
    const MASKS: [usize; 7] = [0b001, 0b010, 0b100, 0b011, 0b101, 0b110, 0b111];

    MASKS.iter().find_map(|&mask| {
        let required: usize = (0..3)
            .filter(|group| mask & (1 << group) != 0)
            .map(|group| demand[group])
            .sum();
        if required == 0 {
            return None;
        }
        let available: usize = (1..8)
            .filter(|member| member & mask != 0)
            .map(|member| counts[member])
            .sum();
        (required > available).then_some((mask, required, available))
    })
}

fn group_label(mask: usize) -> String {
    (0..3)
        .filter(|group| mask & (1 << group) != 0)
        .map(|group| GROUP_NAMES[group])
        .collect::<Vec<_>>()
        .join("+")
}

fn open_slots(buffer: &[Option<char>]) -> Vec<usize> {
    buffer
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.is_none().then_some(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::{Duration, Instant};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn sample_sets() -> CharacterSets {
        CharacterSets::new("abcde", "ABCDE", "01234", "!@#$%")
    }

    fn options(length: i64, num_digits: i64, num_symbols: i64, exclude_upper: bool, allow_repeat: bool) -> PasswordGenerationOptions {
        PasswordGenerationOptions {
            length,
            num_digits,
            num_symbols,
            exclude_upper,
            allow_repeat,
        }
    }

    fn count_in(password: &str, class: &[char]) -> usize {
        password.chars().filter(|c| class.contains(c)).count()
    }

    #[test]
    fn generates_sixty_four_characters_with_required_counts() {
        let sets = sample_sets();
        let password = generate(&sets, &options(64, 10, 10, false, true)).unwrap();

        assert_eq!(password.chars().count(), 64);
        assert!(count_in(&password, sets.digits()) >= 10);
        assert!(count_in(&password, sets.symbols()) >= 10);
    }

    #[test]
    fn counts_hold_across_seeded_runs() {
        let sets = sample_sets();
        let generator = PasswordGenerator::new(sets.clone());

        for seed in 0..50 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let password = generator
                .generate_with(&mut rng, &options(20, 4, 6, false, true))
                .unwrap();
            assert_eq!(password.chars().count(), 20);
            assert_eq!(count_in(&password, sets.digits()), 4);
            assert_eq!(count_in(&password, sets.symbols()), 6);
        }
    }

    #[test]
    fn same_seed_gives_same_password() {
        let generator = PasswordGenerator::new(sample_sets());
        let opts = options(32, 5, 5, false, true);

        let a = generator.generate_with(&mut ChaCha20Rng::seed_from_u64(7), &opts).unwrap();
        let b = generator.generate_with(&mut ChaCha20Rng::seed_from_u64(7), &opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_length_gives_empty_password() {
        let password = generate(&sample_sets(), &options(0, 0, 0, false, false)).unwrap();
        assert!(password.is_empty());
    }

    #[test]
    fn exclude_upper_keeps_uppercase_out() {
        let sets = sample_sets();
        for _ in 0..20 {
            let password = generate(&sets, &options(40, 5, 5, true, true)).unwrap();
            assert_eq!(count_in(&password, sets.upper_letters()), 0);
        }
    }

    #[test]
    fn exclude_upper_still_allows_shared_lowercase() {
        let sets = CharacterSets::new("abc", "cXY", "", "");
        for seed in 0..20 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let password = PasswordGenerator::new(sets.clone())
                .generate_with(&mut rng, &options(30, 0, 0, true, true))
                .unwrap();
            assert!(password.chars().all(|c| "abc".contains(c)));
        }
    }

    #[test]
    fn no_repeat_gives_distinct_characters() {
        let sets = sample_sets();
        for _ in 0..20 {
            let password = generate(&sets, &options(20, 5, 5, false, false)).unwrap();
            let unique: HashSet<char> = password.chars().collect();
            assert_eq!(unique.len(), 20);
        }
    }

    #[test]
    fn no_repeat_can_use_every_available_character() {
        let sets = sample_sets();
        let password = generate(&sets, &options(20, 5, 5, false, false)).unwrap();
        let mut chars: Vec<char> = password.chars().collect();
        chars.sort_unstable();
        let mut expected: Vec<char> = "abcdeABCDE01234!@#$%".chars().collect();
        expected.sort_unstable();
        assert_eq!(chars, expected);
    }

    #[test]
    fn no_repeat_with_overlapping_classes_never_gets_stuck() {
        // 'a' is both a digit and a letter: the digit slot must take '1'.
        let sets = CharacterSets::new("a", "", "a1", "");
        let generator = PasswordGenerator::new(sets);
        for seed in 0..50 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let password = generator
                .generate_with(&mut rng, &options(2, 1, 0, false, false))
                .unwrap();
            let mut chars: Vec<char> = password.chars().collect();
            chars.sort_unstable();
            assert_eq!(chars, vec!['1', 'a']);
        }
    }

    #[test]
    fn negative_length_is_rejected() {
        let err = generate(&sample_sets(), &options(-1, 0, 0, false, true)).unwrap_err();
        assert_eq!(err, GeneratorError::InvalidLength(-1));
    }

    #[test]
    fn negative_counts_are_rejected() {
        let err = generate(&sample_sets(), &options(10, -1, 0, false, true)).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidCount { .. }));

        let err = generate(&sample_sets(), &options(10, 0, -3, false, true)).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidCount { .. }));
    }

    #[test]
    fn counts_exceeding_length_are_rejected() {
        let err = generate(&sample_sets(), &options(5, 3, 3, false, true)).unwrap_err();
        assert_eq!(
            err,
            GeneratorError::CountExceedsLength { length: 5, digits: 3, symbols: 3 }
        );
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let err = generate(&sample_sets(), &options(10, i64::MAX, i64::MAX, false, true)).unwrap_err();
        assert!(matches!(err, GeneratorError::CountExceedsLength { .. }));
    }

    #[test]
    fn empty_digits_are_rejected_when_needed() {
        let sets = CharacterSets::new("abc", "ABC", "", "!@#");
        let err = generate(&sets, &options(10, 1, 0, false, true)).unwrap_err();
        assert_eq!(err, GeneratorError::EmptyCharacterClass("digits"));

        // Not needed, not an error.
        assert!(generate(&sets, &options(10, 0, 2, false, true)).is_ok());
    }

    #[test]
    fn empty_symbols_are_rejected_when_needed() {
        let sets = CharacterSets::new("abc", "ABC", "012", "");
        let err = generate(&sets, &options(10, 0, 1, false, true)).unwrap_err();
        assert_eq!(err, GeneratorError::EmptyCharacterClass("symbols"));
    }

    #[test]
    fn empty_fill_pool_is_rejected_only_with_open_slots() {
        let sets = CharacterSets::new("", "ABC", "012", "!@#");
        let err = generate(&sets, &options(10, 2, 2, true, true)).unwrap_err();
        assert_eq!(err, GeneratorError::EmptyCharacterClass("letters"));

        let password = generate(&sets, &options(4, 2, 2, true, true)).unwrap();
        assert_eq!(password.chars().count(), 4);
    }

    #[test]
    fn small_pool_without_repeats_is_rejected() {
        let sets = CharacterSets::new("abcde", "", "", "");
        let err = generate(&sets, &options(10, 0, 0, false, false)).unwrap_err();
        assert_eq!(
            err,
            GeneratorError::InsufficientUniqueCharacters {
                class: "letters".to_string(),
                required: 10,
                available: 5,
            }
        );

        // Repeats make the same request valid.
        assert!(generate(&sets, &options(10, 0, 0, false, true)).is_ok());
    }

    #[test]
    fn too_many_digits_without_repeats_is_rejected() {
        let err = generate(&sample_sets(), &options(20, 6, 0, false, false)).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::InsufficientUniqueCharacters { ref class, required: 6, available: 5 } if class == "digits"
        ));
    }

    #[test]
    fn overlapping_classes_count_once() {
        let sets = CharacterSets::new("a", "", "a", "");
        let err = generate(&sets, &options(2, 1, 0, false, false)).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::InsufficientUniqueCharacters { ref class, required: 2, available: 1 } if class == "digits+letters"
        ));
    }

    #[test]
    fn repeated_calls_differ() {
        let sets = CharacterSets::default();
        let passwords: HashSet<String> = (0..20)
            .map(|_| generate(&sets, &PasswordGenerationOptions::default()).unwrap())
            .collect();
        assert_eq!(passwords.len(), 20);
    }

    #[test]
    fn parallel_calls_are_independent() {
        let generator = PasswordGenerator::new(CharacterSets::default());
        let opts = PasswordGenerationOptions::default();

        let passwords: HashSet<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| generator.generate_password(&opts).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(passwords.len(), 8);
    }

    fn distinct_chars(start: u32, count: usize) -> String {
        (start..).filter_map(char::from_u32).take(count).collect()
    }

    #[test]
    fn large_overlapping_request_without_repeats_is_fast() {
        // Every character is both a digit and a letter.
        let shared = distinct_chars(0x4E00, 400);
        let sets = CharacterSets::new(&shared, "", &shared, "");

        let started = Instant::now();
        let password = generate(&sets, &options(400, 100, 0, false, false)).unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));

        let unique: HashSet<char> = password.chars().collect();
        assert_eq!(unique.len(), 400);
    }

    #[test]
    fn max_length_overlapping_request_completes() {
        let shared = distinct_chars(0x4E00, 5000);
        let digits = distinct_chars(0x4E00 + 2500, 3000);
        let sets = CharacterSets::new(&shared, "", &digits, "");

        let started = Instant::now();
        let password = generate(&sets, &options(4096, 1000, 0, false, false)).unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));

        assert_eq!(password.chars().count(), 4096);
        assert!(count_in(&password, sets.digits()) >= 1000);
        let unique: HashSet<char> = password.chars().collect();
        assert_eq!(unique.len(), 4096);
    }

    #[test]
    fn overlapping_digits_and_symbols_stay_unique() {
        let sets = CharacterSets::new("xyz", "", "0123", "23!@");
        let generator = PasswordGenerator::new(sets);
        for seed in 0..50 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let password = generator
                .generate_with(&mut rng, &options(9, 4, 2, false, false))
                .unwrap();
            let unique: HashSet<char> = password.chars().collect();
            assert_eq!(unique.len(), 9);
            // All four digits are needed, so symbols must come from "!@".
            assert!("0123".chars().all(|c| unique.contains(&c)));
        }
    }
}
