//! Seed token grammar: `MAPID-SUFFIX`
//!
//! The mapping code names a frozen universe; the suffix keys the
//! permutation over it. Suffixes only need session uniqueness, not
//! cryptographic strength, so a short random alphanumeric draw is enough.

use rand::seq::IndexedRandom;

use crate::error::{GauntletError, Result};

/// Alphabet for generated codes and suffixes. Omits 0/O/1/l/I so tokens
/// survive being read aloud or hand-copied between installations.
const TOKEN_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz";

/// Generated code/suffix length
const TOKEN_LEN: usize = 5;

/// Maximum accepted length per seed part when parsing
const MAX_PART_LEN: usize = 16;

/// A parsed seed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSeed {
    /// Mapping code (the part before the dash)
    pub mapping_code: String,
    /// Permutation suffix (the part after the dash)
    pub suffix: String,
}

fn random_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| *TOKEN_ALPHABET.choose(&mut rng).unwrap() as char)
        .collect()
}

/// Generate a fresh mapping code (uppercased so codes are visually
/// distinct from suffixes)
pub fn generate_mapping_code() -> String {
    random_token().to_ascii_uppercase()
}

/// Generate a seed token over an existing mapping code
pub fn generate_seed(mapping_code: &str) -> String {
    format!("{}-{}", mapping_code, random_token())
}

fn valid_part(part: &str) -> bool {
    !part.is_empty()
        && part.len() <= MAX_PART_LEN
        && part.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Parse a seed token into its mapping code and suffix
pub fn parse_seed(token: &str) -> Result<ParsedSeed> {
    let invalid = || GauntletError::InvalidSeedFormat {
        token: token.to_string(),
    };

    let (code, suffix) = token.split_once('-').ok_or_else(invalid)?;
    if !valid_part(code) || !valid_part(suffix) {
        return Err(invalid());
    }

    Ok(ParsedSeed {
        mapping_code: code.to_string(),
        suffix: suffix.to_string(),
    })
}
