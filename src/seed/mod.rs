//! Seed tokens and deterministic selection

mod codec;
mod selector;

pub use codec::{generate_mapping_code, generate_seed, parse_seed, ParsedSeed};
pub use selector::{select, select_at};
