//! Deterministic seeded selection
//!
//! Derives a permutation of a mapping's universe keyed by the full seed
//! token, then truncates to the requested count. The same seed over the
//! same mapping yields the identical list on any platform: the
//! construction is pure u64 arithmetic over the token bytes, with no
//! clock, pointer, locale, or `rand` involvement.
//!
//! Construction: FNV-1a 64 of the token is the key; each universe index
//! gets a SplitMix64-mixed weight from the key; indices are sorted by
//! (weight, index). Truncating a full permutation keeps any prefix
//! stable, so a single slot can be resolved lazily without computing its
//! siblings first.

use crate::data::SeedMapping;
use crate::error::{GauntletError, Result};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

fn weight(key: u64, index: usize) -> u64 {
    splitmix64(key ^ splitmix64(index as u64 + 1))
}

fn permuted_indices(seed: &str, universe_len: usize) -> Vec<usize> {
    let key = fnv1a(seed.as_bytes());
    let mut indices: Vec<usize> = (0..universe_len).collect();
    // Index tiebreak keeps the order total even on weight collisions
    indices.sort_by_key(|&i| (weight(key, i), i));
    indices
}

/// Select the first `count` items of the seed-keyed permutation of
/// `mapping`'s universe
pub fn select(mapping: &SeedMapping, seed: &str, count: usize) -> Result<Vec<String>> {
    let universe = &mapping.universe;
    if count > universe.len() {
        return Err(GauntletError::InsufficientCatalogSize {
            requested: count,
            available: universe.len(),
        });
    }

    Ok(permuted_indices(seed, universe.len())
        .into_iter()
        .take(count)
        .map(|i| universe[i].clone())
        .collect())
}

/// Resolve the item at one position of the permutation
pub fn select_at(mapping: &SeedMapping, seed: &str, index: usize) -> Result<String> {
    let mut items = select(mapping, seed, index + 1)?;
    Ok(items.pop().unwrap())
}
