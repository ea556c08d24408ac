use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

/// Uniform pick from a non-empty static table.
pub(crate) fn pick<T: Copy>(rng: &mut dyn RngCore, table: &[T]) -> T {
    table[rng.random_range(0..table.len())]
}

/// `count` distinct entries from `table`, at most `table.len()`.
pub(crate) fn pick_many<T: Copy>(rng: &mut dyn RngCore, table: &[T], count: usize) -> Vec<T> {
    table.choose_multiple(rng, count).copied().collect()
}

pub(crate) fn uniform(rng: &mut dyn RngCore, low: f64, high: f64) -> f64 {
    rng.random_range(low..=high)
}

pub(crate) fn between(rng: &mut dyn RngCore, low: u32, high: u32) -> u32 {
    rng.random_range(low..=high)
}

pub(crate) fn chance(rng: &mut dyn RngCore, probability: f64) -> bool {
    rng.random_bool(probability)
}

/// Hex SHA-256 of `input`, truncated to `len` characters.
pub(crate) fn short_hash(input: &str, len: usize) -> String {
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest[..len.min(digest.len())].to_string()
}

/// Six random bytes formatted as a colon-separated MAC address.
pub(crate) fn mac_address(rng: &mut dyn RngCore) -> String {
    let mut bytes = [0u8; 6];
    rng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
