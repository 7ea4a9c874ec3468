//! Seedable random source used for weight initialisation and mutation.

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

/// Create an RNG from an optional seed, falling back to OS entropy.
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha12Rng {
    match seed {
        Some(seed) => create_rng(seed),
        None => ChaCha12Rng::from_os_rng(),
    }
}
