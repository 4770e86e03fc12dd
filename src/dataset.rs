//! Deterministic workload inputs.
//!
//! Inputs are generated before any measurement window opens. Random data is
//! produced in fixed-size chunks, each with its own RNG seeded from the
//! master seed and the chunk index, so output is identical no matter how
//! rayon schedules the chunks.

use rand::distributions::Alphanumeric;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Values generated per RNG stream.
const CHUNK: usize = 4096;

fn per_chunk_seed(master_seed: u64, index: usize) -> u64 {
    master_seed
        .wrapping_add(index as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

fn chunked<T, F>(count: usize, seed: u64, generate: F) -> Vec<T>
where
    T: Send,
    F: Fn(&mut ChaCha8Rng) -> T + Sync,
{
    let chunks = count.div_ceil(CHUNK);
    let parts: Vec<Vec<T>> = (0..chunks)
        .into_par_iter()
        .map(|c| {
            let mut rng = ChaCha8Rng::seed_from_u64(per_chunk_seed(seed, c));
            let len = CHUNK.min(count - c * CHUNK);
            (0..len).map(|_| generate(&mut rng)).collect()
        })
        .collect();
    parts.into_iter().flatten().collect()
}

/// `0, 1, ..., n - 1`.
pub fn sequence(n: usize) -> Vec<u64> {
    (0..n as u64).collect()
}

/// `count` uniform values in `0..bound`.
pub fn random_values(count: usize, bound: u64, seed: u64) -> Vec<u64> {
    let bound = bound.max(1);
    chunked(count, seed, |rng| rng.gen_range(0..bound))
}

/// `count` alphanumeric tokens of `len` characters each.
pub fn tokens(count: usize, len: usize, seed: u64) -> Vec<String> {
    chunked(count, seed, |rng| {
        (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
    })
}
