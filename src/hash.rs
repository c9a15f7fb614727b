use fnv::FnvHasher;
use murmur3::murmur3_32;
use std::hash::Hasher;
use std::io::Cursor;

/// A type alias for the seeded hash primitive used by the Bloom filters.
///
/// **Parameters:**
///
/// - `item: &[u8]`
///   - A byte slice representing the item to be hashed.
/// - `seed: u32`
///   - One of the two salts derived from the filter seed.
///
/// **Returns:**
///
/// - `u32`
///   - A uniformly distributed 32-bit hash. The same `(item, seed)` pair must
///     always produce the same value.
///
/// **Usage:**
///
/// The filter evaluates the primitive exactly twice per item, once per salt,
/// and derives every tap from the two results (see [`Taps`]).
pub type HashFunction = fn(&[u8], u32) -> u32;

/// Upper bound on the number of taps per item.
pub const MAX_HASHES: usize = 32;

pub fn hash_murmur32(key: &[u8], seed: u32) -> u32 {
    let mut cursor = Cursor::new(key);
    // reading from an in-memory cursor cannot fail
    murmur3_32(&mut cursor, seed).expect("Failed to compute Murmur3 hash")
}

pub fn hash_fnv32(key: &[u8], seed: u32) -> u32 {
    let mut hasher = FnvHasher::default();
    hasher.write_u32(seed);
    hasher.write(key);
    let h = hasher.finish();
    (h ^ (h >> 32)) as u32
}

pub fn default_hash_function(key: &[u8], seed: u32) -> u32 {
    hash_murmur32(key, seed)
}

/// Expands a filter seed into the two distinct base salts.
pub fn derive_salts(seed: u64) -> [u32; 2] {
    let first = mix_seed(seed);
    let mut second = mix_seed(seed.wrapping_add(1));
    let mut offset = 2u64;
    while second == first {
        second = mix_seed(seed.wrapping_add(offset));
        offset += 1;
    }
    [first, second]
}

fn mix_seed(value: u64) -> u32 {
    let mut hasher = FnvHasher::default();
    hasher.write(&value.to_le_bytes());
    let h = hasher.finish();
    (h ^ (h >> 32)) as u32
}

/// Raw tap values for one item: `h1 + i*h2 + i^3` for `i` in `0..num_hashes`.
///
/// Values are not reduced; the caller takes them modulo its current length.
#[derive(Debug, Clone)]
pub struct Taps {
    h1: u64,
    h2: u64,
    next: u64,
    count: u64,
}

impl Taps {
    pub fn new(
        item: &[u8],
        hash_function: HashFunction,
        salts: [u32; 2],
        num_hashes: usize,
    ) -> Self {
        Self {
            h1: hash_function(item, salts[0]) as u64,
            h2: hash_function(item, salts[1]) as u64,
            next: 0,
            count: num_hashes as u64,
        }
    }
}

impl Iterator for Taps {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.count {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(
            self.h1
                .wrapping_add(i.wrapping_mul(self.h2))
                .wrapping_add(i.wrapping_mul(i).wrapping_mul(i)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.count - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Taps {}

/// Unrounded optimal bit count for `n` elements at false positive rate `fpr`.
pub fn optimal_bit_vector_size(n: usize, fpr: f64) -> f64 {
    let ln2 = std::f64::consts::LN_2;
    ((-(n as f64) * fpr.ln()) / (ln2 * ln2)).ceil()
}

pub fn optimal_num_hashes(n: usize, m: usize) -> usize {
    let k = ((m as f64 / n as f64) * std::f64::consts::LN_2).round() as usize;
    k.clamp(1, MAX_HASHES)
}

/// False positive probability achieved by `k` taps over `m` bits after `n`
/// insertions.
pub fn predicted_fpr(n: usize, m: usize, k: usize) -> f64 {
    let exponent = -(k as f64) * n as f64 / m as f64;
    (1.0 - exponent.exp()).powi(k as i32)
}
