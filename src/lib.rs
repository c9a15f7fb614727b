//! Space-efficient Bloom filters with a compressible variant.
//!
//! HowTo:
//!    * Sizing: from the expected element count `n` and the target false
//!      positive rate `p` the filter derives `m = ceil(-n ln p / ln(2)^2)` bits
//!      and `k = round(m / n * ln 2)` taps per element.
//!    * Hashing: each item is hashed twice with two salts derived from the
//!      filter seed; tap `i` is `h1 + i*h2 + i^3` reduced modulo the current
//!      bit length. The cubic term keeps taps apart when `h2` is small.
//!
//! Insertion sets the `k` tap bits, a query checks that all of them are set.
//! There are no false negatives.
//!
//! Compression:
//!     * The compressible filter splits its bit array into equal rows.
//!     * `compress(pct)` removes at least `pct` percent of the active rows by
//!       OR-folding them onto the remaining ones.
//!     * Taps are reduced modulo every length the filter has had, in order,
//!       so items inserted before a fold still hit the bits they set.
//!     * `effective_fpp()` is recomputed from the real fill ratio, so the
//!       reported false positive probability after a fold stays honest.
//!
//! Obvious problems:
//!     * Folding is lossy and one-way; a compressed filter cannot grow back.
//!     * Filters are plain values; concurrent writers need an external lock.

pub mod bits;
pub mod bloom;
pub mod common;
pub mod compressible;
pub mod hash;
pub mod workload;

pub use bits::{BITS_PER_UNIT, BitArray};
pub use bloom::{
    BloomError, BloomFilter, BloomFilterConfig, BloomFilterConfigBuilder,
    BloomFilterOps, BloomFilterStats, BloomParams, BloomResult,
    BulkBloomFilterOps,
};
pub use compressible::{CompressibleBloomFilter, DEFAULT_ROW_SIZE_BITS};
pub use hash::{
    HashFunction, MAX_HASHES, default_hash_function, hash_fnv32, hash_murmur32,
    optimal_bit_vector_size, optimal_num_hashes,
};
pub use workload::{
    BenchmarkConfig, BenchmarkConfigBuilder, CompressionStep, FprRound,
    WorkloadError,
};
