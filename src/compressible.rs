//! Compressible Bloom Filter: a standard filter whose bit array can be
//! folded onto a shorter prefix after insertion, in whole rows.
pub mod filter;

pub use filter::{CompressibleBloomFilter, DEFAULT_ROW_SIZE_BITS};
