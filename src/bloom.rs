//! Standard Bloom Filter implementation
pub mod config;
pub mod error;
pub mod filter;
pub mod traits;

pub use config::{BloomFilterConfig, BloomFilterConfigBuilder, BloomParams};
pub use error::{BloomError, BloomResult};
pub use filter::BloomFilter;
pub use traits::{BloomFilterOps, BloomFilterStats, BulkBloomFilterOps};
