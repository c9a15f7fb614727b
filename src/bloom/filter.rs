use super::{
    BloomError, BloomFilterConfig, BloomFilterConfigBuilder, BloomFilterOps,
    BloomFilterStats, BloomParams, BloomResult,
};
use crate::bits::BitArray;
use crate::hash::Taps;
use tracing::{debug, warn};

pub struct BloomFilter {
    config: BloomFilterConfig,
    params: BloomParams,
    bits: BitArray,
    insert_count: usize,
}

impl BloomFilter {
    /// Filter sized for `capacity` elements at `false_positive_rate`, with
    /// hash salts derived from `seed`.
    pub fn new(
        capacity: usize,
        false_positive_rate: f64,
        seed: u64,
    ) -> BloomResult<Self> {
        let config = BloomFilterConfigBuilder::default()
            .capacity(capacity)
            .false_positive_rate(false_positive_rate)
            .seed(seed)
            .build()
            .map_err(|e| BloomError::InvalidParameters(e.to_string()))?;
        Self::from_config(config)
    }

    pub fn from_config(config: BloomFilterConfig) -> BloomResult<Self> {
        let params = BloomParams::try_from(&config)?;
        Ok(Self::with_params(config, params))
    }

    pub(crate) fn with_params(
        config: BloomFilterConfig,
        params: BloomParams,
    ) -> Self {
        debug!(
            capacity = config.capacity,
            target_fpr = config.false_positive_rate,
            bits = params.bit_vector_size,
            hashes = params.num_hashes,
            predicted_fpr = params.predicted_fpr,
            "bloom filter parameters derived"
        );
        let bits = BitArray::new(params.bit_vector_size);
        Self {
            config,
            params,
            bits,
            insert_count: 0,
        }
    }

    pub fn config(&self) -> &BloomFilterConfig {
        &self.config
    }

    pub fn params(&self) -> &BloomParams {
        &self.params
    }

    /// False positive probability guaranteed at capacity by the rounded
    /// parameters, as opposed to the configured target.
    pub fn predicted_fpr(&self) -> f64 {
        self.params.predicted_fpr
    }

    pub fn bits(&self) -> &BitArray {
        &self.bits
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_bytes()
    }

    /// Unreduced tap values for `item`.
    pub(crate) fn taps(&self, item: &[u8]) -> Taps {
        Taps::new(
            item,
            self.config.hash_function,
            self.params.salts,
            self.params.num_hashes,
        )
    }

    pub(crate) fn bits_mut(&mut self) -> &mut BitArray {
        &mut self.bits
    }

    pub(crate) fn record_insert(&mut self) {
        self.insert_count += 1;
        if self.insert_count == self.config.capacity.saturating_add(1) {
            warn!(
                capacity = self.config.capacity,
                "bloom filter capacity exceeded, false positive rate will exceed its guarantee"
            );
        }
    }

    /// ORs `other` into this filter. Both must share size, hash count and
    /// salts.
    pub fn union_with(&mut self, other: &BloomFilter) -> BloomResult<()> {
        self.check_compatible(other)?;
        self.bits.or_assign(&other.bits);
        self.insert_count += other.insert_count;
        Ok(())
    }

    /// ANDs `other` into this filter. The insert count becomes the smaller
    /// of the two.
    pub fn intersect_with(&mut self, other: &BloomFilter) -> BloomResult<()> {
        self.check_compatible(other)?;
        self.bits.and_assign(&other.bits);
        self.insert_count = self.insert_count.min(other.insert_count);
        Ok(())
    }

    /// Number of bits set in both filters.
    pub fn overlap_with(&self, other: &BloomFilter) -> BloomResult<usize> {
        self.check_compatible(other)?;
        Ok(self.bits.and_count(&other.bits).unwrap_or(0))
    }

    fn check_compatible(&self, other: &BloomFilter) -> BloomResult<()> {
        if self.bits.len() != other.bits.len()
            || self.params.num_hashes != other.params.num_hashes
            || self.params.salts != other.params.salts
            || !std::ptr::fn_addr_eq(
                self.config.hash_function,
                other.config.hash_function,
            )
        {
            return Err(BloomError::IncompatibleFilters {
                left_bits: self.bits.len(),
                left_hashes: self.params.num_hashes,
                right_bits: other.bits.len(),
                right_hashes: other.params.num_hashes,
            });
        }
        Ok(())
    }
}

impl BloomFilterOps for BloomFilter {
    fn insert(&mut self, item: &[u8]) {
        let size = self.bits.len() as u64;
        for tap in self.taps(item) {
            self.bits.set((tap % size) as usize);
        }
        self.record_insert();
    }

    fn contains(&self, item: &[u8]) -> bool {
        let size = self.bits.len() as u64;
        self.taps(item)
            .all(|tap| self.bits.test((tap % size) as usize))
    }

    fn clear(&mut self) {
        self.bits.clear();
        self.insert_count = 0;
    }
}

impl BloomFilterStats for BloomFilter {
    fn capacity(&self) -> usize {
        self.config.capacity
    }

    fn false_positive_rate(&self) -> f64 {
        self.config.false_positive_rate
    }

    fn insert_count(&self) -> usize {
        self.insert_count
    }

    fn size(&self) -> usize {
        self.bits.len()
    }

    fn hash_count(&self) -> usize {
        self.params.num_hashes
    }

    fn set_bit_count(&self) -> usize {
        self.bits.count_ones()
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ capacity: {}, bits: {}, num_hashes: {}, false_positive_rate: {}, insert_count: {} }}",
            self.config.capacity,
            self.bits.len(),
            self.params.num_hashes,
            self.config.false_positive_rate,
            self.insert_count
        )
    }
}
