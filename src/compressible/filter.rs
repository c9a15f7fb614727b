use crate::bloom::{
    BloomError, BloomFilter, BloomFilterConfig, BloomFilterConfigBuilder,
    BloomFilterOps, BloomFilterStats, BloomParams, BloomResult,
};
use tracing::{debug, warn};

/// Default row width: one 64-bit machine word.
pub const DEFAULT_ROW_SIZE_BITS: usize = 64;

pub struct CompressibleBloomFilter {
    base: BloomFilter,
    row_size_bits: usize,
    row_count: usize,
    // Effective lengths in bits, oldest first. Taps are reduced modulo each
    // entry in turn so that bits set before a fold are found after it.
    size_history: Vec<usize>,
}

impl CompressibleBloomFilter {
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
        Self::with_row_size(config, DEFAULT_ROW_SIZE_BITS)
    }

    pub fn from_config(config: BloomFilterConfig) -> BloomResult<Self> {
        Self::with_row_size(config, DEFAULT_ROW_SIZE_BITS)
    }

    /// `row_size_bits` must be a positive multiple of
    /// [`BITS_PER_UNIT`](crate::bits::BITS_PER_UNIT); the provisioned bit
    /// array is rounded up to a whole number of rows.
    pub fn with_row_size(
        config: BloomFilterConfig,
        row_size_bits: usize,
    ) -> BloomResult<Self> {
        let params = BloomParams::derive(&config, row_size_bits)?;
        let row_count = params.bit_vector_size / row_size_bits;
        let base = BloomFilter::with_params(config, params);
        let size_history = vec![base.size()];

        Ok(Self {
            base,
            row_size_bits,
            row_count,
            size_history,
        })
    }

    pub fn row_size_bits(&self) -> usize {
        self.row_size_bits
    }

    /// Rows provisioned at construction.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn active_row_count(&self) -> usize {
        self.base.size() / self.row_size_bits
    }

    pub fn is_fully_compressed(&self) -> bool {
        self.active_row_count() == 1
    }

    pub fn size_history(&self) -> &[usize] {
        &self.size_history
    }

    pub fn params(&self) -> &BloomParams {
        self.base.params()
    }

    pub fn predicted_fpr(&self) -> f64 {
        self.base.predicted_fpr()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.base.as_bytes()
    }

    /// Shrinks the filter by at least `target_shrink_percentage` percent of
    /// its current size, rounded up to whole rows.
    ///
    /// Returns `false` and leaves the filter untouched when the percentage is
    /// outside `(0, 100]`, the filter is down to one row, or the shrink would
    /// leave no rows at all.
    pub fn compress(&mut self, target_shrink_percentage: f64) -> bool {
        if !(target_shrink_percentage > 0.0 && target_shrink_percentage <= 100.0)
        {
            warn!(
                target_shrink_percentage,
                "compression percentage must be in (0, 100]"
            );
            return false;
        }

        let active = self.active_row_count();
        if active <= 1 {
            return false;
        }

        let removed =
            (active as f64 * target_shrink_percentage / 100.0).ceil() as usize;
        if removed == 0 || removed >= active {
            return false;
        }

        let new_active = active - removed;
        let new_len = new_active * self.row_size_bits;
        let collisions = self.base.bits_mut().fold(new_len);
        self.size_history.push(new_len);

        debug!(
            from_rows = active,
            to_rows = new_active,
            size_bits = new_len,
            collisions,
            effective_fpp = self.effective_fpp(),
            "bloom filter compressed"
        );
        true
    }

    fn bit_index(&self, tap: u64) -> usize {
        self.size_history
            .iter()
            .fold(tap, |index, &len| index % len as u64) as usize
    }
}

impl BloomFilterOps for CompressibleBloomFilter {
    fn insert(&mut self, item: &[u8]) {
        for tap in self.base.taps(item) {
            let index = self.bit_index(tap);
            self.base.bits_mut().set(index);
        }
        self.base.record_insert();
    }

    fn contains(&self, item: &[u8]) -> bool {
        self.base
            .taps(item)
            .all(|tap| self.base.bits().test(self.bit_index(tap)))
    }

    /// Clears every bit. The filter keeps its current, possibly compressed,
    /// size.
    fn clear(&mut self) {
        self.base.clear();
    }
}

impl BloomFilterStats for CompressibleBloomFilter {
    fn capacity(&self) -> usize {
        self.base.capacity()
    }

    fn false_positive_rate(&self) -> f64 {
        self.base.false_positive_rate()
    }

    fn insert_count(&self) -> usize {
        self.base.insert_count()
    }

    fn size(&self) -> usize {
        self.base.size()
    }

    fn hash_count(&self) -> usize {
        self.base.hash_count()
    }

    fn set_bit_count(&self) -> usize {
        self.base.set_bit_count()
    }
}

impl std::fmt::Debug for CompressibleBloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CompressibleBloomFilter {{ capacity: {}, row_size_bits: {}, rows: {}/{}, num_hashes: {}, insert_count: {} }}",
            self.capacity(),
            self.row_size_bits,
            self.active_row_count(),
            self.row_count,
            self.hash_count(),
            self.insert_count()
        )
    }
}
