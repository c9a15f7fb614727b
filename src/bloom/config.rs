use crate::bits::{BITS_PER_UNIT, MAX_BITS};
use crate::hash::{
    HashFunction, default_hash_function, derive_salts, optimal_bit_vector_size,
    optimal_num_hashes, predicted_fpr,
};
use derive_builder::Builder;

/// Smallest bit array a filter is ever given.
pub const MIN_BITS: usize = 8;

#[derive(Clone, Debug, Builder)]
#[builder(pattern = "owned")]
pub struct BloomFilterConfig {
    /// Expected number of elements
    #[builder(default = "1_000_000")]
    pub capacity: usize,

    /// Target false positive rate (0.0 to 1.0, exclusive)
    #[builder(default = "0.01")]
    pub false_positive_rate: f64,

    /// Seed the two hash salts are derived from
    #[builder(default = "0")]
    pub seed: u64,

    /// Seeded 32-bit hash primitive
    #[builder(default = "default_hash_function")]
    pub hash_function: HashFunction,
}

impl BloomFilterConfig {
    pub fn validate(&self) -> super::BloomResult<()> {
        if self.capacity == 0 {
            return Err(super::BloomError::InvalidParameters(
                "Capacity must be > 0".into(),
            ));
        }
        // written this way so NaN is rejected too
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(super::BloomError::InvalidParameters(format!(
                "FPR must be between 0 and 1, got {}",
                self.false_positive_rate
            )));
        }
        Ok(())
    }
}

/// Derived parameters calculated from BloomFilterConfig
#[derive(Debug, Clone, PartialEq)]
pub struct BloomParams {
    pub bit_vector_size: usize,
    pub num_hashes: usize,
    pub salts: [u32; 2],
    /// False positive probability the rounded `(m, k, n)` triple achieves
    /// at full capacity.
    pub predicted_fpr: f64,
}

impl BloomParams {
    /// Derives parameters with the bit count rounded up to a multiple of
    /// `alignment` bits (itself a multiple of [`BITS_PER_UNIT`]).
    pub fn derive(
        config: &BloomFilterConfig,
        alignment: usize,
    ) -> super::BloomResult<Self> {
        config.validate()?;
        if alignment == 0 || alignment % BITS_PER_UNIT != 0 {
            return Err(super::BloomError::InvalidParameters(format!(
                "Alignment must be a positive multiple of {BITS_PER_UNIT} bits, got {alignment}"
            )));
        }

        let raw = optimal_bit_vector_size(
            config.capacity,
            config.false_positive_rate,
        )
        .max(MIN_BITS as f64);
        let limit = MAX_BITS.checked_sub(alignment).ok_or_else(|| {
            super::BloomError::InvalidParameters(format!(
                "Alignment of {alignment} bits exceeds the addressable range"
            ))
        })?;
        if !raw.is_finite() || raw > limit as f64 {
            return Err(super::BloomError::InvalidParameters(format!(
                "Derived bit array of {raw} bits cannot be addressed"
            )));
        }
        let bit_vector_size = (raw as usize).div_ceil(alignment) * alignment;
        let num_hashes = optimal_num_hashes(config.capacity, bit_vector_size);

        Ok(Self {
            bit_vector_size,
            num_hashes,
            salts: derive_salts(config.seed),
            predicted_fpr: predicted_fpr(
                config.capacity,
                bit_vector_size,
                num_hashes,
            ),
        })
    }
}

impl TryFrom<&BloomFilterConfig> for BloomParams {
    type Error = super::BloomError;

    fn try_from(config: &BloomFilterConfig) -> super::BloomResult<Self> {
        Self::derive(config, BITS_PER_UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::BloomError;

    fn config(capacity: usize, fpr: f64) -> BloomFilterConfig {
        BloomFilterConfigBuilder::default()
            .capacity(capacity)
            .false_positive_rate(fpr)
            .seed(42)
            .build()
            .expect("Failed to build config")
    }

    #[test]
    fn test_standard_parameters() {
        let params = BloomParams::try_from(&config(1000, 0.01)).unwrap();
        assert_eq!(params.bit_vector_size, 9592);
        assert_eq!(params.num_hashes, 7);
        assert!((params.predicted_fpr - 0.01).abs() < 0.001);
        assert_ne!(params.salts[0], params.salts[1]);
    }

    #[test]
    fn test_tiny_filter_floors_to_minimum() {
        let params = BloomParams::try_from(&config(1, 0.5)).unwrap();
        assert_eq!(params.bit_vector_size, MIN_BITS);
        assert!(params.num_hashes >= 1);
        assert!(params.predicted_fpr > 0.0 && params.predicted_fpr < 1.0);
    }

    #[test]
    fn test_fpr_close_to_one_keeps_one_hash() {
        let params = BloomParams::try_from(&config(10_000, 0.999)).unwrap();
        assert_eq!(params.num_hashes, 1);
        assert_eq!(params.bit_vector_size % BITS_PER_UNIT, 0);
    }

    #[test]
    fn test_row_alignment() {
        let params = BloomParams::derive(&config(1000, 0.01), 64).unwrap();
        assert_eq!(params.bit_vector_size, 9600);
        assert!(BloomParams::derive(&config(1000, 0.01), 12).is_err());
        assert!(BloomParams::derive(&config(1000, 0.01), 0).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            BloomParams::try_from(&config(0, 0.01)),
            Err(BloomError::InvalidParameters(_))
        ));
        for fpr in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                BloomParams::try_from(&config(10, fpr)),
                Err(BloomError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_unaddressable_size_is_rejected() {
        let result = BloomParams::try_from(&config(usize::MAX, 1e-300));
        assert!(matches!(result, Err(BloomError::InvalidParameters(_))));
    }

    #[test]
    fn test_alignment_beyond_addressable_range_is_rejected() {
        let result = BloomParams::derive(&config(1000, 0.01), usize::MAX - 7);
        assert!(matches!(result, Err(BloomError::InvalidParameters(_))));
    }
}
