//! Packed bit storage shared by both filter flavours.
use bitvec::{bitvec, order::Lsb0, slice::BitSlice, vec::BitVec};

/// Bit width of one storage unit. Every array length is a multiple of it.
pub const BITS_PER_UNIT: usize = u8::BITS as usize;

/// Largest bit length the backing buffer can address.
pub const MAX_BITS: usize = BitSlice::<u8, Lsb0>::MAX_BITS;

#[derive(Clone, PartialEq, Eq)]
pub struct BitArray {
    bits: BitVec<u8, Lsb0>,
}

impl BitArray {
    /// Zeroed array of `len` bits. `len` should be a multiple of
    /// [`BITS_PER_UNIT`].
    pub fn new(len: usize) -> Self {
        debug_assert_eq!(len % BITS_PER_UNIT, 0);
        Self {
            bits: bitvec![u8, Lsb0; 0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn set(&mut self, index: usize) {
        self.bits.set(index, true);
    }

    pub fn test(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// ORs `other` into `self`. Returns false when the lengths differ.
    pub fn or_assign(&mut self, other: &BitArray) -> bool {
        if self.len() != other.len() {
            return false;
        }
        for (dst, src) in self
            .bits
            .as_raw_mut_slice()
            .iter_mut()
            .zip(other.bits.as_raw_slice())
        {
            *dst |= *src;
        }
        true
    }

    /// ANDs `other` into `self`. Returns false when the lengths differ.
    pub fn and_assign(&mut self, other: &BitArray) -> bool {
        if self.len() != other.len() {
            return false;
        }
        for (dst, src) in self
            .bits
            .as_raw_mut_slice()
            .iter_mut()
            .zip(other.bits.as_raw_slice())
        {
            *dst &= *src;
        }
        true
    }

    /// Number of bits set in both arrays, `None` when the lengths differ.
    pub fn and_count(&self, other: &BitArray) -> Option<usize> {
        if self.len() != other.len() {
            return None;
        }
        Some(
            self.bits
                .as_raw_slice()
                .iter()
                .zip(other.bits.as_raw_slice())
                .map(|(a, b)| (a & b).count_ones() as usize)
                .sum(),
        )
    }

    /// Folds every bit at `i >= new_len` onto `i % new_len` and truncates the
    /// array to `new_len` bits. Returns how many folded bits landed on bits
    /// that were already set.
    pub fn fold(&mut self, new_len: usize) -> usize {
        debug_assert!(new_len > 0 && new_len <= self.len());
        debug_assert_eq!(new_len % BITS_PER_UNIT, 0);

        let mut folded = BitArray::new(new_len);
        for offset in self.bits[new_len..].iter_ones() {
            folded.set(offset % new_len);
        }

        // dead bits past the new length must stay zero for the raw word ops
        self.bits[new_len..].fill(false);
        self.bits.truncate(new_len);
        self.bits.shrink_to_fit();

        let overlap = self.and_count(&folded).unwrap_or(0);
        self.or_assign(&folded);
        overlap
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }
}

impl std::fmt::Debug for BitArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitArray {{ len: {}, ones: {} }}",
            self.len(),
            self.count_ones()
        )
    }
}
