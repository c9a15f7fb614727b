/// Core membership operations shared by every filter flavour.
pub trait BloomFilterOps {
    fn insert(&mut self, item: &[u8]);
    fn contains(&self, item: &[u8]) -> bool;
    fn clear(&mut self);

    /// Returns the first item that is not in the filter, or `None` when all
    /// of them are.
    fn contains_all<I, T>(&self, items: I) -> Option<T>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        items.into_iter().find(|item| !self.contains(item.as_ref()))
    }

    /// Returns the first item the filter reports as present, or `None` when
    /// none of them are.
    fn contains_none<I, T>(&self, items: I) -> Option<T>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        items.into_iter().find(|item| self.contains(item.as_ref()))
    }
}

pub trait BloomFilterStats {
    /// Provisioned number of elements.
    fn capacity(&self) -> usize;
    /// Target false positive rate the filter was configured with.
    fn false_positive_rate(&self) -> f64;
    /// Advisory count of insert calls.
    fn insert_count(&self) -> usize;
    /// Current effective length in bits.
    fn size(&self) -> usize;
    fn hash_count(&self) -> usize;
    fn set_bit_count(&self) -> usize;

    /// `(set_bits / size) ^ hash_count`, from the current fill ratio.
    fn effective_fpp(&self) -> f64 {
        let size = self.size();
        if size == 0 {
            return 0.0;
        }
        (self.set_bit_count() as f64 / size as f64).powi(self.hash_count() as i32)
    }

    fn is_saturated(&self) -> bool {
        self.insert_count() >= self.capacity()
    }
}

pub trait BulkBloomFilterOps {
    fn insert_bulk(&mut self, items: &[&[u8]]);
    fn contains_bulk(&self, items: &[&[u8]]) -> Vec<bool>;
}

impl<F: BloomFilterOps> BulkBloomFilterOps for F {
    fn insert_bulk(&mut self, items: &[&[u8]]) {
        for item in items {
            self.insert(item);
        }
    }

    fn contains_bulk(&self, items: &[&[u8]]) -> Vec<bool> {
        items.iter().map(|item| self.contains(item)).collect()
    }
}
