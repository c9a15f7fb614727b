mod common;

use bloomfold::{
    BloomError, BloomFilter, BloomFilterConfigBuilder, BloomFilterOps,
    BloomFilterStats, BulkBloomFilterOps, hash_fnv32,
};
use common::{generate_absent_items, generate_test_items};
use rand::{Rng, SeedableRng, rngs::StdRng};

// Helper function to create a basic filter for testing
fn create_test_filter(capacity: usize, fpr: f64) -> BloomFilter {
    BloomFilter::new(capacity, fpr, 42).expect("Failed to create test filter")
}

#[cfg(test)]
mod basic_operations_tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut filter = create_test_filter(1000, 0.01);

        let item = b"hello_world";
        filter.insert(item);
        assert!(filter.contains(item), "Item should be found after insertion");
        assert_eq!(filter.insert_count(), 1);
    }

    #[test]
    fn test_empty_filter_contains_nothing() {
        let filter = create_test_filter(1000, 0.01);
        for item in generate_test_items(100) {
            assert!(!filter.contains(&item));
        }
        assert_eq!(filter.set_bit_count(), 0);
        assert_eq!(filter.effective_fpp(), 0.0);
    }

    #[test]
    fn test_duplicate_insert_is_idempotent() {
        let mut filter = create_test_filter(1000, 0.01);
        filter.insert(b"repeat");
        let bits_after_first = filter.as_bytes().to_vec();
        filter.insert(b"repeat");

        assert_eq!(filter.as_bytes(), bits_after_first.as_slice());
        assert_eq!(filter.insert_count(), 2, "Insert count is advisory");
    }

    #[test]
    fn test_empty_item() {
        let mut filter = create_test_filter(100, 0.01);
        filter.insert(b"");
        assert!(filter.contains(b""));
    }

    #[test]
    fn test_clear() {
        let mut filter = create_test_filter(1000, 0.01);
        let items = generate_test_items(50);
        for item in &items {
            filter.insert(item);
        }
        filter.clear();

        assert_eq!(filter.set_bit_count(), 0);
        assert_eq!(filter.insert_count(), 0);
        assert_eq!(filter.size(), filter.params().bit_vector_size);
    }

    #[test]
    fn test_size_and_hash_count() {
        let filter = create_test_filter(1000, 0.01);
        assert_eq!(filter.size(), 9592);
        assert_eq!(filter.hash_count(), 7);
        assert_eq!(filter.capacity(), 1000);
        assert_eq!(filter.false_positive_rate(), 0.01);
        assert!((filter.predicted_fpr() - 0.01).abs() < 0.001);
    }
}

#[cfg(test)]
mod correctness_tests {
    use super::*;

    #[test]
    fn test_no_false_negatives_randomized() {
        let mut rng = StdRng::seed_from_u64(7);
        let items: Vec<Vec<u8>> = (0..20_000)
            .map(|_| {
                let len = rng.random_range(1..48);
                (0..len).map(|_| rng.random::<u8>()).collect()
            })
            .collect();

        let mut filter = create_test_filter(items.len(), 0.001);
        for item in &items {
            filter.insert(item);
        }
        for item in &items {
            assert!(filter.contains(item), "False negative for {:?}", item);
        }
    }

    #[test]
    fn test_false_positive_rate_scenario() {
        let mut filter = create_test_filter(1000, 0.01);
        let known = generate_test_items(1000);
        for item in &known {
            filter.insert(item);
        }
        for item in &known {
            assert!(filter.contains(item));
        }

        let absent = generate_absent_items(10_000);
        let false_positives =
            absent.iter().filter(|item| filter.contains(item)).count();
        let observed = false_positives as f64 / absent.len() as f64;

        assert!(
            (0.001..=0.1).contains(&observed),
            "Observed FPR {observed} is not within an order of magnitude of 0.01"
        );
    }

    #[test]
    fn test_determinism() {
        let items = generate_test_items(500);
        let mut a = create_test_filter(1000, 0.01);
        let mut b = create_test_filter(1000, 0.01);
        for item in &items {
            a.insert(item);
            b.insert(item);
        }
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_different_seeds_give_different_layouts() {
        let items = generate_test_items(500);
        let mut a = BloomFilter::new(1000, 0.01, 1).unwrap();
        let mut b = BloomFilter::new(1000, 0.01, 2).unwrap();
        for item in &items {
            a.insert(item);
            b.insert(item);
        }
        assert_eq!(a.size(), b.size());
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_monotonic_fill() {
        let mut filter = create_test_filter(1000, 0.01);
        let mut previous = 0;
        for item in generate_test_items(1000) {
            filter.insert(&item);
            let current = filter.set_bit_count();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_effective_fpp_matches_fill_ratio() {
        let mut filter = create_test_filter(1000, 0.01);
        for item in generate_test_items(700) {
            filter.insert(&item);
        }
        let ratio = filter.set_bit_count() as f64 / filter.size() as f64;
        let expected = ratio.powi(filter.hash_count() as i32);

        assert!((filter.effective_fpp() - expected).abs() < 1e-12);
        assert!(filter.effective_fpp() > 0.0 && filter.effective_fpp() < 1.0);
    }

    #[test]
    fn test_alternative_hash_function() {
        let config = BloomFilterConfigBuilder::default()
            .capacity(1000)
            .false_positive_rate(0.01)
            .seed(3)
            .hash_function(hash_fnv32)
            .build()
            .expect("Failed to build config");
        let mut filter = BloomFilter::from_config(config).unwrap();
        let items = generate_test_items(1000);
        for item in &items {
            filter.insert(item);
        }
        assert_eq!(filter.contains_all(&items), None);
    }
}

#[cfg(test)]
mod edge_case_tests {
    use super::*;

    #[test]
    fn test_tiny_capacity_floors_to_one_unit() {
        let mut filter = BloomFilter::new(1, 0.5, 0).unwrap();
        assert_eq!(filter.size(), 8);
        assert!(filter.hash_count() >= 1);

        filter.insert(b"only");
        assert!(filter.contains(b"only"));
        let fpp = filter.effective_fpp();
        assert!(fpp > 0.0 && fpp <= 1.0);
    }

    #[test]
    fn test_overfilled_tiny_filter_still_has_no_false_negatives() {
        let mut filter = BloomFilter::new(1, 0.5, 0).unwrap();
        let items = generate_test_items(100);
        for item in &items {
            filter.insert(item);
        }
        assert!(filter.is_saturated());
        assert_eq!(filter.contains_all(&items), None);
    }

    #[test]
    fn test_saturation_signal() {
        let mut filter = create_test_filter(10, 0.01);
        let items = generate_test_items(10);
        for item in &items[..9] {
            filter.insert(item);
        }
        assert!(!filter.is_saturated());
        filter.insert(&items[9]);
        assert!(filter.is_saturated());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            BloomFilter::new(0, 0.01, 0),
            Err(BloomError::InvalidParameters(_))
        ));
        assert!(matches!(
            BloomFilter::new(10, 0.0, 0),
            Err(BloomError::InvalidParameters(_))
        ));
        assert!(matches!(
            BloomFilter::new(10, 1.0, 0),
            Err(BloomError::InvalidParameters(_))
        ));
    }
}

#[cfg(test)]
mod bulk_operations_tests {
    use super::*;

    #[test]
    fn test_contains_all_returns_first_missing() {
        let mut filter = create_test_filter(1000, 0.001);
        let items = generate_test_items(10);
        for item in &items {
            filter.insert(item);
        }
        assert_eq!(filter.contains_all(&items), None);

        let probe: Vec<&[u8]> = vec![
            items[0].as_slice(),
            &b"definitely_not_here_0"[..],
            items[1].as_slice(),
        ];
        // a false positive here would make the probe useless, not wrong
        if !filter.contains(b"definitely_not_here_0") {
            assert_eq!(
                filter.contains_all(probe),
                Some(&b"definitely_not_here_0"[..])
            );
        }
    }

    #[test]
    fn test_contains_none() {
        let mut filter = create_test_filter(1000, 0.001);
        filter.insert(b"present");

        assert_eq!(
            filter.contains_none(["absent_a", "present", "absent_b"]),
            Some("present")
        );
        let absent = generate_absent_items(5);
        if absent.iter().all(|item| !filter.contains(item)) {
            assert_eq!(filter.contains_none(&absent), None);
        }
    }

    #[test]
    fn test_insert_and_contains_bulk() {
        let mut filter = create_test_filter(1000, 0.01);
        let items = generate_test_items(20);
        let refs: Vec<&[u8]> = items.iter().map(|i| i.as_slice()).collect();

        filter.insert_bulk(&refs);
        assert_eq!(filter.insert_count(), 20);
        assert!(filter.contains_bulk(&refs).into_iter().all(|found| found));
    }
}

#[cfg(test)]
mod set_operations_tests {
    use super::*;

    #[test]
    fn test_union() {
        let mut a = create_test_filter(1000, 0.01);
        let mut b = create_test_filter(1000, 0.01);
        let left = generate_test_items(100);
        let right = generate_absent_items(100);
        for item in &left {
            a.insert(item);
        }
        for item in &right {
            b.insert(item);
        }

        a.union_with(&b).expect("Filters should be compatible");
        assert_eq!(a.contains_all(left.iter().chain(right.iter())), None);
        assert_eq!(a.insert_count(), 200);
    }

    #[test]
    fn test_intersection_keeps_shared_items() {
        let mut a = create_test_filter(1000, 0.01);
        let mut b = create_test_filter(1000, 0.01);
        let shared = generate_test_items(50);
        for item in &shared {
            a.insert(item);
            b.insert(item);
        }
        for item in generate_absent_items(50) {
            a.insert(&item);
        }

        let overlap = a.overlap_with(&b).unwrap();
        assert_eq!(overlap, b.set_bit_count());

        a.intersect_with(&b).unwrap();
        assert_eq!(a.contains_all(&shared), None);
        assert_eq!(a.set_bit_count(), overlap);
    }

    #[test]
    fn test_incompatible_filters() {
        let mut a = create_test_filter(1000, 0.01);
        let b = create_test_filter(2000, 0.01);
        let c = BloomFilter::new(1000, 0.01, 7).unwrap();

        assert!(matches!(
            a.union_with(&b),
            Err(BloomError::IncompatibleFilters { .. })
        ));
        assert!(matches!(
            a.intersect_with(&c),
            Err(BloomError::IncompatibleFilters { .. })
        ));
        assert!(a.overlap_with(&c).is_err());
    }

    #[test]
    fn test_mixed_hash_functions_are_incompatible() {
        let mut murmur = BloomFilter::new(1000, 0.01, 3).unwrap();
        let config = BloomFilterConfigBuilder::default()
            .capacity(1000)
            .false_positive_rate(0.01)
            .seed(3)
            .hash_function(hash_fnv32)
            .build()
            .unwrap();
        let mut fnv = BloomFilter::from_config(config).unwrap();
        let items = generate_test_items(100);
        for item in &items {
            fnv.insert(item);
        }
        assert_eq!(murmur.size(), fnv.size());
        assert_eq!(murmur.params().salts, fnv.params().salts);

        assert!(matches!(
            murmur.union_with(&fnv),
            Err(BloomError::IncompatibleFilters { .. })
        ));
        assert!(murmur.intersect_with(&fnv).is_err());
        assert!(murmur.overlap_with(&fnv).is_err());
        assert_eq!(murmur.set_bit_count(), 0);
    }
}
