// ============================================================
// Layer 4 — Train/Dev/Test Partitioner
// ============================================================
// Splits a shard into three contiguous, order-preserving
// ranges sized by integer weights.
//
//   single = len / (train + dev + test)        (integer division)
//   train  = [0,                    train * single)
//   dev    = [train * single,       (train + dev) * single)
//   test   = [(train + dev) * single, len)
//
// Example with weights 98/1/1 and 1050 rows:
//   single = 10 → train 980, dev 10, test 60
//   (the 50-row division remainder always lands in test)
//
// No shuffling: the generator already produces examples in
// random order, and keeping the split positional means a
// shard always partitions the same way.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Relative sizes of the three partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionWeights {
    pub train: usize,
    pub dev:   usize,
    pub test:  usize,
}

impl PartitionWeights {
    pub fn new(train: usize, dev: usize, test: usize) -> Self {
        Self { train, dev, test }
    }

    /// End of the train range and end of the dev range for `len` items.
    pub fn bounds(&self, len: usize) -> Result<(usize, usize)> {
        let total = self.train + self.dev + self.test;
        if total == 0 {
            bail!("Partition weights sum to zero");
        }
        let single = len / total;
        let train_end = self.train * single;
        let dev_end   = train_end + self.dev * single;
        Ok((train_end, dev_end))
    }
}

impl Default for PartitionWeights {
    fn default() -> Self {
        Self::new(3, 1, 1)
    }
}

/// Borrowed view of the three partitions
#[derive(Debug)]
pub struct Partition<'a, T> {
    pub train: &'a [T],
    pub dev:   &'a [T],
    pub test:  &'a [T],
}

/// Slice `items` into train/dev/test without copying.
pub fn partition<T>(items: &[T], weights: PartitionWeights) -> Result<Partition<'_, T>> {
    let (train_end, dev_end) = weights.bounds(items.len())?;
    Ok(Partition {
        train: &items[..train_end],
        dev:   &items[train_end..dev_end],
        test:  &items[dev_end..],
    })
}

/// Owned variant: consumes `items` and returns (train, dev, test).
pub fn partition_vec<T>(
    mut items: Vec<T>,
    weights:   PartitionWeights,
) -> Result<(Vec<T>, Vec<T>, Vec<T>)> {
    let (train_end, dev_end) = weights.bounds(items.len())?;

    // split_off(n) keeps [..n] in place and returns [n..]
    let test = items.split_off(dev_end);
    let dev  = items.split_off(train_end);

    tracing::debug!(
        "Partitioned {} train / {} dev / {} test",
        items.len(),
        dev.len(),
        test.len()
    );

    Ok((items, dev, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_sum_to_input_with_remainder_in_test() {
        let items: Vec<usize> = (0..1050).collect();
        let p = partition(&items, PartitionWeights::new(98, 1, 1)).unwrap();
        assert_eq!(p.train.len(), 980);
        assert_eq!(p.dev.len(),   10);
        assert_eq!(p.test.len(),  60);
        assert_eq!(p.train.len() + p.dev.len() + p.test.len(), items.len());
    }

    #[test]
    fn test_partitions_are_contiguous_and_ordered() {
        let items: Vec<usize> = (0..23).collect();
        let p = partition(&items, PartitionWeights::default()).unwrap();

        // single = 23 / 5 = 4 → 12 / 4 / 7
        assert_eq!(p.train, &items[..12]);
        assert_eq!(p.dev,   &items[12..16]);
        assert_eq!(p.test,  &items[16..]);

        let rejoined: Vec<usize> = p.train.iter().chain(p.dev).chain(p.test).copied().collect();
        assert_eq!(rejoined, items);
    }

    #[test]
    fn test_owned_matches_borrowed() {
        let items: Vec<usize> = (0..101).collect();
        let weights = PartitionWeights::new(7, 2, 1);
        let p = partition(&items, weights).unwrap();
        let (train, dev, test) = partition_vec(items.clone(), weights).unwrap();
        assert_eq!(train, p.train);
        assert_eq!(dev,   p.dev);
        assert_eq!(test,  p.test);
    }

    #[test]
    fn test_fewer_items_than_weight_goes_to_test() {
        let items = vec![1, 2, 3];
        let p = partition(&items, PartitionWeights::new(98, 1, 1)).unwrap();
        assert!(p.train.is_empty());
        assert!(p.dev.is_empty());
        assert_eq!(p.test, &[1, 2, 3]);
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<u8> = Vec::new();
        let (train, dev, test) = partition_vec(items, PartitionWeights::default()).unwrap();
        assert!(train.is_empty() && dev.is_empty() && test.is_empty());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let items = vec![1, 2, 3];
        assert!(partition(&items, PartitionWeights::new(0, 0, 0)).is_err());
    }
}
