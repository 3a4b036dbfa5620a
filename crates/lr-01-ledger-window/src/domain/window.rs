//! # Ledger Bucket Window
//!
//! Circular buffer over contiguous ledger sequences. Not synchronized; the
//! owning store wraps it in a lock.

use super::bucket::LedgerBucket;
use super::errors::WindowError;

/// The last `capacity` ledgers' buckets, oldest first.
#[derive(Debug, Clone)]
pub struct LedgerBucketWindow<T> {
    /// Grows by `push` until full, then slots are overwritten in place.
    buckets: Vec<LedgerBucket<T>>,
    /// Slot holding the oldest bucket. Always 0 until the window is full.
    start: usize,
    capacity: usize,
}

impl<T> LedgerBucketWindow<T> {
    /// Create an empty window retaining `retention_window` ledgers.
    pub fn new(retention_window: u32) -> Result<Self, WindowError> {
        if retention_window == 0 {
            return Err(WindowError::InvalidCapacity);
        }
        let capacity = retention_window as usize;
        Ok(Self {
            buckets: Vec::with_capacity(capacity),
            start: 0,
            capacity,
        })
    }

    /// Append the bucket of the next ledger.
    ///
    /// Returns the evicted oldest bucket when the window was already full.
    /// A bucket whose sequence is not exactly `newest + 1` is rejected and
    /// the window is left untouched.
    pub fn append(
        &mut self,
        ledger_seq: u32,
        ledger_close_timestamp: i64,
        bucket_content: T,
    ) -> Result<Option<LedgerBucket<T>>, WindowError> {
        if let Some(newest) = self.last() {
            let expected = newest
                .ledger_seq
                .checked_add(1)
                .ok_or(WindowError::SequenceExhausted {
                    last: newest.ledger_seq,
                })?;
            if ledger_seq != expected {
                return Err(WindowError::NonContiguous {
                    expected,
                    received: ledger_seq,
                });
            }
        }

        let bucket = LedgerBucket::new(ledger_seq, ledger_close_timestamp, bucket_content);
        if self.buckets.len() < self.capacity {
            self.buckets.push(bucket);
            return Ok(None);
        }

        let evicted = std::mem::replace(&mut self.buckets[self.start], bucket);
        self.start = (self.start + 1) % self.capacity;
        Ok(Some(evicted))
    }

    /// Number of buckets held, `0..=capacity`.
    pub fn len(&self) -> u32 {
        self.buckets.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    /// The `i`-th oldest bucket.
    ///
    /// # Panics
    ///
    /// If `i >= len()`.
    pub fn get(&self, i: u32) -> &LedgerBucket<T> {
        let len = self.buckets.len();
        let i = i as usize;
        assert!(i < len, "index out of range: {} >= {}", i, len);
        &self.buckets[(self.start + i) % len]
    }

    /// Oldest bucket, if any.
    pub fn first(&self) -> Option<&LedgerBucket<T>> {
        (!self.is_empty()).then(|| self.get(0))
    }

    /// Newest bucket, if any.
    pub fn last(&self) -> Option<&LedgerBucket<T>> {
        (!self.is_empty()).then(|| self.get(self.len() - 1))
    }

    /// Sequence the next `append` must carry. `None` while empty and once
    /// the newest bucket holds `u32::MAX`.
    pub fn next_ledger_seq(&self) -> Option<u32> {
        self.last().and_then(|newest| newest.ledger_seq.checked_add(1))
    }

    /// Buckets from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LedgerBucket<T>> + '_ {
        let (wrapped, head) = self.buckets.split_at(self.start);
        head.iter().chain(wrapped.iter())
    }
}
