//! Feed mirror — the bounded local copy of a feed's tail.
//!
//! The mirror keeps records in **arrival order**, not timestamp order:
//! the store's delivery order is taken as-is. When the window is full the
//! oldest arrival is evicted first.

use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::FeedRecord;

/// Maximum number of records retained by a mirror. Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct WindowSize(NonZeroUsize);

impl WindowSize {
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroWindow`] when `size` is zero.
    pub fn new(size: usize) -> Result<Self, ValidationError> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or(ValidationError::ZeroWindow)
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<usize> for WindowSize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WindowSize> for usize {
    fn from(value: WindowSize) -> Self {
        value.get()
    }
}

/// Ordered, bounded sequence of records.
#[derive(Debug, Clone)]
pub struct FeedMirror {
    window: WindowSize,
    records: VecDeque<FeedRecord>,
}

impl FeedMirror {
    /// Create an empty mirror.
    #[must_use]
    pub fn new(window: WindowSize) -> Self {
        Self {
            window,
            records: VecDeque::with_capacity(window.get()),
        }
    }

    /// Append an arrival to the tail, evicting from the head until the
    /// mirror fits in its window.
    ///
    /// Returns the number of evicted records.
    pub fn push_arrival(&mut self, record: FeedRecord) -> usize {
        self.records.push_back(record);
        let mut evicted = 0;
        while self.records.len() > self.window.get() {
            self.records.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    #[must_use]
    pub fn window(&self) -> WindowSize {
        self.window
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lazy, restartable view over the records, oldest arrival first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &FeedRecord> + DoubleEndedIterator {
        self.records.iter()
    }

    /// Most recent arrival.
    #[must_use]
    pub fn last(&self) -> Option<&FeedRecord> {
        self.records.back()
    }
}

impl<'a> IntoIterator for &'a FeedMirror {
    type Item = &'a FeedRecord;
    type IntoIter = std::collections::vec_deque::Iter<'a, FeedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author::AuthorId;
    use crate::id::Sequence;
    use crate::payload::Payload;
    use crate::record::NewRecord;
    use crate::time;

    fn record(seq: u64, author: &str) -> FeedRecord {
        NewRecord::new(Payload::text("gm"), AuthorId::new(author).unwrap())
            .into_record(Sequence(seq), time::now())
    }

    fn authors(mirror: &FeedMirror) -> Vec<String> {
        mirror.iter().map(|r| r.author_id.to_string()).collect()
    }

    #[test]
    fn should_reject_zero_window() {
        assert_eq!(WindowSize::new(0), Err(ValidationError::ZeroWindow));
    }

    #[test]
    fn should_start_empty() {
        let mirror = FeedMirror::new(WindowSize::new(3).unwrap());
        assert!(mirror.is_empty());
        assert!(mirror.last().is_none());
    }

    #[test]
    fn should_keep_last_ten_of_fifteen_arrivals_in_order() {
        let mut mirror = FeedMirror::new(WindowSize::new(10).unwrap());
        for i in 1..=15 {
            mirror.push_arrival(record(i, &format!("u{i}")));
        }

        let expected: Vec<String> = (6..=15).map(|i| format!("u{i}")).collect();
        assert_eq!(authors(&mirror), expected);
    }

    #[test]
    fn should_never_exceed_window() {
        let mut mirror = FeedMirror::new(WindowSize::new(4).unwrap());
        for i in 0..50 {
            mirror.push_arrival(record(i, "u"));
            assert!(mirror.len() <= 4);
        }
    }

    #[test]
    fn should_evict_oldest_first() {
        let mut mirror = FeedMirror::new(WindowSize::new(2).unwrap());
        assert_eq!(mirror.push_arrival(record(1, "a")), 0);
        assert_eq!(mirror.push_arrival(record(2, "b")), 0);
        assert_eq!(mirror.push_arrival(record(3, "c")), 1);
        assert_eq!(authors(&mirror), vec!["b", "c"]);
    }

    #[test]
    fn should_keep_arrival_order_even_when_sequences_are_out_of_order() {
        let mut mirror = FeedMirror::new(WindowSize::new(5).unwrap());
        mirror.push_arrival(record(3, "late"));
        mirror.push_arrival(record(1, "early"));
        assert_eq!(authors(&mirror), vec!["late", "early"]);
    }

    #[test]
    fn should_restart_iteration() {
        let mut mirror = FeedMirror::new(WindowSize::new(3).unwrap());
        mirror.push_arrival(record(1, "a"));
        mirror.push_arrival(record(2, "b"));
        assert_eq!(mirror.iter().count(), 2);
        assert_eq!(mirror.iter().count(), 2);
        assert_eq!((&mirror).into_iter().next().unwrap().author_id.as_str(), "a");
    }

    #[test]
    fn should_deserialize_window_from_number() {
        let window: WindowSize = serde_json::from_str("10").unwrap();
        assert_eq!(window.get(), 10);
        assert!(serde_json::from_str::<WindowSize>("0").is_err());
    }
}
