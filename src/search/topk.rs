//! Bounded top-k selection.
//!
//! Keeps the `k` highest-scoring `(score, payload)` pairs offered so far in a
//! min-heap, so each offer costs `O(log k)`. Among equal scores the pair
//! offered first ranks higher: once the selector is full, an offer that does
//! not beat the current minimum is dropped. NaN scores are never retained.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Entry<T> {
    score: f64,
    seq: u64,
    payload: T,
}

impl<T> Entry<T> {
    /// Higher score ranks higher; on ties the earlier offer ranks higher.
    fn rank(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank(other)
    }
}

/// Retains the `k` best-scoring elements seen since construction.
pub struct TopKElement<T> {
    capacity: usize,
    heap: BinaryHeap<Reverse<Entry<T>>>,
    offered: u64,
}

impl<T> TopKElement<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
            offered: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The lowest retained score, if any.
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.score)
    }

    /// Offers one element. Returns whether it was retained.
    pub fn add(&mut self, score: f64, payload: T) -> bool {
        if score.is_nan() {
            return false;
        }
        let entry = Entry {
            score,
            seq: self.offered,
            payload,
        };
        self.offered += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(entry));
            return true;
        }
        let beats_min = self.heap.peek().is_some_and(|Reverse(min)| entry > *min);
        if !beats_min {
            return false;
        }
        self.heap.pop();
        self.heap.push(Reverse(entry));
        true
    }

    /// Consumes the selector, returning retained elements by descending
    /// score, ties in offer order.
    pub fn into_sorted_vec(self) -> Vec<(f64, T)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| (entry.score, entry.payload))
            .collect()
    }
}
