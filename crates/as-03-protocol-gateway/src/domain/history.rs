//! Bounded record of processed transaction ids.

use std::collections::{HashSet, VecDeque};

/// The most recent `capacity` transaction ids, oldest first.
///
/// Recording past capacity forgets the oldest id.
#[derive(Debug, Clone)]
pub struct TxnHistory {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl TxnHistory {
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, txn_id: &str) -> bool {
        self.seen.contains(txn_id)
    }

    /// Remember `txn_id` as the newest entry.
    pub fn record(&mut self, txn_id: String) {
        if !self.seen.insert(txn_id.clone()) {
            return;
        }
        self.order.push_back(txn_id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
    }

    pub fn newest(&self) -> Option<&str> {
        self.order.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
