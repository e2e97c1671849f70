//! Fault log — circular buffer of recent generator failures.

use std::collections::VecDeque;
use std::time::SystemTime;

/// A timestamped generator failure.
#[derive(Debug, Clone)]
pub struct FaultEntry {
    pub timestamp: SystemTime,
    pub generator: String,
    pub message: String,
}

/// Circular buffer of recent faults, plus a running total.
#[derive(Debug, Clone)]
pub struct FaultLog {
    entries: VecDeque<FaultEntry>,
    capacity: usize,
    total: u64,
}

impl FaultLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    /// Record a fault, evicting the oldest if at capacity.
    pub fn push(&mut self, generator: String, message: String) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(FaultEntry {
            timestamp: SystemTime::now(),
            generator,
            message,
        });
        self.total += 1;
    }

    /// Most recent fault, if any.
    pub fn latest(&self) -> Option<&FaultEntry> {
        self.entries.back()
    }

    pub fn entries(&self) -> impl Iterator<Item = &FaultEntry> {
        self.entries.iter()
    }

    /// Faults seen since start, including evicted ones.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for FaultLog {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_log_is_empty() {
        let log = FaultLog::new(10);
        assert!(log.is_empty());
        assert_eq!(log.total(), 0);
        assert!(log.latest().is_none());
    }

    #[test]
    fn overflow_evicts_oldest_but_keeps_total() {
        let mut log = FaultLog::new(2);
        log.push("a".into(), "1".into());
        log.push("b".into(), "2".into());
        log.push("c".into(), "3".into());

        assert_eq!(log.len(), 2);
        assert_eq!(log.total(), 3);
        let names: Vec<&str> = log.entries().map(|e| e.generator.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(log.latest().map(|e| e.message.as_str()), Some("3"));
    }

    #[test]
    fn zero_capacity_still_keeps_latest() {
        let mut log = FaultLog::new(0);
        log.push("a".into(), "boom".into());
        assert_eq!(log.len(), 1);
    }
}
