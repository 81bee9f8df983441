//! Tick-counted depth latency emulation.

use std::collections::VecDeque;

/// FIFO of depth features that delays them by a fixed number of ticks.
///
/// Exactly one entry is pushed per tick, present or not, so the delay does
/// not depend on extraction succeeding.
///
/// # Example
///
/// ```
/// use policy_depth::DepthLatentQueue;
///
/// let mut queue = DepthLatentQueue::new(2);
/// assert_eq!(queue.advance(Some(vec![1.0])), Some(vec![1.0]));
/// assert_eq!(queue.advance(Some(vec![2.0])), Some(vec![1.0]));
/// assert_eq!(queue.advance(Some(vec![3.0])), Some(vec![1.0]));
/// assert_eq!(queue.advance(None), Some(vec![2.0]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DepthLatentQueue {
    latency_steps: usize,
    entries: VecDeque<Option<Vec<f32>>>,
}

impl DepthLatentQueue {
    /// Creates an empty queue delaying by `latency_steps` ticks.
    #[must_use]
    pub fn new(latency_steps: usize) -> Self {
        Self {
            latency_steps,
            entries: VecDeque::with_capacity(latency_steps + 1),
        }
    }

    /// Configured delay.
    #[must_use]
    pub const fn latency_steps(&self) -> usize {
        self.latency_steps
    }

    /// Entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` before the first tick.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records this tick's feature and returns the delayed one.
    ///
    /// Once more than `latency_steps` entries are held the oldest is removed
    /// and returned. Before that the oldest entry is returned without removal.
    pub fn advance(&mut self, feature: Option<Vec<f32>>) -> Option<Vec<f32>> {
        self.entries.push_back(feature);
        if self.entries.len() > self.latency_steps {
            self.entries.pop_front().flatten()
        } else {
            self.entries.front().cloned().flatten()
        }
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn feature(tick: usize) -> Option<Vec<f32>> {
        Some(vec![tick as f32; 4])
    }

    #[test]
    fn exact_delay() {
        let latency = 7;
        let mut queue = DepthLatentQueue::new(latency);
        let mut consumed = Vec::new();
        for tick in 1..=20 {
            consumed.push(queue.advance(feature(tick)));
        }
        // Tick latency+1 consumes tick 1, and every later tick is shifted by latency.
        assert_eq!(consumed[latency], feature(1));
        for tick in (latency + 1)..=20 {
            assert_eq!(consumed[tick - 1], feature(tick - latency));
        }
        assert_eq!(queue.len(), latency);
    }

    #[test]
    fn warm_up_reuses_oldest() {
        let mut queue = DepthLatentQueue::new(3);
        assert_eq!(queue.advance(feature(1)), feature(1));
        assert_eq!(queue.advance(feature(2)), feature(1));
        assert_eq!(queue.advance(feature(3)), feature(1));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn missing_features_keep_timing() {
        let mut queue = DepthLatentQueue::new(2);
        assert_eq!(queue.advance(None), None);
        assert_eq!(queue.advance(feature(2)), None);
        assert_eq!(queue.advance(feature(3)), None);
        assert_eq!(queue.advance(None), feature(2));
        assert_eq!(queue.advance(None), feature(3));
        assert_eq!(queue.advance(None), None);
    }

    #[test]
    fn zero_latency_is_passthrough() {
        let mut queue = DepthLatentQueue::new(0);
        assert_eq!(queue.advance(feature(5)), feature(5));
        assert_eq!(queue.advance(None), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_restarts_warm_up() {
        let mut queue = DepthLatentQueue::new(1);
        let _ = queue.advance(feature(1));
        let _ = queue.advance(feature(2));
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.advance(feature(9)), feature(9));
    }
}
