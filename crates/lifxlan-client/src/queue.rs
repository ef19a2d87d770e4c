use std::collections::HashMap;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest number of sends that can be pending at once.
pub const MAX_PENDING: usize = u8::MAX as usize;

/// Serialized datagrams waiting to be transmitted, keyed by sequence.
///
/// Sequence numbers are drawn at random from `1..=255` and are unique
/// among pending entries; `0` is never issued.
#[derive(Debug)]
pub struct SendQueue {
    pending: HashMap<u8, Bytes>,
    rng: StdRng,
}

impl SendQueue {
    /// Create an empty queue seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create an empty queue drawing sequences from `rng`.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            pending: HashMap::new(),
            rng,
        }
    }

    /// Pick a sequence number not held by any pending entry.
    ///
    /// Returns `None` when every non-zero value is pending.
    pub fn allocate(&mut self) -> Option<u8> {
        if self.pending.len() >= MAX_PENDING {
            return None;
        }
        loop {
            let sequence = self.rng.random_range(1..=u8::MAX);
            if !self.pending.contains_key(&sequence) {
                return Some(sequence);
            }
        }
    }

    /// Store a serialized datagram under `sequence`.
    pub fn insert(&mut self, sequence: u8, datagram: Bytes) {
        self.pending.insert(sequence, datagram);
    }

    /// Remove an arbitrary pending entry.
    pub fn pop_any(&mut self) -> Option<(u8, Bytes)> {
        let sequence = *self.pending.keys().next()?;
        self.pending.remove_entry(&sequence)
    }

    /// Pending datagram for `sequence`.
    pub fn get(&self, sequence: u8) -> Option<&Bytes> {
        self.pending.get(&sequence)
    }

    /// Whether `sequence` is pending.
    pub fn contains(&self, sequence: u8) -> bool {
        self.pending.contains_key(&sequence)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for SendQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn seeded() -> SendQueue {
        SendQueue::with_rng(StdRng::seed_from_u64(7))
    }

    #[test]
    fn fills_every_nonzero_sequence() {
        let mut queue = seeded();
        let mut seen = HashSet::new();
        for _ in 0..MAX_PENDING {
            let sequence = queue.allocate().unwrap();
            assert_ne!(sequence, 0);
            assert!(seen.insert(sequence), "sequence {sequence} issued twice");
            queue.insert(sequence, Bytes::from_static(b"x"));
        }
        assert_eq!(queue.len(), MAX_PENDING);
        assert_eq!(queue.allocate(), None);
    }

    #[test]
    fn popping_frees_a_sequence() {
        let mut queue = seeded();
        for _ in 0..MAX_PENDING {
            let sequence = queue.allocate().unwrap();
            queue.insert(sequence, Bytes::new());
        }
        let (freed, _) = queue.pop_any().unwrap();
        assert!(!queue.contains(freed));
        assert_eq!(queue.allocate(), Some(freed));
    }

    #[test]
    fn get_returns_stored_bytes() {
        let mut queue = seeded();
        let sequence = queue.allocate().unwrap();
        queue.insert(sequence, Bytes::from_static(b"frame"));
        assert_eq!(queue.get(sequence).map(|b| b.as_ref()), Some(&b"frame"[..]));
        assert!(queue.contains(sequence));

        let other = if sequence == 1 { 2 } else { 1 };
        assert!(queue.get(other).is_none());
    }

    #[test]
    fn drains_to_empty() {
        let mut queue = seeded();
        for _ in 0..10 {
            let sequence = queue.allocate().unwrap();
            queue.insert(sequence, Bytes::new());
        }
        let mut drained = 0;
        while queue.pop_any().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 10);
        assert!(queue.is_empty());
    }
}
