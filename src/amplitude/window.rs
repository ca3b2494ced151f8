//! Fixed-capacity sliding window of recent amplitudes.
//!
//! New samples enter at the tail and push the oldest one out of the head, so a
//! renderer drawing left to right sees the history scroll left.

use std::collections::VecDeque;

/// FIFO of normalized amplitudes whose length always equals its capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeWindow {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl AmplitudeWindow {
    /// Creates a window of `capacity` zeros.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: std::iter::repeat(0.0).take(capacity).collect(),
            capacity,
        }
    }

    /// Appends a sample at the tail, evicting the oldest from the head.
    pub fn push(&mut self, sample: f32) {
        if self.capacity == 0 {
            return;
        }
        self.samples.pop_front();
        self.samples.push_back(sample.clamp(0.0, 1.0));
    }

    /// Zeroes every slot without changing the capacity.
    pub fn reset(&mut self) {
        self.samples.iter_mut().for_each(|s| *s = 0.0);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copies the window, oldest sample first.
    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.samples.iter()
    }
}
