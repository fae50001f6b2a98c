/*!
Sweep iteration over one full rotation.
*/

use std::iter::FusedIterator;

use crate::protocol::DEGREES_PER_SWEEP;
use crate::sample::AngleSample;

/// Yields the samples for degrees `0..360` in increasing order.
///
/// A sweep holds nothing beyond its degree counter; start a new one to
/// repeat the rotation.
#[derive(Debug, Clone)]
pub struct Sweep {
    next_degree: u16,
}

impl Sweep {
    pub fn new() -> Self {
        Self { next_degree: 0 }
    }
}

impl Default for Sweep {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Sweep {
    type Item = AngleSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_degree >= DEGREES_PER_SWEEP {
            return None;
        }
        let sample = AngleSample::at(self.next_degree);
        self.next_degree += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(DEGREES_PER_SWEEP.saturating_sub(self.next_degree));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Sweep {}

impl FusedIterator for Sweep {}
