use std::collections::HashSet;

use crate::dna::sampler::Dna;

/// Outcome of recording one duplicate draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateVerdict {
    /// Budget remains; draw again.
    Retry,
    /// The failure count reached the tolerance.
    Exhausted,
}

/// Run-wide record of accepted canonical DNA and the duplicate budget.
#[derive(Clone, Debug)]
pub struct UniquenessTracker {
    accepted: HashSet<String>,
    failures: u32,
    tolerance: u32,
}

impl UniquenessTracker {
    /// Empty tracker aborting after `tolerance` duplicates.
    pub fn new(tolerance: u32) -> Self {
        Self {
            accepted: HashSet::new(),
            failures: 0,
            tolerance,
        }
    }

    /// Whether the canonical form of `dna` has not been accepted yet.
    pub fn is_unique(&self, dna: &Dna) -> bool {
        !self.accepted.contains(&dna.canonical())
    }

    /// Record `dna` as produced. Call only after its image and metadata are written.
    pub fn accept(&mut self, dna: &Dna) -> bool {
        self.accepted.insert(dna.canonical())
    }

    /// Count one duplicate draw against the budget.
    pub fn record_duplicate(&mut self) -> DuplicateVerdict {
        self.failures = self.failures.saturating_add(1);
        if self.failures >= self.tolerance {
            DuplicateVerdict::Exhausted
        } else {
            DuplicateVerdict::Retry
        }
    }

    /// Duplicates counted so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dna/tracker.rs"]
mod tests;
