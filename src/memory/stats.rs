//! Client Statistics Module
//!
//! Counts protocol calls made against the memory backend.

// == Client Stats ==
/// Number of protocol calls per command, plus get outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Number of get calls
    pub gets: u64,
    /// Gets that found a live entry
    pub hits: u64,
    /// Gets that found nothing (absent or expired)
    pub misses: u64,
    pub sets: u64,
    pub touches: u64,
    pub deletes: u64,
    pub flushes: u64,
}

impl ClientStats {
    // == Constructor ==
    /// Creates a new ClientStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Total Calls ==
    /// Calls of any command, including ones that failed.
    pub fn total_calls(&self) -> u64 {
        self.gets + self.sets + self.touches + self.deletes + self.flushes
    }

    // == Record Get ==
    /// Records a get and whether it hit.
    pub fn record_get(&mut self, hit: bool) {
        self.gets += 1;
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}
