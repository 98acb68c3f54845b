use crate::cache::AccessResult;
use std::ops::{Add, AddAssign};

/// The `StatTracker` struct is a simple collection of named counters for one simulation run. Runs
/// can be combined with `+` to aggregate totals across configurations.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub struct StatTracker {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
}

impl StatTracker {
    /// Create a new instance of the `StatTracker` struct with all counters initialized to zero.
    pub fn new() -> Self {
        Self {
            accesses: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn record(&mut self, result: AccessResult) {
        self.accesses += 1;
        match result {
            AccessResult::Hit => self.hits += 1,
            AccessResult::Miss => self.misses += 1,
        }
    }

    /// Hits as a percentage of all accesses. Zero when nothing was accessed.
    pub fn hit_ratio(&self) -> f64 {
        match self.accesses {
            0 => 0.0,
            n => 100.0 * self.hits as f64 / n as f64,
        }
    }
}

impl Add<StatTracker> for StatTracker {
    type Output = StatTracker;

    fn add(self, rhs: StatTracker) -> Self::Output {
        Self::Output {
            accesses: self.accesses + rhs.accesses,
            hits: self.hits + rhs.hits,
            misses: self.misses + rhs.misses,
        }
    }
}

impl AddAssign for StatTracker {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.add(rhs)
    }
}

impl std::fmt::Display for StatTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "
Stats Tracked
---------------------------------
accesses:                {:08}
hits:                    {:08}
misses:                  {:08}


hit ratio:               {:.06}%
               ",
            self.accesses,
            self.hits,
            self.misses,
            self.hit_ratio(),
        )
    }
}
