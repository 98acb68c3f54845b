use crate::error::{Error, Result};
use crate::rng::MwcRng;
use clap::ValueEnum;
use std::ops::Index;

/// The `AccessResult` encodes the outcome of a single cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Miss,
    Hit,
}

impl AccessResult {
    pub fn is_hit(&self) -> bool {
        *self == AccessResult::Hit
    }
}

/// Placement policy of a simulated cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Organization {
    #[value(name = "direct-mapped")]
    DirectMapped,
    #[value(name = "fully-associative")]
    FullyAssociative,
}

impl Organization {
    /// Both organizations in reporting order.
    pub const ALL: [Organization; 2] = [Organization::DirectMapped, Organization::FullyAssociative];

    pub fn title(&self) -> &'static str {
        match self {
            Organization::DirectMapped => "Direct Mapped",
            Organization::FullyAssociative => "Fully Associative",
        }
    }
}

impl std::fmt::Display for Organization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// How a fully associative cache picks the slot to refill on a miss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Replacement {
    /// any slot, chosen uniformly with the shared rng, whether or not it holds a live line
    #[default]
    #[value(name = "random")]
    Random,
    /// the first invalid slot in scan order while one exists, then `Random`
    #[value(name = "fill-first")]
    FillFirst,
}

/// The `CacheLine` struct is one slot of either cache array. A line that is not `valid` carries a
/// meaningless tag and never matches a lookup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u32,
}

impl CacheLine {
    fn matches(&self, tag: u32) -> bool {
        self.valid && self.tag == tag
    }

    fn fill(&mut self, tag: u32) {
        self.valid = true;
        self.tag = tag;
    }
}

/// `CacheGeometry` is a validated pairing of total capacity and line size. Every cache is built
/// from one, so the index and tag arithmetic never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    capacity: u32,
    line_size: u32,
}

impl CacheGeometry {
    /// Validate and return a new geometry.
    ///
    /// # Arguments
    ///
    /// * `capacity` - total cache size in bytes.
    /// * `line_size` - size of one cache line in bytes.
    ///
    /// # Errors
    ///
    /// Both values must be non-zero and `capacity` must be a whole multiple of `line_size`.
    pub fn build(capacity: u32, line_size: u32) -> Result<Self> {
        if line_size == 0 {
            Err(Error::ZeroLineSize)
        } else if capacity == 0 {
            Err(Error::ZeroCapacity)
        } else if capacity % line_size != 0 {
            Err(Error::CapacityNotMultiple {
                capacity,
                line_size,
            })
        } else {
            Ok(Self {
                capacity,
                line_size,
            })
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn line_size(&self) -> u32 {
        self.line_size
    }

    pub fn line_count(&self) -> u32 {
        self.capacity / self.line_size
    }

    fn lines(&self) -> Vec<CacheLine> {
        vec![CacheLine::default(); self.line_count() as usize]
    }
}

/// The `DirectMappedCache` struct maps every address to exactly one slot. On a miss the single
/// congruent slot is unconditionally refilled.
#[derive(Debug)]
pub struct DirectMappedCache {
    geometry: CacheGeometry,
    lines: Vec<CacheLine>,
}

impl DirectMappedCache {
    /// Create a new cache with every line invalid.
    pub fn build(geometry: CacheGeometry) -> Self {
        Self {
            geometry,
            lines: geometry.lines(),
        }
    }

    /// Slot that `address` maps to, always in `[0, line_count)`.
    pub fn index_of(&self, address: u32) -> usize {
        ((address / self.geometry.line_size) % self.geometry.line_count()) as usize
    }

    /// Upper address bits left once offset and index are removed.
    pub fn tag_of(&self, address: u32) -> u32 {
        address / self.geometry.capacity
    }

    /// Look up `address`, refilling its slot on a miss.
    pub fn access(&mut self, address: u32) -> AccessResult {
        let index = self.index_of(address);
        let tag = self.tag_of(address);
        let line = &mut self.lines[index];
        match line.matches(tag) {
            true => AccessResult::Hit,
            false => {
                line.fill(tag);
                AccessResult::Miss
            }
        }
    }

    pub fn geometry(&self) -> CacheGeometry {
        self.geometry
    }
}

impl Index<usize> for DirectMappedCache {
    type Output = CacheLine;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lines[index]
    }
}

/// The `FullyAssociativeCache` struct lets any block occupy any slot. Lookups scan every slot in
/// index order; misses refill a slot picked by the configured `Replacement`.
#[derive(Debug)]
pub struct FullyAssociativeCache {
    geometry: CacheGeometry,
    lines: Vec<CacheLine>,
    replacement: Replacement,
}

impl FullyAssociativeCache {
    /// Create a new cache with every line invalid.
    pub fn build(geometry: CacheGeometry, replacement: Replacement) -> Self {
        Self {
            geometry,
            lines: geometry.lines(),
            replacement,
        }
    }

    pub fn tag_of(&self, address: u32) -> u32 {
        address / self.geometry.line_size
    }

    /// Look up `address`. Valid tags are unique, so the scan stops at the first match.
    ///
    /// # Arguments
    ///
    /// * `address` - simulated memory address.
    /// * `rng` - shared random source used to pick a victim on a miss.
    ///
    pub fn access(&mut self, address: u32, rng: &mut MwcRng) -> AccessResult {
        let tag = self.tag_of(address);
        if self.lines.iter().any(|line| line.matches(tag)) {
            return AccessResult::Hit;
        }
        let victim = self.victim(rng);
        self.lines[victim].fill(tag);
        AccessResult::Miss
    }

    fn victim(&self, rng: &mut MwcRng) -> usize {
        let free = match self.replacement {
            Replacement::Random => None,
            Replacement::FillFirst => self.lines.iter().position(|line| !line.valid),
        };
        free.unwrap_or_else(|| (rng.next_u32() % self.geometry.line_count()) as usize)
    }

    /// Whether `address`'s block currently occupies some slot.
    pub fn contains(&self, address: u32) -> bool {
        let tag = self.tag_of(address);
        self.lines.iter().any(|line| line.matches(tag))
    }

    pub fn geometry(&self) -> CacheGeometry {
        self.geometry
    }
}

impl Index<usize> for FullyAssociativeCache {
    type Output = CacheLine;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lines[index]
    }
}

/// A cache of either organization, as owned by the driver for the duration of one run.
#[derive(Debug)]
pub enum Cache {
    DirectMapped(DirectMappedCache),
    FullyAssociative(FullyAssociativeCache),
}

impl Cache {
    pub fn build(
        organization: Organization,
        geometry: CacheGeometry,
        replacement: Replacement,
    ) -> Self {
        match organization {
            Organization::DirectMapped => Cache::DirectMapped(DirectMappedCache::build(geometry)),
            Organization::FullyAssociative => {
                Cache::FullyAssociative(FullyAssociativeCache::build(geometry, replacement))
            }
        }
    }

    pub fn access(&mut self, address: u32, rng: &mut MwcRng) -> AccessResult {
        match self {
            Cache::DirectMapped(cache) => cache.access(address),
            Cache::FullyAssociative(cache) => cache.access(address, rng),
        }
    }

    pub fn organization(&self) -> Organization {
        match self {
            Cache::DirectMapped(_) => Organization::DirectMapped,
            Cache::FullyAssociative(_) => Organization::FullyAssociative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::AccessResult::{Hit, Miss};

    const SCENARIO: [u32; 8] = [0, 16, 32, 48, 0, 16, 32, 48];

    fn small_geometry() -> CacheGeometry {
        CacheGeometry::build(64, 16).unwrap()
    }

    #[cfg(test)]
    mod geometry_tests {
        use super::*;

        #[test]
        fn build() {
            let geometry = CacheGeometry::build(64 * 1024, 16).unwrap();
            assert_eq!(geometry.capacity(), 65536);
            assert_eq!(geometry.line_size(), 16);
            assert_eq!(geometry.line_count(), 4096);
        }

        #[test]
        fn rejects_zero_line_size() {
            assert!(matches!(CacheGeometry::build(64, 0), Err(Error::ZeroLineSize)));
        }

        #[test]
        fn rejects_zero_capacity() {
            assert!(matches!(CacheGeometry::build(0, 16), Err(Error::ZeroCapacity)));
        }

        #[test]
        fn rejects_uneven_capacity() {
            assert!(matches!(
                CacheGeometry::build(100, 16),
                Err(Error::CapacityNotMultiple {
                    capacity: 100,
                    line_size: 16
                })
            ));
        }
    }

    #[cfg(test)]
    mod direct_mapped_tests {
        use super::*;

        #[test]
        fn build() {
            let cache = DirectMappedCache::build(small_geometry());
            assert_eq!(cache.lines.len(), 4);
            assert!(cache.lines.iter().all(|line| !line.valid));
        }

        #[test]
        fn index_in_range() {
            let cache = DirectMappedCache::build(CacheGeometry::build(64 * 1024, 64).unwrap());
            let mut rng = MwcRng::new();
            (0..10_000).for_each(|_| {
                let address = rng.next_u32();
                let index = cache.index_of(address);
                assert!(index < 1024);
                assert_eq!(index, cache.index_of(address));
            });
            assert!(cache.index_of(u32::MAX) < 1024);
        }

        #[test]
        fn index_and_tag() {
            let cache = DirectMappedCache::build(small_geometry());
            assert_eq!(cache.index_of(0), 0);
            assert_eq!(cache.index_of(15), 0);
            assert_eq!(cache.index_of(16), 1);
            assert_eq!(cache.index_of(64), 0);
            assert_eq!(cache.tag_of(63), 0);
            assert_eq!(cache.tag_of(64), 1);
            assert_eq!(cache.tag_of(200), 3);
        }

        #[test]
        fn scenario() {
            let mut cache = DirectMappedCache::build(small_geometry());
            let results: Vec<AccessResult> = SCENARIO.iter().map(|a| cache.access(*a)).collect();
            assert_eq!(results, vec![Miss, Miss, Miss, Miss, Hit, Hit, Hit, Hit]);
        }

        #[test]
        fn conflicting_tags_evict_each_other() {
            let mut cache = DirectMappedCache::build(small_geometry());
            let (a, b) = (8, 72);
            assert_eq!(cache.index_of(a), cache.index_of(b));
            assert_ne!(cache.tag_of(a), cache.tag_of(b));
            assert_eq!(cache.access(a), Miss);
            assert_eq!(cache.access(b), Miss);
            assert_eq!(cache.access(a), Miss);
            assert_eq!(cache[0], CacheLine { valid: true, tag: 0 });
        }

        #[test]
        fn same_line_hits() {
            let mut cache = DirectMappedCache::build(small_geometry());
            assert_eq!(cache.access(32), Miss);
            (33..48).for_each(|a| assert_eq!(cache.access(a), Hit));
        }

        #[test]
        fn invalid_line_never_matches() {
            // tag 0 is the zeroed tag of every fresh line
            let mut cache = DirectMappedCache::build(small_geometry());
            assert_eq!(cache.access(0), Miss);
        }
    }

    #[cfg(test)]
    mod fully_associative_tests {
        use super::*;

        #[test]
        fn build() {
            let cache = FullyAssociativeCache::build(small_geometry(), Replacement::Random);
            assert_eq!(cache.lines.len(), 4);
            assert!(cache.lines.iter().all(|line| !line.valid));
            assert!(!cache.contains(0));
        }

        #[test]
        fn tag() {
            let cache = FullyAssociativeCache::build(small_geometry(), Replacement::Random);
            assert_eq!(cache.tag_of(15), 0);
            assert_eq!(cache.tag_of(16), 1);
            assert_eq!(cache.tag_of(1024), 64);
        }

        #[test]
        fn scenario_fill_first() {
            let mut rng = MwcRng::new();
            let mut cache = FullyAssociativeCache::build(small_geometry(), Replacement::FillFirst);
            let results: Vec<AccessResult> = SCENARIO
                .iter()
                .map(|a| cache.access(*a, &mut rng))
                .collect();
            assert_eq!(results, vec![Miss, Miss, Miss, Miss, Hit, Hit, Hit, Hit]);
            // every fill landed on an invalid slot, so no draws were taken
            assert_eq!(rng, MwcRng::new());
        }

        #[test]
        fn scenario_random() {
            // victims drawn from the seed are slots 3, 3, 0, 3, then 0, 2, 1
            let mut rng = MwcRng::new();
            let mut cache = FullyAssociativeCache::build(small_geometry(), Replacement::Random);
            let results: Vec<AccessResult> = SCENARIO
                .iter()
                .map(|a| cache.access(*a, &mut rng))
                .collect();
            assert_eq!(results, vec![Miss, Miss, Miss, Miss, Miss, Miss, Miss, Hit]);
        }

        #[test]
        fn random_hits_once_resident() {
            let mut rng = MwcRng::new();
            let mut cache = FullyAssociativeCache::build(small_geometry(), Replacement::Random);
            SCENARIO.iter().for_each(|a| {
                cache.access(*a, &mut rng);
                assert!(cache.contains(*a));
                assert_eq!(cache.access(*a, &mut rng), Hit);
            });
        }

        #[test]
        fn repeated_address_always_hits() {
            [Replacement::Random, Replacement::FillFirst]
                .into_iter()
                .for_each(|replacement| {
                    let mut rng = MwcRng::new();
                    let mut cache = FullyAssociativeCache::build(
                        CacheGeometry::build(64 * 1024, 32).unwrap(),
                        replacement,
                    );
                    assert_eq!(cache.access(4242, &mut rng), Miss);
                    (0..1000).for_each(|_| assert_eq!(cache.access(4242, &mut rng), Hit));
                });
        }

        #[test]
        fn tags_stay_unique() {
            let mut rng = MwcRng::new();
            let mut cache = FullyAssociativeCache::build(small_geometry(), Replacement::Random);
            (0..500).for_each(|_| {
                let address = rng.next_u32() % 256;
                cache.access(address, &mut rng);
                let mut tags: Vec<u32> = cache
                    .lines
                    .iter()
                    .filter(|line| line.valid)
                    .map(|line| line.tag)
                    .collect();
                let count = tags.len();
                tags.sort();
                tags.dedup();
                assert_eq!(tags.len(), count);
            });
        }

        #[test]
        fn random_consumes_one_draw_per_miss() {
            let mut rng = MwcRng::new();
            let mut reference = MwcRng::new();
            let mut cache = FullyAssociativeCache::build(small_geometry(), Replacement::Random);
            cache.access(0, &mut rng);
            reference.next_u32();
            cache.access(0, &mut rng);
            assert_eq!(rng, reference);
        }
    }

    #[cfg(test)]
    mod cache_tests {
        use super::*;

        #[test]
        fn build() {
            Organization::ALL.iter().for_each(|organization| {
                let cache = Cache::build(*organization, small_geometry(), Replacement::Random);
                assert_eq!(cache.organization(), *organization);
            });
        }

        #[test]
        fn dispatch() {
            let mut rng = MwcRng::new();
            let mut cache = Cache::build(
                Organization::DirectMapped,
                small_geometry(),
                Replacement::Random,
            );
            let results: Vec<AccessResult> = SCENARIO
                .iter()
                .map(|a| cache.access(*a, &mut rng))
                .collect();
            assert_eq!(results.iter().filter(|r| r.is_hit()).count(), 4);
            assert_eq!(rng, MwcRng::new());
        }

        #[test]
        fn titles() {
            assert_eq!(Organization::DirectMapped.to_string(), "Direct Mapped");
            assert_eq!(Organization::FullyAssociative.to_string(), "Fully Associative");
        }
    }
}
