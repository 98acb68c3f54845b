/// Fixed seed words. Neither may be zero, nor `0x9068ffff` / `0x464fffff` respectively, or the
/// generator collapses into a short cycle.
const SEED_Z: u32 = 0x0508_0902;
const SEED_W: u32 = 0xABAB_AB55;

/// The `MwcRng` struct is a small multiply-with-carry generator built from two independent
/// 16-bit lag-1 generators. It is the only source of randomness in the simulation: the random
/// address generators draw from it and so does the fully associative replacement policy. The
/// stream is a pure function of how many times `next_u32` has been called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MwcRng {
    z: u32,
    w: u32,
}

impl MwcRng {
    /// Create a new generator holding the fixed seed state.
    pub fn new() -> Self {
        Self {
            z: SEED_Z,
            w: SEED_W,
        }
    }

    /// Advance both words and return the combined 32-bit result. All arithmetic wraps.
    pub fn next_u32(&mut self) -> u32 {
        self.z = 36969u32
            .wrapping_mul(self.z & 0xFFFF)
            .wrapping_add(self.z >> 16);
        self.w = 18000u32
            .wrapping_mul(self.w & 0xFFFF)
            .wrapping_add(self.w >> 16);
        (self.z << 16).wrapping_add(self.w)
    }

    /// Put the generator back into its seed state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for MwcRng {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod mwc_rng_tests {
        use super::*;

        /// Reference stream computed by hand from the update rule.
        fn reference(count: usize) -> Vec<u32> {
            let (mut z, mut w) = (SEED_Z as u64, SEED_W as u64);
            (0..count)
                .map(|_| {
                    z = (36969 * (z & 0xFFFF) + (z >> 16)) & 0xFFFF_FFFF;
                    w = (18000 * (w & 0xFFFF) + (w >> 16)) & 0xFFFF_FFFF;
                    (((z << 16) + w) & 0xFFFF_FFFF) as u32
                })
                .collect()
        }

        #[test]
        fn first_output() {
            // z = 36969 * 0x0902 + 0x0508, w = 18000 * 0xAB55 + 0xABAB
            let z: u32 = 36969 * 0x0902 + 0x0508;
            let w: u32 = 18000 * 0xAB55 + 0xABAB;
            let mut rng = MwcRng::new();
            assert_eq!(rng.next_u32(), (z << 16).wrapping_add(w));
        }

        #[test]
        fn matches_reference() {
            let mut rng = MwcRng::new();
            let produced: Vec<u32> = (0..1000).map(|_| rng.next_u32()).collect();
            assert_eq!(produced, reference(1000));
        }

        #[test]
        fn deterministic() {
            let (mut a, mut b) = (MwcRng::new(), MwcRng::default());
            (0..500).for_each(|_| assert_eq!(a.next_u32(), b.next_u32()));
        }

        #[test]
        fn reset() {
            let mut rng = MwcRng::new();
            let first = rng.next_u32();
            (0..10).for_each(|_| {
                rng.next_u32();
            });
            rng.reset();
            assert_eq!(rng, MwcRng::new());
            assert_eq!(rng.next_u32(), first);
        }
    }
}
