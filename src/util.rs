/// Simple deterministic RNG using xorshift64.
/// Good enough for particle placement; reproducible without external dependencies.
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) } // Ensure non-zero
    }

    /// Get the next random u64
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Get a random f64 in [0, 1)
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Get a random f64 in [min, max)
    #[inline]
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}
