/// Deterministic xorshift32 PRNG.
///
/// Level layouts and AI error rolls draw from this generator, so two sessions
/// constructed with the same seed and fed the same inputs produce identical
/// worlds tick for tick.
#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Creates a new RNG. Zero would be a fixed point of xorshift, so it is
    /// replaced with a nonzero default.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform sample in `[0, 1)` built from the high 24 bits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform sample in `[min, max)`.
    pub fn next_range_f32(&mut self, min: f32, max: f32) -> f32 {
        debug_assert!(max >= min);
        min + (max - min) * self.next_f32()
    }

    /// True with probability `p`. Always advances the generator.
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}
