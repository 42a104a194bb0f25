use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws tower heights for new nodes.
///
/// Each draw flips a fair coin until it lands on "stop"; the height is one
/// plus the number of "continue" flips, so `P(height = n) = 2^-n`. The draw
/// is unbounded; callers clamp it to their level ceiling.
pub(crate) struct LevelGenerator {
    rng: ChaCha8Rng,
}

impl LevelGenerator {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    pub(crate) fn next_level(&mut self) -> usize {
        let mut level = 1;
        while self.rng.gen_bool(0.5) {
            level += 1;
        }
        level
    }
}
