use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub const QUOTES: [&str; 7] = [
    "Small steps lead to big results!",
    "Your only limit is your mind 💪",
    "Another day, another victory!",
    "You're becoming the best version of yourself ✨",
    "Dedication always wins 🔥",
    "Keep going — progress compounds!",
    "One more day. One more win.",
];

/// Shown after the re-render so the progress update is seen first.
pub const MOTIVATION_DELAY_MS: u64 = 50;

/// Uniform picks from [`QUOTES`].
pub struct Motivation {
    rng: StdRng,
}

impl Motivation {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn pick(&mut self) -> &'static str {
        QUOTES.choose(&mut self.rng).copied().unwrap_or(QUOTES[0])
    }
}
