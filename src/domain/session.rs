use crate::domain::money::Yen;
use serde::Serialize;

/// Counters that outlive a single round and reset when a new game starts.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct Session {
    pub lives: u32,
    pub score: Yen,
    pub mistakes: u32,
    pub rounds_played: u32,
}

impl Session {
    pub fn new(lives: u32) -> Self {
        Self {
            lives,
            score: 0,
            mistakes: 0,
            rounds_played: 0,
        }
    }

    pub fn award(&mut self, points: Yen) {
        self.score += points;
    }

    /// Charges one life for a failed round; returns the lives left.
    pub fn penalize(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.mistakes += 1;
        self.lives
    }

    pub fn is_over(&self) -> bool {
        self.lives == 0
    }
}

/// Point-in-time view of the session and the current round.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct RoundState {
    pub lives: u32,
    pub score: Yen,
    pub mistakes: u32,
    pub remaining: u32,
    pub elapsed: u32,
    pub resolved: bool,
}
