//! Game tuning knobs.
//!
//! Everything the round state machine needs to know about timing, penalties and money
//! lives in [`GameConfig`]. Defaults reproduce the standard cashier drill; a JSON file
//! may override any subset of fields.

use crate::domain::money::{DENOMINATIONS, Yen};
use crate::domain::ranking::DEFAULT_PLAYER;
use crate::error::{RegisterError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

/// Where a round's customer payment comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PaymentStrategy {
    /// Draw a wallet and pay the smallest reachable amount covering the bill.
    Wallet,
    /// Synthesize a rounded payment. The customer's cash on hand is the subtotal plus a
    /// uniform draw from `headroom_min..=headroom_max`.
    Heuristic {
        error_rate: f64,
        headroom_min: Yen,
        headroom_max: Yen,
    },
}

impl PaymentStrategy {
    pub fn heuristic() -> Self {
        PaymentStrategy::Heuristic {
            error_rate: 0.9,
            headroom_min: 50,
            headroom_max: 500,
        }
    }
}

/// Points awarded for a correct round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScoringRule {
    /// The value of the order rung up.
    OrderTotal,
    /// `max(10, base - elapsed ticks)`.
    TimeBonus { base: Yen },
    /// `max(0, base - elapsed ticks) + per_line * order lines`. Rewards speed and
    /// bigger orders together.
    TimeAndLines { base: Yen, per_line: Yen },
}

impl ScoringRule {
    /// The rule the game screen scores with: 120 ticks of bonus, 10 per order line.
    pub fn time_and_lines() -> Self {
        ScoringRule::TimeAndLines {
            base: 120,
            per_line: 10,
        }
    }

    pub fn points(&self, order_total: Yen, elapsed_ticks: u32, order_lines: usize) -> Yen {
        match self {
            ScoringRule::OrderTotal => order_total,
            ScoringRule::TimeBonus { base } => {
                base.saturating_sub(Yen::from(elapsed_ticks)).max(10)
            }
            ScoringRule::TimeAndLines { base, per_line } => {
                let lines = Yen::try_from(order_lines).unwrap_or(Yen::MAX);
                base.saturating_sub(Yen::from(elapsed_ticks))
                    .saturating_add(per_line.saturating_mul(lines))
            }
        }
    }
}

/// Built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Two minutes per customer, payment drawn from a wallet.
    Standard,
    /// One minute per customer, rounded payments.
    Rush,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Ticks per round before the customer gives up. Default 120.
    pub countdown_ticks: u32,
    /// Wall-clock length of one tick. Default 1000 ms.
    pub tick_interval_ms: u64,
    /// Lives at the start of a game. Default 3.
    pub lives: u32,
    /// Coin selections tolerated in one round; one more angers the customer. Default 23.
    pub coin_overflow_threshold: u32,
    /// Fewest items drawn for an order. Default 1.
    pub order_size_min: u32,
    /// Most items drawn for an order. Default 6.
    pub order_size_max: u32,
    /// Upper bound of the per-denomination wallet draw. Default 4.
    pub wallet_draw_max: u32,
    /// Face values in circulation. Default 1 to 10000 yen.
    pub denominations: Vec<Yen>,
    pub payment: PaymentStrategy,
    pub scoring: ScoringRule,
    /// How long the angry customer is shown after a failure. Default 3000 ms.
    pub anger_delay_ms: u64,
    /// Pause between a round's result and the next customer. Default 1500 ms.
    pub result_delay_ms: u64,
    /// Name recorded with rankings.
    pub player: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: 120,
            tick_interval_ms: 1000,
            lives: 3,
            coin_overflow_threshold: 23,
            order_size_min: 1,
            order_size_max: 6,
            wallet_draw_max: 4,
            denominations: DENOMINATIONS.to_vec(),
            payment: PaymentStrategy::Wallet,
            scoring: ScoringRule::OrderTotal,
            anger_delay_ms: 3000,
            result_delay_ms: 1500,
            player: DEFAULT_PLAYER.to_string(),
        }
    }
}

impl GameConfig {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Standard => Self::default(),
            Mode::Rush => Self {
                countdown_ticks: 60,
                payment: PaymentStrategy::heuristic(),
                ..Self::default()
            },
        }
    }

    /// Reads a JSON config; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.countdown_ticks == 0 {
            return Err(RegisterError::Config("countdown_ticks must be positive".into()));
        }
        if self.lives == 0 {
            return Err(RegisterError::Config("lives must be positive".into()));
        }
        if self.order_size_min == 0 || self.order_size_min > self.order_size_max {
            return Err(RegisterError::Config(format!(
                "order size range {}..={} is empty or starts at zero",
                self.order_size_min, self.order_size_max
            )));
        }
        if self.denominations.is_empty() || self.denominations.contains(&0) {
            return Err(RegisterError::Config(
                "denominations must be non-empty and positive".into(),
            ));
        }
        if let PaymentStrategy::Heuristic {
            error_rate,
            headroom_min,
            headroom_max,
        } = &self.payment
        {
            if !(0.0..=1.0).contains(error_rate) {
                return Err(RegisterError::InvalidErrorRate(*error_rate));
            }
            if headroom_min > headroom_max {
                return Err(RegisterError::Config(format!(
                    "headroom range {headroom_min}..={headroom_max} is empty"
                )));
            }
        }
        Ok(())
    }

    pub fn order_size(&self) -> RangeInclusive<u32> {
        self.order_size_min..=self.order_size_max
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn anger_delay(&self) -> Duration {
        Duration::from_millis(self.anger_delay_ms)
    }

    pub fn result_delay(&self) -> Duration {
        Duration::from_millis(self.result_delay_ms)
    }

    pub fn is_denomination(&self, value: Yen) -> bool {
        self.denominations.contains(&value)
    }
}
