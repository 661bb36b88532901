use crate::domain::money::Yen;
use crate::domain::order::OrderLine;
use crate::domain::ranking::RankingEntry;
use serde::Serialize;
use std::time::Duration;

/// Input the operator can give during a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    AddItem(String),
    DecrementItem(String),
    RemoveItem(String),
    SelectCoin(Yen),
    Checkout,
    Retry,
}

/// Everything the game loop reacts to. Timer events carry the generation of the round
/// that scheduled them so that leftovers from an earlier round can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Tick { generation: u64 },
    AngerSubsided { generation: u64 },
    Advance { generation: u64 },
    Operator(OperatorCommand),
    ShowRankings { limit: usize },
    Quit,
}

impl From<OperatorCommand> for GameEvent {
    fn from(command: OperatorCommand) -> Self {
        GameEvent::Operator(command)
    }
}

/// Named notifications for the presentation layer (sound, animation, text).
///
/// The game never waits on, or depends on, anything a presenter does with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Signal {
    RoundStarted {
        generation: u64,
        order: Vec<OrderLine>,
        subtotal: Yen,
        payment: Yen,
        max_payment: Option<Yen>,
        remaining: u32,
    },
    Countdown {
        remaining: u32,
    },
    OrderChanged {
        lines: Vec<OrderLine>,
        total: Yen,
    },
    CoinAdded {
        value: Yen,
        change: Yen,
        selections: u32,
    },
    Timeout,
    Mismatch,
    CoinOverflow,
    Correct {
        awarded: Yen,
        score: Yen,
    },
    Angry,
    Calm,
    LivesChanged {
        lives: u32,
    },
    GameOver {
        final_score: Yen,
    },
    RankingRecorded {
        score: Yen,
    },
    Rankings {
        entries: Vec<RankingEntry>,
    },
    Rejected {
        reason: String,
    },
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::RoundStarted { .. } => "round-started",
            Signal::Countdown { .. } => "countdown",
            Signal::OrderChanged { .. } => "order-changed",
            Signal::CoinAdded { .. } => "coin-added",
            Signal::Timeout => "timeout",
            Signal::Mismatch => "mismatch",
            Signal::CoinOverflow => "coin-overflow",
            Signal::Correct { .. } => "correct",
            Signal::Angry => "angry",
            Signal::Calm => "calm",
            Signal::LivesChanged { .. } => "lives-changed",
            Signal::GameOver { .. } => "game-over",
            Signal::RankingRecorded { .. } => "ranking-recorded",
            Signal::Rankings { .. } => "rankings",
            Signal::Rejected { .. } => "rejected",
        }
    }
}

/// A request to deliver `event` after `delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    pub delay: Duration,
    pub event: GameEvent,
}

impl Timer {
    pub fn new(delay: Duration, event: GameEvent) -> Self {
        Self { delay, event }
    }
}

/// What one transition of the round machine produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Step {
    pub signals: Vec<Signal>,
    pub timers: Vec<Timer>,
    /// Final score of a game that just ended; the caller persists it.
    pub finished_game: Option<Yen>,
}

impl Step {
    pub fn signal(signal: Signal) -> Self {
        Self {
            signals: vec![signal],
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: Step) {
        self.signals.extend(other.signals);
        self.timers.extend(other.timers);
        if other.finished_game.is_some() {
            self.finished_game = other.finished_game;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty() && self.timers.is_empty() && self.finished_game.is_none()
    }
}
