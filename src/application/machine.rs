use crate::application::events::{GameEvent, OperatorCommand, Signal, Step, Timer};
use crate::config::{GameConfig, PaymentStrategy};
use crate::domain::catalog::MenuItem;
use crate::domain::money::{Yen, generate_wallet};
use crate::domain::order::{CustomerOrder, OperatorOrder, generate_order};
use crate::domain::payment::{calculate_payment, select_payment};
use crate::domain::round::{Outcome, Round, Tender};
use crate::domain::session::{RoundState, Session};
use crate::error::{RegisterError, Result};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum Phase {
    /// No game has started yet.
    Idle,
    Active,
    Resolving { outcome: Outcome },
    GameOver { final_score: Yen },
}

/// The round state machine.
///
/// Owns the session counters and the current round and is driven one event at a time.
/// Every terminal transition (timeout, checkout, coin overflow) goes through the
/// round's resolution gate, so whichever arrives first decides the round and the rest
/// are dropped. Timers are not run here: transitions return the [`Timer`]s they want,
/// and the caller feeds the resulting events back in.
pub struct RoundMachine<R> {
    config: GameConfig,
    catalog: Vec<MenuItem>,
    rng: R,
    session: Session,
    round: Option<Round>,
    phase: Phase,
    generation: u64,
}

impl<R: Rng> RoundMachine<R> {
    pub fn new(config: GameConfig, catalog: Vec<MenuItem>, rng: R) -> Result<Self> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(RegisterError::EmptyCatalog);
        }
        Ok(Self {
            session: Session::new(config.lives),
            config,
            catalog,
            rng,
            round: None,
            phase: Phase::Idle,
            generation: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn state(&self) -> RoundState {
        RoundState {
            lives: self.session.lives,
            score: self.session.score,
            mistakes: self.session.mistakes,
            remaining: self.round.as_ref().map_or(0, Round::remaining),
            elapsed: self.round.as_ref().map_or(0, Round::elapsed),
            resolved: self.round.as_ref().is_none_or(Round::is_resolved),
        }
    }

    /// Starts a new game. Ignored while a game is running.
    pub fn start(&mut self) -> Result<Step> {
        if matches!(self.phase, Phase::Active | Phase::Resolving { .. }) {
            debug!("start ignored, a game is already running");
            return Ok(Step::default());
        }
        self.session = Session::new(self.config.lives);
        self.next_round()
    }

    /// Draws a fresh order and payment and opens a round for them.
    pub fn next_round(&mut self) -> Result<Step> {
        let order = generate_order(&self.catalog, self.config.order_size(), &mut self.rng)?;
        let tender = self.draw_tender(order.subtotal())?;
        Ok(self.begin_round(order, tender))
    }

    /// Opens a round for a given order and payment.
    pub fn begin_round(&mut self, order: CustomerOrder, tender: Tender) -> Step {
        self.generation += 1;
        let generation = self.generation;
        let round = Round::new(generation, order, tender, self.config.countdown_ticks);
        info!(
            generation,
            subtotal = round.order().subtotal(),
            payment = round.payment(),
            "round started"
        );

        let signal = Signal::RoundStarted {
            generation,
            order: round.order().lines().to_vec(),
            subtotal: round.order().subtotal(),
            payment: round.payment(),
            max_payment: round.tender().max_payment,
            remaining: round.remaining(),
        };
        self.round = Some(round);
        self.phase = Phase::Active;

        Step {
            signals: vec![signal],
            timers: vec![Timer::new(
                self.config.tick_interval(),
                GameEvent::Tick { generation },
            )],
            finished_game: None,
        }
    }

    fn draw_tender(&mut self, subtotal: Yen) -> Result<Tender> {
        let bill = i64::try_from(subtotal).map_err(|_| RegisterError::InvalidSubtotal(i64::MAX))?;
        match self.config.payment.clone() {
            PaymentStrategy::Wallet => {
                let wallet = generate_wallet(
                    subtotal,
                    &self.config.denominations,
                    self.config.wallet_draw_max,
                    &mut self.rng,
                );
                let amount = select_payment(bill, &wallet)?;
                Ok(Tender {
                    amount,
                    wallet: Some(wallet),
                    max_payment: None,
                })
            }
            PaymentStrategy::Heuristic {
                error_rate,
                headroom_min,
                headroom_max,
            } => {
                let max_payment = subtotal + self.rng.gen_range(headroom_min..=headroom_max);
                let cap = i64::try_from(max_payment).ok();
                let amount = calculate_payment(bill, error_rate, cap, &mut self.rng)?;
                Ok(Tender {
                    amount,
                    wallet: None,
                    max_payment: Some(max_payment),
                })
            }
        }
    }

    pub fn handle(&mut self, event: GameEvent) -> Result<Step> {
        match event {
            GameEvent::Tick { generation } => Ok(self.tick(generation)),
            GameEvent::AngerSubsided { generation } => Ok(self.anger_subsided(generation)),
            GameEvent::Advance { generation } => self.advance(generation),
            GameEvent::Operator(command) => self.command(command),
            GameEvent::ShowRankings { .. } | GameEvent::Quit => Ok(Step::default()),
        }
    }

    pub fn command(&mut self, command: OperatorCommand) -> Result<Step> {
        match command {
            OperatorCommand::AddItem(name) => self.add_item(&name),
            OperatorCommand::DecrementItem(name) => self.decrement_item(&name),
            OperatorCommand::RemoveItem(name) => self.remove_item(&name),
            OperatorCommand::SelectCoin(value) => self.select_coin(value),
            OperatorCommand::Checkout => self.checkout(),
            OperatorCommand::Retry => self.start(),
        }
    }

    /// One countdown tick. Ticks from an earlier round, or for a round that is already
    /// decided, do nothing and schedule nothing.
    pub fn tick(&mut self, generation: u64) -> Step {
        let Some(round) = self.round.as_mut() else {
            return Step::default();
        };
        if round.generation() != generation || round.is_resolved() {
            debug!(generation, "stale countdown tick ignored");
            return Step::default();
        }

        let remaining = round.tick();
        let mut step = Step::signal(Signal::Countdown { remaining });
        if remaining == 0 {
            step.merge(self.resolve(Outcome::TimedOut));
        } else {
            step.timers.push(Timer::new(
                self.config.tick_interval(),
                GameEvent::Tick { generation },
            ));
        }
        step
    }

    pub fn anger_subsided(&mut self, generation: u64) -> Step {
        if !self.is_resolving(generation) {
            return Step::default();
        }
        let mut step = Step::signal(Signal::Calm);
        step.timers.push(Timer::new(
            self.config.result_delay(),
            GameEvent::Advance { generation },
        ));
        step
    }

    /// Moves on to the next customer once the result of round `generation` has been shown.
    pub fn advance(&mut self, generation: u64) -> Result<Step> {
        if !self.is_resolving(generation) {
            debug!(generation, "stale advance ignored");
            return Ok(Step::default());
        }
        self.next_round()
    }

    pub fn add_item(&mut self, name: &str) -> Result<Step> {
        let item = self.lookup(name)?;
        let Some(round) = self.open_round()? else {
            return Ok(Step::default());
        };
        round.operator_order_mut().add(&item);
        Ok(Step::signal(order_changed(round.operator_order())))
    }

    pub fn decrement_item(&mut self, name: &str) -> Result<Step> {
        let Some(round) = self.open_round()? else {
            return Ok(Step::default());
        };
        round.operator_order_mut().decrement(name)?;
        Ok(Step::signal(order_changed(round.operator_order())))
    }

    pub fn remove_item(&mut self, name: &str) -> Result<Step> {
        let Some(round) = self.open_round()? else {
            return Ok(Step::default());
        };
        round.operator_order_mut().remove(name)?;
        Ok(Step::signal(order_changed(round.operator_order())))
    }

    /// Hands one coin or note back to the customer.
    pub fn select_coin(&mut self, value: Yen) -> Result<Step> {
        if !self.config.is_denomination(value) {
            return Err(RegisterError::InvalidDenomination(value));
        }
        let threshold = self.config.coin_overflow_threshold;
        let Some(round) = self.open_round()? else {
            return Ok(Step::default());
        };
        let selections = round.select_coin(value);
        let mut step = Step::signal(Signal::CoinAdded {
            value,
            change: round.change_tendered(),
            selections,
        });
        if selections > threshold {
            step.merge(self.resolve(Outcome::CoinOverflow));
        }
        Ok(step)
    }

    pub fn checkout(&mut self) -> Result<Step> {
        let Some(round) = self.open_round()? else {
            return Ok(Step::default());
        };
        let outcome = round.evaluate_checkout();
        Ok(self.resolve(outcome))
    }

    /// Applies a terminal outcome if, and only if, this call wins the round's gate.
    fn resolve(&mut self, outcome: Outcome) -> Step {
        let Some(round) = self.round.as_ref() else {
            return Step::default();
        };
        if !round.gate().try_acquire() {
            debug!(?outcome, "round already resolved, outcome dropped");
            return Step::default();
        }
        let generation = round.generation();
        let order_total = round.operator_order().total();
        let elapsed = round.elapsed();
        let order_lines = round.order().lines().len();
        info!(generation, ?outcome, "round resolved");

        self.phase = Phase::Resolving { outcome };
        self.session.rounds_played += 1;
        let mut step = Step::default();

        if !outcome.is_failure() {
            let awarded = self.config.scoring.points(order_total, elapsed, order_lines);
            self.session.award(awarded);
            step.signals.push(Signal::Correct {
                awarded,
                score: self.session.score,
            });
            step.timers.push(Timer::new(
                self.config.result_delay(),
                GameEvent::Advance { generation },
            ));
            return step;
        }

        step.signals.push(match outcome {
            Outcome::TimedOut => Signal::Timeout,
            Outcome::CoinOverflow => Signal::CoinOverflow,
            _ => Signal::Mismatch,
        });
        step.signals.push(Signal::Angry);
        let lives = self.session.penalize();
        step.signals.push(Signal::LivesChanged { lives });

        if self.session.is_over() {
            let final_score = self.session.score;
            info!(final_score, mistakes = self.session.mistakes, "game over");
            step.signals.push(Signal::GameOver { final_score });
            step.finished_game = Some(final_score);
            self.session = Session::new(self.config.lives);
            self.phase = Phase::GameOver { final_score };
            self.round = None;
        } else {
            step.timers.push(Timer::new(
                self.config.anger_delay(),
                GameEvent::AngerSubsided { generation },
            ));
        }
        step
    }

    fn is_resolving(&self, generation: u64) -> bool {
        matches!(self.phase, Phase::Resolving { .. })
            && self
                .round
                .as_ref()
                .is_some_and(|round| round.generation() == generation)
    }

    fn lookup(&self, name: &str) -> Result<MenuItem> {
        self.catalog
            .iter()
            .find(|item| item.name == name)
            .cloned()
            .ok_or_else(|| RegisterError::UnknownItem(name.to_string()))
    }

    /// The current round if it still takes input; `None` once it has been decided.
    fn open_round(&mut self) -> Result<Option<&mut Round>> {
        match self.round.as_mut() {
            None => Err(RegisterError::NoActiveRound),
            Some(round) if round.is_resolved() => {
                debug!(generation = round.generation(), "input after resolution ignored");
                Ok(None)
            }
            Some(round) => Ok(Some(round)),
        }
    }
}

fn order_changed(order: &OperatorOrder) -> Signal {
    Signal::OrderChanged {
        lines: order.lines().to_vec(),
        total: order.total(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Category;
    use crate::domain::order::generate_order_with_draws;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog() -> Vec<MenuItem> {
        vec![
            MenuItem::new("A", 100, Category::Shelf),
            MenuItem::new("B", 200, Category::Drink),
        ]
    }

    fn machine(config: GameConfig) -> RoundMachine<StdRng> {
        RoundMachine::new(config, catalog(), StdRng::seed_from_u64(42)).unwrap()
    }

    fn ab_order() -> CustomerOrder {
        let items = catalog();
        CustomerOrder::from_items(&items)
    }

    #[test]
    fn test_new_rejects_empty_catalog() {
        let result = RoundMachine::new(GameConfig::default(), vec![], StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(RegisterError::EmptyCatalog)));
    }

    #[test]
    fn test_start_opens_round_and_schedules_tick() {
        let mut machine = machine(GameConfig::default());
        let step = machine.start().unwrap();

        assert_eq!(machine.phase(), Phase::Active);
        assert!(matches!(step.signals[0], Signal::RoundStarted { generation: 1, .. }));
        assert_eq!(
            step.timers,
            vec![Timer::new(
                GameConfig::default().tick_interval(),
                GameEvent::Tick { generation: 1 }
            )]
        );
        let round = machine.round().unwrap();
        assert!(round.payment() >= round.order().subtotal());
        assert!(round.tender().wallet.as_ref().unwrap().total() > round.order().subtotal());
    }

    #[test]
    fn test_heuristic_payment_stays_within_cash_on_hand() {
        let mut machine = machine(GameConfig {
            payment: PaymentStrategy::heuristic(),
            ..GameConfig::default()
        });
        for _ in 0..20 {
            machine.next_round().unwrap();
            let round = machine.round().unwrap();
            let max = round.tender().max_payment.unwrap();
            assert!(round.payment() >= round.order().subtotal());
            assert!(round.payment() <= max);
        }
    }

    #[test]
    fn test_correct_checkout_awards_order_total() {
        let mut machine = machine(GameConfig::default());
        machine.begin_round(ab_order(), Tender::exact(500));

        machine.add_item("A").unwrap();
        machine.add_item("B").unwrap();
        machine.select_coin(100).unwrap();
        machine.select_coin(100).unwrap();
        let step = machine.checkout().unwrap();

        assert_eq!(step.signals, vec![Signal::Correct { awarded: 300, score: 300 }]);
        assert_eq!(
            machine.phase(),
            Phase::Resolving {
                outcome: Outcome::Correct
            }
        );
        assert_eq!(machine.session().lives, 3);
    }

    #[test]
    fn test_time_bonus_scoring() {
        let mut machine = machine(GameConfig {
            scoring: crate::config::ScoringRule::TimeBonus { base: 100 },
            ..GameConfig::default()
        });
        machine.begin_round(ab_order(), Tender::exact(300));
        for _ in 0..30 {
            machine.tick(1);
        }
        machine.add_item("A").unwrap();
        machine.add_item("B").unwrap();
        machine.checkout().unwrap();
        assert_eq!(machine.session().score, 70);
    }

    #[test]
    fn test_time_and_lines_scoring() {
        let mut machine = machine(GameConfig {
            scoring: crate::config::ScoringRule::time_and_lines(),
            ..GameConfig::default()
        });
        machine.begin_round(ab_order(), Tender::exact(300));
        for _ in 0..45 {
            machine.tick(1);
        }
        machine.add_item("A").unwrap();
        machine.add_item("B").unwrap();
        let step = machine.checkout().unwrap();
        // 120 - 45 for speed, 2 lines at 10 each.
        assert_eq!(step.signals, vec![Signal::Correct { awarded: 95, score: 95 }]);
    }

    #[test]
    fn test_unknown_item_and_denomination() {
        let mut machine = machine(GameConfig::default());
        machine.begin_round(ab_order(), Tender::exact(300));
        assert!(matches!(
            machine.add_item("Z"),
            Err(RegisterError::UnknownItem(_))
        ));
        assert!(matches!(
            machine.select_coin(2000),
            Err(RegisterError::InvalidDenomination(2000))
        ));
        assert!(matches!(
            machine.remove_item("A"),
            Err(RegisterError::ItemNotInOrder(_))
        ));
    }

    #[test]
    fn test_input_before_any_round() {
        let mut machine = machine(GameConfig::default());
        assert!(matches!(
            machine.checkout(),
            Err(RegisterError::NoActiveRound)
        ));
    }

    #[test]
    fn test_coin_overflow_fires_past_threshold() {
        let mut machine = machine(GameConfig::default());
        machine.begin_round(ab_order(), Tender::exact(10_000));

        for _ in 0..23 {
            let step = machine.select_coin(1).unwrap();
            assert!(!step.signals.contains(&Signal::CoinOverflow));
        }
        let step = machine.select_coin(1).unwrap();
        assert!(step.signals.contains(&Signal::CoinOverflow));
        assert_eq!(machine.session().lives, 2);

        // The round is decided; further coins are ignored.
        assert!(machine.select_coin(1).unwrap().is_empty());
        assert_eq!(machine.round().unwrap().coin_selections(), 24);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut machine = machine(GameConfig::default());
        machine.begin_round(ab_order(), Tender::exact(300));
        machine.begin_round(ab_order(), Tender::exact(300));

        assert!(machine.tick(1).is_empty());
        assert_eq!(machine.round().unwrap().remaining(), 120);
    }

    #[test]
    fn test_failure_sequence_schedules_anger_then_advance() {
        let config = GameConfig::default();
        let mut machine = machine(config.clone());
        machine.begin_round(ab_order(), Tender::exact(300));

        let step = machine.checkout().unwrap();
        assert_eq!(
            step.signals,
            vec![Signal::Mismatch, Signal::Angry, Signal::LivesChanged { lives: 2 }]
        );
        assert_eq!(
            step.timers,
            vec![Timer::new(
                config.anger_delay(),
                GameEvent::AngerSubsided { generation: 1 }
            )]
        );

        let step = machine.anger_subsided(1);
        assert_eq!(step.signals, vec![Signal::Calm]);
        assert_eq!(
            step.timers,
            vec![Timer::new(
                config.result_delay(),
                GameEvent::Advance { generation: 1 }
            )]
        );

        let step = machine.advance(1).unwrap();
        assert!(matches!(step.signals[0], Signal::RoundStarted { generation: 2, .. }));
        assert_eq!(machine.phase(), Phase::Active);
        assert!(machine.round().unwrap().operator_order().is_empty());

        // A duplicate advance for the old round does nothing.
        assert!(machine.advance(1).unwrap().is_empty());
    }

    #[test]
    fn test_game_over_resets_session_and_allows_retry() {
        let mut machine = machine(GameConfig {
            lives: 1,
            ..GameConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(1);
        let order = generate_order_with_draws(&catalog(), 2, &mut rng).unwrap();
        machine.begin_round(order, Tender::exact(1_000));

        let step = machine.checkout().unwrap();
        assert_eq!(step.finished_game, Some(0));
        assert!(step.signals.contains(&Signal::GameOver { final_score: 0 }));
        assert_eq!(machine.phase(), Phase::GameOver { final_score: 0 });
        assert_eq!(machine.session().lives, 1);
        assert!(matches!(
            machine.add_item("A"),
            Err(RegisterError::NoActiveRound)
        ));

        let step = machine.command(OperatorCommand::Retry).unwrap();
        assert!(matches!(step.signals[0], Signal::RoundStarted { .. }));
        assert_eq!(machine.phase(), Phase::Active);
    }

    #[test]
    fn test_retry_ignored_mid_game() {
        let mut machine = machine(GameConfig::default());
        machine.start().unwrap();
        assert!(machine.command(OperatorCommand::Retry).unwrap().is_empty());
    }

    #[test]
    fn test_state_snapshot() {
        let mut machine = machine(GameConfig::default());
        assert!(machine.state().resolved);
        machine.begin_round(ab_order(), Tender::exact(300));
        machine.tick(1);
        let state = machine.state();
        assert_eq!(state.remaining, 119);
        assert_eq!(state.elapsed, 1);
        assert!(!state.resolved);
    }
}
