use crate::application::events::{GameEvent, OperatorCommand, Signal, Step};
use crate::application::machine::RoundMachine;
use crate::application::scheduler::Scheduler;
use crate::domain::money::Yen;
use crate::domain::ports::RankingStoreBox;
use crate::domain::ranking::RankingEntry;
use crate::domain::session::Session;
use crate::error::{RegisterError, Result};
use rand::Rng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Sends operator input and control events to a running [`GameEngine`].
#[derive(Clone)]
pub struct GameHandle {
    events: UnboundedSender<GameEvent>,
}

impl GameHandle {
    pub fn send(&self, event: impl Into<GameEvent>) -> Result<()> {
        self.events.send(event.into()).map_err(|e| {
            RegisterError::Internal(Box::new(std::io::Error::other(format!(
                "game loop has stopped: {e}"
            ))))
        })
    }

    pub fn command(&self, command: OperatorCommand) -> Result<()> {
        self.send(GameEvent::Operator(command))
    }

    pub fn quit(&self) -> Result<()> {
        self.send(GameEvent::Quit)
    }
}

/// The game loop.
///
/// A single task owns the [`RoundMachine`] and consumes one event channel carrying both
/// operator input and timer expirations, so the machine only ever has one writer. Timers
/// are scheduled through a [`Scheduler`] that posts back into the same channel. Final
/// scores go to the ranking store; a failed write is logged and the game carries on.
pub struct GameEngine<R> {
    machine: RoundMachine<R>,
    rankings: RankingStoreBox,
    scheduler: Scheduler<GameEvent>,
    events: UnboundedReceiver<GameEvent>,
    signals: UnboundedSender<Signal>,
}

impl<R: Rng + Send> GameEngine<R> {
    /// Wires a machine to a ranking store.
    ///
    /// Returns the engine, a handle for feeding it input, and the stream of presentation
    /// signals it will publish.
    pub fn new(
        machine: RoundMachine<R>,
        rankings: RankingStoreBox,
    ) -> (Self, GameHandle, UnboundedReceiver<Signal>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let engine = Self {
            machine,
            rankings,
            scheduler: Scheduler::new(&event_tx),
            events: event_rx,
            signals: signal_tx,
        };
        (engine, GameHandle { events: event_tx }, signal_rx)
    }

    /// Starts the first game and processes events until `Quit` or until every
    /// [`GameHandle`] is dropped. Returns the session as it stood at shutdown.
    ///
    /// Rejected operator input is reported as a signal and the game goes on. An error
    /// while drawing the next round ends the run with that error.
    pub async fn run(mut self) -> Result<Session> {
        let step = self.machine.start()?;
        self.apply(step).await;

        while let Some(event) = self.events.recv().await {
            match event {
                GameEvent::Quit => break,
                GameEvent::ShowRankings { limit } => self.show_rankings(limit).await,
                GameEvent::Operator(command) => match self.machine.command(command) {
                    Ok(step) => self.apply(step).await,
                    Err(e) => {
                        debug!(error = %e, "operator input rejected");
                        self.emit(Signal::Rejected {
                            reason: e.to_string(),
                        });
                    }
                },
                // A failing timer leaves the round with nothing scheduled, so the game
                // cannot continue.
                event => match self.machine.handle(event) {
                    Ok(step) => self.apply(step).await,
                    Err(e) => {
                        warn!(error = %e, "game loop stopped on a timer event");
                        return Err(e);
                    }
                },
            }
        }

        Ok(self.machine.session().clone())
    }

    async fn apply(&mut self, step: Step) {
        for signal in step.signals {
            self.emit(signal);
        }
        for timer in step.timers {
            self.scheduler.schedule(timer.delay, timer.event);
        }
        if let Some(final_score) = step.finished_game {
            self.record(final_score).await;
        }
    }

    async fn record(&self, score: Yen) {
        let entry = RankingEntry::now(self.machine.config().player.clone(), score);
        match self.rankings.record_ranking(entry).await {
            Ok(()) => self.emit(Signal::RankingRecorded { score }),
            Err(e) => warn!(error = %e, score, "Failed to record ranking, continuing without it"),
        }
    }

    async fn show_rankings(&self, limit: usize) {
        match self.rankings.get_rankings(limit).await {
            Ok(entries) => self.emit(Signal::Rankings { entries }),
            Err(e) => {
                warn!(error = %e, "Failed to read rankings");
                self.emit(Signal::Rejected {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn emit(&self, signal: Signal) {
        // Nobody listening is fine; presentation is optional.
        let _ = self.signals.send(signal);
    }
}
