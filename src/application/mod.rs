//! Application layer: the round state machine and the loop that drives it.
//!
//! [`machine::RoundMachine`] is a synchronous state machine that turns events into
//! signals and timer requests. [`engine::GameEngine`] owns it on a single `tokio` task,
//! runs the timers through [`scheduler::Scheduler`] and persists finished games.

pub mod engine;
pub mod events;
pub mod machine;
pub mod scheduler;
