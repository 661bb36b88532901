use std::time::Duration;
use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;

/// Delayed-task queue: delivers an event into a channel after a delay.
///
/// Scheduled events are never cancelled. Receivers are expected to recognise and drop
/// events that no longer apply. The scheduler only holds a weak sender, so pending
/// timers do not keep the channel open once every real sender is gone.
pub struct Scheduler<E> {
    sender: WeakUnboundedSender<E>,
}

impl<E: Send + 'static> Scheduler<E> {
    pub fn new(sender: &UnboundedSender<E>) -> Self {
        Self {
            sender: sender.downgrade(),
        }
    }

    pub fn schedule(&self, delay: Duration, event: E) -> JoinHandle<()> {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = sender.upgrade() {
                // A closed channel means the game loop is gone; nothing left to notify.
                let _ = sender.send(event);
            }
        })
    }
}
