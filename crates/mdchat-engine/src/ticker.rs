//! Reveal scheduling.
//!
//! [`RevealTicker`] yields one tick per configured interval. Each tick is
//! meant to be applied with [`Conversation::tick`]. Late ticks are delayed,
//! never bunched, so a slow frame does not reveal several characters at
//! once.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::conversation::{ChatError, Conversation, Tick};

/// Default delay between revealed characters.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(50);

/// Fixed-interval timer driving a reveal.
#[derive(Debug)]
pub struct RevealTicker {
    interval: Interval,
    period: Duration,
}

impl RevealTicker {
    /// Create a ticker whose first tick fires one `period` from now.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Restart the schedule so the next tick is one period away.
    ///
    /// Called when a reveal begins so the first character waits a full
    /// interval after the submission.
    pub fn reset(&mut self) {
        self.interval.reset();
    }

    /// Wait for the next tick.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Drive the active reveal of `conversation` to its end.
///
/// `observe` is called after every applied tick with the conversation in
/// its fully updated state. Returns the final tick, or
/// [`ChatError::Cancelled`] if the reveal was cancelled.
pub async fn run_reveal<F>(
    conversation: &mut Conversation,
    ticker: &mut RevealTicker,
    mut observe: F,
) -> Result<Tick, ChatError>
where
    F: FnMut(&Conversation, Tick),
{
    if !conversation.is_streaming() {
        return Ok(Tick::Idle);
    }
    ticker.reset();
    loop {
        ticker.tick().await;
        let tick = conversation.tick()?;
        observe(conversation, tick);
        if !matches!(tick, Tick::Advanced { .. }) {
            return Ok(tick);
        }
    }
}
