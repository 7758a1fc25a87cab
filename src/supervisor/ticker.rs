//! Tick source for the poll loop.
//!
//! The supervisor awaits one tick between polls. Production uses a tokio
//! interval; tests inject [`ManualTicker`] so the loop runs without real
//! delays.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[async_trait]
pub trait Ticker: Send {
    /// Complete once the next poll is due.
    async fn tick(&mut self);
}

/// Fixed-period ticker backed by `tokio::time::interval`.
pub struct IntervalTicker {
    interval: tokio::time::Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a fresh interval completes immediately; reset so
        // the first await actually waits one period, like a plain sleep.
        interval.reset();
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticker that completes immediately and counts its ticks.
///
/// An optional hook runs on every tick, which lets tests advance a fake
/// substrate in lockstep with the poll loop.
pub struct ManualTicker {
    ticks: u64,
    on_tick: Option<Box<dyn FnMut() + Send>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            on_tick: None,
        }
    }

    pub fn with_hook(on_tick: impl FnMut() + Send + 'static) -> Self {
        Self {
            ticks: 0,
            on_tick: Some(Box::new(on_tick)),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for ManualTicker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        self.ticks += 1;
        if let Some(hook) = &mut self.on_tick {
            hook();
        }
        // Let other tasks (the job under supervision included) make
        // progress even on a current-thread runtime.
        tokio::task::yield_now().await;
    }
}
