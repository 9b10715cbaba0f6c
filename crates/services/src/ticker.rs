use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed period for the timer identified by `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Spawns recurring tick tasks that report into a single channel.
#[derive(Debug, Clone)]
pub struct Ticker {
    tx: mpsc::UnboundedSender<Tick>,
    period: Duration,
}

impl Ticker {
    /// Creates a ticker with a one-second period and the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = Self {
            tx,
            period: TICK_PERIOD,
        };
        (ticker, rx)
    }

    /// Starts ticking for `generation`. The first tick arrives one period from now.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(&self, generation: u64) -> TickerHandle {
        let tx = self.tx.clone();
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        });
        trace!(generation, "ticker started");
        TickerHandle { task, generation }
    }
}

/// Owns a running tick task; the task is aborted when the handle is cancelled or dropped.
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
    generation: u64,
}

impl TickerHandle {
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
        trace!(generation = self.generation, "ticker cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_carry_their_generation_once_per_second() {
        let (ticker, mut rx) = Ticker::channel();
        let _handle = ticker.spawn(7);
        let begin = Instant::now();
        for n in 1..=3 {
            assert_eq!(rx.recv().await, Some(Tick { generation: 7 }));
            assert_eq!(begin.elapsed(), TICK_PERIOD * n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_ticker_stops_sending() {
        let (ticker, mut rx) = Ticker::channel();
        let handle = ticker.spawn(1);
        assert_eq!(rx.recv().await, Some(Tick { generation: 1 }));

        handle.cancel();
        tokio::task::yield_now().await;
        while rx.try_recv().is_ok() {}

        let next = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(next.is_err(), "no tick expected after cancel");
    }
}
