use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::utils::clock::Clock;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElapsedTick {
    pub entry_id: Arc<str>,
    pub elapsed: chrono::Duration,
}

/// Emits the elapsed time of the active entry once per second. The background task lives until
/// the ticker is dropped, `cancel` is called, or the parent token is cancelled.
pub struct ElapsedTicker {
    token: CancellationToken,
}

impl ElapsedTicker {
    pub fn spawn(
        entry_id: Arc<str>,
        start_time: DateTime<Utc>,
        clock: Arc<dyn Clock>,
        sender: mpsc::Sender<ElapsedTick>,
        parent: &CancellationToken,
    ) -> Self {
        let token = parent.child_token();
        tokio::spawn(run_ticks(
            entry_id,
            start_time,
            clock,
            sender,
            token.clone(),
        ));
        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_ticks(
    entry_id: Arc<str>,
    start_time: DateTime<Utc>,
    clock: Arc<dyn Clock>,
    sender: mpsc::Sender<ElapsedTick>,
    token: CancellationToken,
) {
    debug!("Ticker started for {entry_id}");
    let mut tick_point = clock.instant();
    loop {
        tick_point += TICK_INTERVAL;

        tokio::select! {
            _ = token.cancelled() => break,
            _ = clock.sleep_until(tick_point) => ()
        }

        let tick = ElapsedTick {
            entry_id: entry_id.clone(),
            elapsed: clock.time() - start_time,
        };
        trace!("Tick {:?}", tick);
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            sent = sender.send(tick) => {
                // Receiver gone means the session is over.
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    debug!("Ticker stopped for {entry_id}");
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::utils::{clock::TestClock, logging::TEST_LOGGING};

    use super::ElapsedTicker;

    #[tokio::test(start_paused = true)]
    async fn ticks_every_second_until_cancelled() {
        *TEST_LOGGING;
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let clock = Arc::new(TestClock::starting_at(start));
        let (sender, mut receiver) = mpsc::channel(4);
        let parent = CancellationToken::new();

        let ticker = ElapsedTicker::spawn("entry".into(), start, clock, sender, &parent);

        for second in 1..=3 {
            let tick = receiver.recv().await.unwrap();
            assert_eq!(&*tick.entry_id, "entry");
            assert_eq!(tick.elapsed, chrono::Duration::seconds(second));
        }

        ticker.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        // Whatever was buffered before the cancellation, the channel ends.
        while receiver.recv().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_ticker() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let clock = Arc::new(TestClock::starting_at(start));
        let (sender, mut receiver) = mpsc::channel(4);
        let parent = CancellationToken::new();

        let _ticker = ElapsedTicker::spawn("entry".into(), start, clock, sender, &parent);
        parent.cancel();

        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_ends_ticker_with_full_channel() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let clock = Arc::new(TestClock::starting_at(start));
        let (sender, mut receiver) = mpsc::channel(1);
        let parent = CancellationToken::new();

        let ticker = ElapsedTicker::spawn("entry".into(), start, clock, sender, &parent);
        // One tick fills the channel, the next one waits on the send.
        tokio::time::sleep(Duration::from_millis(2_500)).await;

        ticker.cancel();
        assert!(receiver.recv().await.is_some());
        assert!(receiver.recv().await.is_none());
    }
}
