//! Telemetry service — the periodic sensor tick.
//!
//! Each tick samples the sensor, appends to the rolling history, runs the
//! rain predictor and publishes a snapshot. The tick can be started and
//! stopped at runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use clothesline_domain::rain;
use clothesline_domain::status::StatusSnapshot;
use clothesline_domain::telemetry::{TelemetryHistory, TelemetrySample};
use clothesline_domain::time::Millis;

use crate::clock::Clock;
use crate::ports::{SensorSource, SharedStore};
use crate::services::status_publisher::StatusPublisher;

/// Default period between two ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3_000);

/// Result of [`TelemetryService::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { interval_ms: u64 },
    AlreadyRunning,
}

pub struct TelemetryService<Src, S> {
    sensor: Mutex<Src>,
    history: Mutex<TelemetryHistory>,
    publisher: Arc<StatusPublisher<S>>,
    clock: Clock,
    interval: Duration,
    ticker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<Src, S> TelemetryService<Src, S>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    #[must_use]
    pub fn new(
        sensor: Src,
        publisher: Arc<StatusPublisher<S>>,
        clock: Clock,
        interval: Duration,
    ) -> Self {
        Self {
            sensor: Mutex::new(sensor),
            history: Mutex::new(TelemetryHistory::default()),
            publisher,
            clock,
            interval,
            ticker: tokio::sync::Mutex::new(None),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one tick now: sample, predict, publish.
    #[tracing::instrument(skip(self))]
    pub async fn tick(&self) -> StatusSnapshot {
        let (sample, forecast) = self.observe(self.clock.now_ms());
        tracing::debug!(
            humidity = sample.humidity,
            temperature = sample.temperature,
            rain = forecast,
            "telemetry sampled"
        );
        self.publisher.publish_telemetry(sample, forecast).await
    }

    /// Start the periodic tick. Publishes once immediately.
    pub async fn start(self: &Arc<Self>) -> StartOutcome {
        let mut ticker = self.ticker.lock().await;
        if ticker.as_ref().is_some_and(|task| !task.is_finished()) {
            return StartOutcome::AlreadyRunning;
        }

        self.tick().await;

        // the tick above stands in for the interval's immediate first tick
        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        let service = Arc::clone(self);
        *ticker = Some(tokio::spawn(async move {
            loop {
                interval.tick().await;
                service.tick().await;
            }
        }));

        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(interval_ms, "telemetry started");
        StartOutcome::Started { interval_ms }
    }

    /// Stop the periodic tick. Returns `false` if it was not running.
    pub async fn stop(&self) -> bool {
        let Some(task) = self.ticker.lock().await.take() else {
            return false;
        };
        let was_running = !task.is_finished();
        task.abort();
        if was_running {
            tracing::info!("telemetry stopped");
        }
        was_running
    }

    pub async fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Samples currently kept for the predictor, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<TelemetrySample> {
        lock(&self.history).to_vec()
    }

    fn observe(&self, now_ms: Millis) -> (TelemetrySample, bool) {
        let sample = lock(&self.sensor).sample(now_ms);
        let mut history = lock(&self.history);
        history.push(sample);
        let recent = history.to_vec();
        (sample, rain::predict(&sample, &recent))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
