//! Status publisher — composes whole snapshots and writes them to the store.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};

use clothesline_domain::motor::MotorState;
use clothesline_domain::status::StatusSnapshot;
use clothesline_domain::telemetry::TelemetrySample;

use crate::clock::Clock;
use crate::ports::{SharedStore, StorePaths};

const SUBSCRIBER_BUFFER: usize = 32;

#[derive(Debug, Default)]
struct Inputs {
    motor: MotorState,
    telemetry: Option<TelemetrySample>,
    forecast: Option<bool>,
}

/// Keeps the last known motor state, sample and forecast, and republishes
/// the union whenever one of them changes.
///
/// Composition and the store write happen under one lock, so snapshots reach
/// the store in the order they were composed.
pub struct StatusPublisher<S> {
    store: Arc<S>,
    path: String,
    clock: Clock,
    inputs: Mutex<Inputs>,
    latest: watch::Sender<Option<StatusSnapshot>>,
    published: broadcast::Sender<StatusSnapshot>,
}

impl<S: SharedStore> StatusPublisher<S> {
    #[must_use]
    pub fn new(store: Arc<S>, paths: &StorePaths, clock: Clock) -> Self {
        let (latest, _) = watch::channel(None);
        let (published, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self {
            store,
            path: paths.status(),
            clock,
            inputs: Mutex::new(Inputs::default()),
            latest,
            published,
        }
    }

    /// Publish after a motor transition or completion.
    pub async fn publish_motor(&self, motor: MotorState) -> StatusSnapshot {
        let mut inputs = self.inputs.lock().await;
        inputs.motor = motor;
        self.publish_locked(&inputs).await
    }

    /// Publish after a telemetry tick.
    pub async fn publish_telemetry(
        &self,
        sample: TelemetrySample,
        forecast: bool,
    ) -> StatusSnapshot {
        let mut inputs = self.inputs.lock().await;
        inputs.telemetry = Some(sample);
        inputs.forecast = Some(forecast);
        self.publish_locked(&inputs).await
    }

    /// The last snapshot this publisher composed, if any.
    #[must_use]
    pub fn latest(&self) -> Option<StatusSnapshot> {
        self.latest.borrow().clone()
    }

    /// Receive every snapshot composed from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusSnapshot> {
        self.published.subscribe()
    }

    async fn publish_locked(&self, inputs: &Inputs) -> StatusSnapshot {
        let snapshot = StatusSnapshot::compose(
            inputs.motor,
            inputs.telemetry.as_ref(),
            inputs.forecast,
            self.clock.now_ms(),
        );
        match snapshot.to_value() {
            Ok(value) => {
                if let Err(err) = self.store.write(&self.path, value).await {
                    tracing::warn!(path = %self.path, error = %err, "failed to write status");
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize status");
            }
        }
        tracing::debug!(
            motor = %snapshot.motor_status,
            line = %snapshot.clothesline_status,
            rain = ?snapshot.rain_forecast,
            "status published"
        );
        self.latest.send_replace(Some(snapshot.clone()));
        // nobody listening is fine
        let _ = self.published.send(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingStore;
    use clothesline_domain::motor::{Direction, Position};

    fn sample(humidity: f64) -> TelemetrySample {
        TelemetrySample {
            temperature: 26.34,
            humidity,
            light_level: 55.2,
            water_level: 40.0,
            timestamp_ms: 0,
        }
    }

    fn publisher(store: &Arc<RecordingStore>) -> StatusPublisher<RecordingStore> {
        StatusPublisher::new(Arc::clone(store), &StorePaths::default(), Clock::starting_at(0))
    }

    #[tokio::test(start_paused = true)]
    async fn should_publish_motor_state_without_sensor_fields_before_first_tick() {
        let store = Arc::new(RecordingStore::default());
        let publisher = publisher(&store);

        let motor = MotorState {
            position: Position::Retracted,
            direction: Some(Direction::Extending),
        };
        publisher.publish_motor(motor).await;

        let value = store.value("/clothesline/status").unwrap();
        assert_eq!(value["motor_status"], "RUNNING");
        assert_eq!(value["clothesline_status"], "Extending");
        assert_eq!(value["running"], true);
        assert!(value.get("humidity").is_none());
        assert!(value.get("rain_forecast").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_motor_state_when_telemetry_arrives() {
        let store = Arc::new(RecordingStore::default());
        let publisher = publisher(&store);
        publisher
            .publish_motor(MotorState {
                position: Position::Extended,
                direction: None,
            })
            .await;

        let snapshot = publisher.publish_telemetry(sample(81.6), true).await;

        assert_eq!(snapshot.position, Position::Extended);
        assert_eq!(snapshot.humidity, Some(82.0));
        assert_eq!(snapshot.temperature, Some(26.3));
        assert_eq!(snapshot.rain_forecast, Some(true));
        assert_eq!(store.writes_to("/clothesline/status").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stamp_snapshots_with_clock_time() {
        let store = Arc::new(RecordingStore::default());
        let publisher = publisher(&store);
        tokio::time::advance(std::time::Duration::from_millis(4_200)).await;

        let snapshot = publisher.publish_motor(MotorState::default()).await;
        assert_eq!(snapshot.timestamp_ms, 4_200);
    }

    #[tokio::test(start_paused = true)]
    async fn should_still_track_latest_when_store_write_fails() {
        let store = Arc::new(RecordingStore::failing());
        let publisher = publisher(&store);
        assert!(publisher.latest().is_none());

        publisher.publish_telemetry(sample(60.0), false).await;

        let latest = publisher.latest().unwrap();
        assert_eq!(latest.rain_forecast, Some(false));
        assert!(store.value("/clothesline/status").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn should_deliver_every_snapshot_to_subscribers_in_order() {
        let store = Arc::new(RecordingStore::default());
        let publisher = publisher(&store);
        let mut rx = publisher.subscribe();

        publisher.publish_telemetry(sample(60.0), false).await;
        publisher.publish_telemetry(sample(80.0), true).await;

        assert_eq!(rx.recv().await.unwrap().rain_forecast, Some(false));
        assert_eq!(rx.recv().await.unwrap().rain_forecast, Some(true));
    }
}
