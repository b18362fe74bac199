//! Raw media element events and the normalized notifications observers see

use crate::{error::MediaErrorCode, types::PlaybackState};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Native media element callbacks, as forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "lowercase")]
pub enum RawMediaEvent {
    Ended,
    Playing,
    Pause,
    Waiting,
    #[serde(rename = "loadedmetadata")]
    LoadedMetadata,
    #[serde(rename = "durationchange")]
    DurationChange,
    #[serde(rename = "ratechange")]
    RateChange(f64),
    /// Error with the element's error code, if it reported one. Accepts the
    /// code by name or by number; unknown numbers carry no code.
    #[serde(deserialize_with = "error_code")]
    Error(Option<MediaErrorCode>),
}

/// Normalized observer notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PlayerEvent {
    StateChange(PlaybackState),
    QualityChange(String),
    PlaybackRateChange(f64),
    Loaded,
    /// Localized error message
    Error(String),
    Ready,
}

/// Fan-out of a controller's notifications to its observers.
///
/// A UI, a logger and an analytics task can each hold a receiver. Publishing
/// never blocks the controller; a notification sent while nobody observes is
/// gone, and an observer that falls more than `capacity` notifications
/// behind gets `RecvError::Lagged` on its next receive.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send `event` to every current observer, returning how many got it
    pub fn publish(&self, event: PlayerEvent) -> usize {
        match self.tx.send(event) {
            Ok(observers) => observers,
            Err(broadcast::error::SendError(event)) => {
                trace!(?event, "No observers, notification dropped");
                0
            }
        }
    }

    /// Observe notifications published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

fn error_code<'de, D>(deserializer: D) -> Result<Option<MediaErrorCode>, D::Error>
where
    D: Deserializer<'de>,
{
    // Hosts forward either the numeric `MediaError.code` or its name
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Numeric(u16),
        Named(MediaErrorCode),
    }

    Ok(match Option::<Code>::deserialize(deserializer)? {
        Some(Code::Numeric(code)) => MediaErrorCode::from_code(code),
        Some(Code::Named(code)) => Some(code),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[test]
    fn test_notification_without_observers_is_dropped() {
        let bus = EventBus::new(4);
        assert_eq!(bus.observer_count(), 0);
        assert_eq!(bus.publish(PlayerEvent::Ready), 0);

        let mut rx = bus.subscribe();
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_every_observer_sees_quality_change() {
        let bus = EventBus::default();
        let mut ui = bus.subscribe();
        let mut analytics = bus.subscribe();

        let reached = bus.publish(PlayerEvent::QualityChange("q2".into()));
        assert_eq!(reached, 2);
        assert_eq!(ui.try_recv().unwrap(), PlayerEvent::QualityChange("q2".into()));
        assert_eq!(analytics.try_recv().unwrap(), PlayerEvent::QualityChange("q2".into()));
    }

    #[tokio::test]
    async fn test_slow_observer_lags_behind_state_changes() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        bus.publish(PlayerEvent::StateChange(PlaybackState::Buffering));
        bus.publish(PlayerEvent::StateChange(PlaybackState::Playing));
        bus.publish(PlayerEvent::StateChange(PlaybackState::Paused));

        assert_eq!(rx.recv().await, Err(RecvError::Lagged(1)));
        assert_eq!(
            rx.recv().await.unwrap(),
            PlayerEvent::StateChange(PlaybackState::Playing)
        );
    }

    #[test]
    fn test_raw_events_deserialize_from_script_form() {
        let events: Vec<RawMediaEvent> = serde_json::from_str(
            r#"[{"event":"playing"},{"event":"loadedmetadata"},{"event":"ratechange","value":1.5},{"event":"error","value":"Network"}]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                RawMediaEvent::Playing,
                RawMediaEvent::LoadedMetadata,
                RawMediaEvent::RateChange(1.5),
                RawMediaEvent::Error(Some(MediaErrorCode::Network)),
            ]
        );
    }

    #[test]
    fn test_error_event_accepts_numeric_codes() {
        let events: Vec<RawMediaEvent> = serde_json::from_str(
            r#"[{"event":"error","value":3},{"event":"error","value":42},{"event":"error","value":null}]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                RawMediaEvent::Error(Some(MediaErrorCode::Decode)),
                RawMediaEvent::Error(None),
                RawMediaEvent::Error(None),
            ]
        );
    }
}
