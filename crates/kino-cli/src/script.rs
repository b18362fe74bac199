//! Simulation scripts
//!
//! A script is a JSON array mixing controller operations and raw media
//! events, e.g.
//!
//! ```json
//! [
//!   {"event": "loadedmetadata"},
//!   {"op": "play"},
//!   {"event": "playing"},
//!   {"op": "advanceTo", "value": 42.0},
//!   {"op": "setQuality", "value": "q2"},
//!   {"event": "loadedmetadata"}
//! ]
//! ```

use kino_quality::{
    Error, MediaElement, PlaybackController, RawMediaEvent, SimulatedMedia, TimeRanges,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Controller operation or simulated-engine adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "camelCase")]
pub enum Operation {
    AppendTo(String),
    SetQuality(String),
    Play,
    Pause,
    Seek(f64),
    Mute,
    UnMute,
    SetVolume(f64),
    SetPlaybackRate(f64),
    /// Move the simulated playhead without a seek
    AdvanceTo(f64),
    /// Report a duration from the simulated engine
    SetDuration(f64),
    /// Replace the simulated buffered ranges
    SetBuffered(Vec<(f64, f64)>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Event(RawMediaEvent),
    Op(Operation),
}

impl std::fmt::Display for ScriptStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptStep::Event(event) => write!(f, "event {:?}", event),
            ScriptStep::Op(op) => write!(f, "op {:?}", op),
        }
    }
}

pub fn load(path: &Path) -> anyhow::Result<Vec<ScriptStep>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Apply one step. Returns a note for steps the controller refused.
pub async fn apply(
    controller: &mut PlaybackController<SimulatedMedia>,
    step: &ScriptStep,
) -> anyhow::Result<Option<String>> {
    debug!(%step, "Applying step");

    let op = match step {
        ScriptStep::Event(event) => {
            controller.handle_event(*event);
            if let Some(handle) = controller.take_resume_play() {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Resume play rejected");
                    return Ok(Some(e.to_string()));
                }
            }
            return Ok(None);
        }
        ScriptStep::Op(op) => op,
    };

    match op {
        Operation::AppendTo(container) => controller.append_to(container),
        Operation::SetQuality(name) => controller.set_quality(name),
        Operation::Play => match controller.play() {
            Ok(Some(handle)) => {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Play handle rejected");
                    return Ok(Some(e.to_string()));
                }
            }
            Ok(None) => {}
            Err(e @ Error::PlaybackRefused(_)) => return Ok(Some(e.to_string())),
            Err(e) => return Err(e.into()),
        },
        Operation::Pause => controller.pause(),
        Operation::Seek(time) => controller.seek(*time),
        Operation::Mute => controller.mute(),
        Operation::UnMute => controller.un_mute(),
        Operation::SetVolume(level) => controller.set_volume(*level),
        Operation::SetPlaybackRate(rate) => {
            controller.set_playback_rate(*rate);
            // A real element reports the change through its callback
            let reported = controller.media().playback_rate();
            controller.handle_event(RawMediaEvent::RateChange(reported));
        }
        Operation::AdvanceTo(time) => controller.media_mut().current_time = *time,
        Operation::SetDuration(duration) => controller.media_mut().duration = *duration,
        Operation::SetBuffered(ranges) => {
            controller.media_mut().buffered = ranges.iter().copied().collect::<TimeRanges>();
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kino_quality::{
        Capabilities, Localization, PlaybackState, PlayerOptions, QualityStore, SourceDescriptor,
    };

    #[test]
    fn test_parse_mixed_script() {
        let steps: Vec<ScriptStep> = serde_json::from_str(
            r#"[
                {"event": "playing"},
                {"op": "setQuality", "value": "q2"},
                {"op": "play"},
                {"op": "setBuffered", "value": [[0.0, 10.0]]}
            ]"#,
        )
        .unwrap();

        assert_eq!(steps[0], ScriptStep::Event(RawMediaEvent::Playing));
        assert_eq!(steps[1], ScriptStep::Op(Operation::SetQuality("q2".into())));
        assert_eq!(steps[2], ScriptStep::Op(Operation::Play));
        assert_eq!(
            steps[3],
            ScriptStep::Op(Operation::SetBuffered(vec![(0.0, 10.0)]))
        );
    }

    #[tokio::test]
    async fn test_apply_switch_script() {
        let mut controller = PlaybackController::new(
            vec![
                SourceDescriptor::new("a.mp4"),
                SourceDescriptor::new("b.webm"),
            ],
            PlayerOptions::default(),
            Localization::default(),
            Capabilities::default(),
            SimulatedMedia::new(),
            QualityStore::in_memory(),
        );

        let steps = vec![
            ScriptStep::Event(RawMediaEvent::LoadedMetadata),
            ScriptStep::Op(Operation::Play),
            ScriptStep::Event(RawMediaEvent::Playing),
            ScriptStep::Op(Operation::AdvanceTo(12.0)),
            ScriptStep::Op(Operation::SetQuality("q2".into())),
            ScriptStep::Op(Operation::AdvanceTo(0.0)),
            ScriptStep::Event(RawMediaEvent::LoadedMetadata),
        ];
        for step in &steps {
            assert!(apply(&mut controller, step).await.unwrap().is_none());
        }

        assert_eq!(controller.get_quality(), Some("q2"));
        assert_eq!(controller.get_current_time(), 12.0);
        assert_eq!(controller.state(), PlaybackState::Buffering);
    }

    #[tokio::test]
    async fn test_rejected_resume_is_reported() {
        let mut media = SimulatedMedia::new();
        media.async_play = true;
        media.reject_play = Some("no user gesture".into());
        let mut controller = PlaybackController::new(
            vec![
                SourceDescriptor::new("a.mp4"),
                SourceDescriptor::new("b.webm"),
            ],
            PlayerOptions::default(),
            Localization::default(),
            Capabilities::default(),
            media,
            QualityStore::in_memory(),
        );

        apply(&mut controller, &ScriptStep::Op(Operation::SetQuality("q2".into())))
            .await
            .unwrap();
        let note = apply(&mut controller, &ScriptStep::Event(RawMediaEvent::LoadedMetadata))
            .await
            .unwrap();
        assert_eq!(
            note.as_deref(),
            Some("Media engine rejected playback: no user gesture")
        );
    }

    #[tokio::test]
    async fn test_refused_play_is_reported() {
        let mut controller = PlaybackController::new(
            vec![SourceDescriptor::new("a.mp4")],
            PlayerOptions::default(),
            Localization::default(),
            Capabilities::default(),
            SimulatedMedia::new(),
            QualityStore::in_memory(),
        );
        controller.handle_event(RawMediaEvent::Error(None));

        let note = apply(&mut controller, &ScriptStep::Op(Operation::Play))
            .await
            .unwrap();
        assert_eq!(note.as_deref(), Some("Playback refused: Unknown error."));
    }
}
