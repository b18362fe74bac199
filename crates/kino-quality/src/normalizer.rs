//! Media event normalization
//!
//! An explicit state machine fed with [`RawMediaEvent`]s. It never touches
//! the element: every consequence is returned as an [`Effect`] for the
//! controller to apply, so it can be driven with synthetic events alone.

use crate::{
    config::Localization,
    error::MediaErrorKind,
    events::{PlayerEvent, RawMediaEvent},
    types::PlaybackState,
};
use tracing::{debug, warn};

/// Consequence of a raw event
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Notify observers
    Emit(PlayerEvent),
    /// Move the playhead
    SeekTo(f64),
    /// Metadata for a switched source arrived; run the resume protocol
    ResumeSwitch,
}

#[derive(Debug, Clone)]
pub struct EventNormalizer {
    l10n: Localization,
    /// Defer `loaded` and resume seeks until the next duration change
    deferred_loaded_workaround: bool,
    last_state: PlaybackState,
    start_at: Option<f64>,
    loaded: bool,
    loaded_pending: bool,
    deferred_seek: Option<f64>,
    error_message: Option<String>,
    buffering_indicator: bool,
}

impl EventNormalizer {
    pub fn new(l10n: Localization, start_at: Option<f64>, deferred_loaded_workaround: bool) -> Self {
        Self {
            l10n,
            deferred_loaded_workaround,
            last_state: PlaybackState::Unstarted,
            start_at: start_at.filter(|t| *t > 0.0),
            loaded: false,
            loaded_pending: false,
            deferred_seek: None,
            error_message: None,
            buffering_indicator: false,
        }
    }

    /// Last emitted state, `Unstarted` before any
    pub fn last_state(&self) -> PlaybackState {
        self.last_state
    }

    /// True once any state has been observed
    pub fn has_observed_state(&self) -> bool {
        self.last_state != PlaybackState::Unstarted
    }

    /// True once metadata has loaded for some source
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_error_displayed(&self) -> bool {
        self.error_message.is_some()
    }

    /// Whether the buffering indicator should be shown
    pub fn buffering_indicator(&self) -> bool {
        self.buffering_indicator
    }

    pub fn pending_start_at(&self) -> Option<f64> {
        self.start_at
    }

    pub fn uses_deferred_loaded(&self) -> bool {
        self.deferred_loaded_workaround
    }

    pub fn clear_error(&mut self) {
        if self.error_message.take().is_some() {
            debug!("Error indicator cleared");
        }
    }

    /// Hold a resume seek until the next duration change
    pub fn defer_seek(&mut self, time: f64) {
        self.deferred_seek = Some(time);
    }

    /// Record a state transition, applying the dedup rule.
    ///
    /// Returns the effects to apply, empty if `state` repeats the last
    /// emitted state.
    pub fn transition(&mut self, state: PlaybackState) -> Vec<Effect> {
        if state == self.last_state {
            debug!(state = %state, "Duplicate state suppressed");
            return Vec::new();
        }

        let mut effects = Vec::with_capacity(2);
        if state == PlaybackState::Playing {
            if let Some(start_at) = self.start_at.take() {
                debug!(start_at, "Applying start offset");
                effects.push(Effect::SeekTo(start_at));
            }
        }

        self.last_state = state;
        self.buffering_indicator = state == PlaybackState::Buffering;
        effects.push(Effect::Emit(PlayerEvent::StateChange(state)));
        effects
    }

    /// Consume one raw event. `switching` is true while a quality switch is
    /// pending.
    pub fn handle(&mut self, event: RawMediaEvent, switching: bool) -> Vec<Effect> {
        debug!(?event, switching, "Media event");
        match event {
            RawMediaEvent::Ended => self.transition(PlaybackState::Ended),
            RawMediaEvent::Playing => self.transition(PlaybackState::Playing),
            RawMediaEvent::Pause => self.transition(PlaybackState::Paused),
            RawMediaEvent::Waiting => self.transition(PlaybackState::Buffering),
            RawMediaEvent::LoadedMetadata => self.on_loaded_metadata(switching),
            RawMediaEvent::DurationChange => self.on_duration_change(),
            RawMediaEvent::RateChange(rate) => {
                vec![Effect::Emit(PlayerEvent::PlaybackRateChange(rate))]
            }
            RawMediaEvent::Error(code) => {
                let kind = MediaErrorKind::from(code);
                let message = self.l10n.message(kind).to_string();
                warn!(kind = %kind, message = %message, "Media error");

                self.buffering_indicator = false;
                self.error_message = Some(message.clone());
                vec![Effect::Emit(PlayerEvent::Error(message))]
            }
        }
    }

    fn on_loaded_metadata(&mut self, switching: bool) -> Vec<Effect> {
        self.loaded = true;

        if switching {
            debug!("Loaded suppressed during quality switch");
            return vec![Effect::ResumeSwitch];
        }

        self.clear_error();

        if self.deferred_loaded_workaround {
            debug!("Loaded deferred until duration change");
            self.loaded_pending = true;
            return Vec::new();
        }

        vec![Effect::Emit(PlayerEvent::Loaded)]
    }

    fn on_duration_change(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(time) = self.deferred_seek.take() {
            effects.push(Effect::SeekTo(time));
        }
        if std::mem::take(&mut self.loaded_pending) {
            effects.push(Effect::Emit(PlayerEvent::Loaded));
        }
        effects
    }
}
