//! Playback controller - owns the media element
//!
//! Coordinates:
//! - Quality selection from the classified source list
//! - The quality switch protocol (load, seek, resume or pause)
//! - Transport controls
//! - Normalized event emission

use crate::{
    classifier::{QualityMap, QualityOption, SourceClassifier},
    config::{Capabilities, Localization, PlayerConfig, PlayerOptions},
    events::{EventBus, PlayerEvent, RawMediaEvent},
    media::{MediaAttributes, MediaElement, PlayFuture},
    normalizer::{Effect, EventNormalizer},
    store::QualityStore,
    switch::QualitySwitch,
    types::{PlaybackState, SessionId, SourceDescriptor, TextTrack, PLAYBACK_RATES},
    Error, Result,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Quality-aware controller over a single media element
pub struct PlaybackController<M: MediaElement> {
    /// Session ID for log correlation
    id: SessionId,
    /// The element, exclusively owned
    media: M,
    /// Classified qualities
    qualities: QualityMap,
    /// Name of the active quality
    current_quality: Option<String>,
    /// Preference persistence
    store: QualityStore,
    /// Raw event state machine
    normalizer: EventNormalizer,
    /// Pending switch, if any
    switch: QualitySwitch,
    /// Observer notifications
    bus: EventBus,
    /// Play handle issued by the last switch resume, until taken
    resume_play: Option<PlayFuture>,
    ready_sent: bool,
}

impl<M: MediaElement> PlaybackController<M> {
    /// Create a controller. Sources are classified against the element's
    /// capabilities and the stored preference picks the initial quality.
    pub fn new(
        mut sources: Vec<SourceDescriptor>,
        options: PlayerOptions,
        l10n: Localization,
        capabilities: Capabilities,
        mut media: M,
        store: QualityStore,
    ) -> Self {
        let id = SessionId::new();

        let classifier = SourceClassifier::new(capabilities.preferred_format.clone());
        let qualities = classifier.classify(&mut sources, |t| media.can_play_type(t));

        let current_quality = store
            .get()
            .filter(|name| qualities.contains(name))
            .or_else(|| qualities.first_name().map(str::to_string));

        media.configure(&MediaAttributes::from(&options));

        for (index, track) in options.tracks.iter().enumerate() {
            if !track.is_valid() {
                debug!(index, "Skipping invalid track");
                continue;
            }
            media.add_track(&TextTrack {
                kind: track.kind.clone(),
                src: track.path.clone(),
                label: track.label.clone(),
                src_lang: track.src_lang.clone(),
                default: index == 0,
            });
        }

        if let Some(poster) = options.poster.as_deref() {
            media.set_poster(Some(poster));
        }

        if let Some(quality) = current_quality.as_deref().and_then(|name| qualities.get(name)) {
            media.set_src(&quality.representative.path);
        }

        info!(
            session_id = %id,
            qualities = qualities.len(),
            quality = current_quality.as_deref().unwrap_or("none"),
            "Playback controller created"
        );

        Self {
            id,
            media,
            qualities,
            current_quality,
            store,
            normalizer: EventNormalizer::new(
                l10n,
                options.start_at,
                capabilities.needs_deferred_loaded_workaround,
            ),
            switch: QualitySwitch::default(),
            bus: EventBus::default(),
            resume_play: None,
            ready_sent: false,
        }
    }

    /// Create a controller from a loaded config
    pub fn from_config(config: PlayerConfig, media: M, store: QualityStore) -> Self {
        Self::new(
            config.sources,
            config.options,
            config.l10n,
            config.capabilities,
            media,
            store,
        )
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Subscribe to normalized events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.bus.subscribe()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn qualities(&self) -> &QualityMap {
        &self.qualities
    }

    /// Announce that controls are ready. Sent once; also sent before the
    /// first media event if the host never calls it.
    pub fn ready(&mut self) {
        if !self.ready_sent {
            self.ready_sent = true;
            self.bus.publish(PlayerEvent::Ready);
        }
    }

    /// Current normalized state. `Error` while an error is displayed.
    pub fn state(&self) -> PlaybackState {
        if self.normalizer.is_error_displayed() {
            PlaybackState::Error
        } else {
            self.normalizer.last_state()
        }
    }

    pub fn is_switching(&self) -> bool {
        self.switch.is_switching()
    }

    pub fn buffering_indicator(&self) -> bool {
        self.normalizer.buffering_indicator()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.normalizer.error_message()
    }

    pub fn append_to(&mut self, container: &str) {
        self.media.append_to(container);
    }

    /// Chooser entries in display order; `None` when there is nothing to
    /// choose between.
    pub fn get_qualities(&self) -> Option<Vec<QualityOption>> {
        if self.qualities.len() < 2 {
            return None;
        }
        Some(self.qualities.reversed_entries())
    }

    pub fn get_quality(&self) -> Option<&str> {
        self.current_quality.as_deref()
    }

    /// Switch to another quality. Unknown or current names are ignored.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn set_quality(&mut self, name: &str) {
        let Some(quality) = self.qualities.get(name) else {
            debug!("Ignoring unknown quality");
            return;
        };
        if self.current_quality.as_deref() == Some(name) {
            debug!("Quality already active");
            return;
        }
        let path = quality.representative.path.clone();

        self.store.set(name);

        let captured = self
            .switch
            .begin(self.normalizer.last_state(), self.media.current_time());
        if !captured {
            warn!("Quality switch already pending, keeping original resume point");
        }

        self.current_quality = Some(name.to_string());
        self.bus.publish(PlayerEvent::QualityChange(name.to_string()));
        info!(quality = name, path = %path, "Switching quality");

        let effects = self.normalizer.transition(PlaybackState::Buffering);
        self.apply(effects);

        // Fragment time offsets are ignored on some platforms; the resume
        // seek restores the position instead.
        self.media.set_src(&path);
        self.media.set_poster(None);
    }

    /// Feed a native media element callback
    pub fn handle_event(&mut self, event: RawMediaEvent) {
        self.ready();
        let effects = self.normalizer.handle(event, self.switch.is_switching());
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => {
                    self.bus.publish(event);
                }
                Effect::SeekTo(time) => self.seek(time),
                Effect::ResumeSwitch => self.resume_switch(),
            }
        }
    }

    fn resume_switch(&mut self) {
        let Some(context) = self.switch.complete() else {
            return;
        };

        if self.normalizer.uses_deferred_loaded() {
            self.normalizer.defer_seek(context.resume_time);
        } else {
            self.seek(context.resume_time);
        }

        // Always play to get a frame
        self.resume_play = self.media.play();
        if self.resume_play.is_some() {
            debug!("Resume play resolves asynchronously");
        }
        if !context.resumes_playing() {
            self.media.pause();
        }

        self.normalizer.clear_error();

        info!(
            session_id = %self.id,
            quality = self.current_quality.as_deref().unwrap_or("none"),
            resume_time = context.resume_time,
            resume_state = %context.resume_state,
            "Quality switch complete"
        );
    }

    /// Take the play handle issued when the last quality switch resumed.
    ///
    /// Hosts with asynchronous engines await it to learn whether the resume
    /// was rejected. A handle not taken is dropped by the next switch.
    pub fn take_resume_play(&mut self) -> Option<PlayFuture> {
        self.resume_play.take()
    }

    /// Start playback. Refused while an error is displayed.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn play(&mut self) -> Result<Option<PlayFuture>> {
        if let Some(message) = self.normalizer.error_message() {
            warn!(error = message, "Play refused while error is displayed");
            return Err(Error::PlaybackRefused(message.to_string()));
        }

        if !self.normalizer.is_loaded() {
            self.media.load();
        }

        Ok(self.media.play())
    }

    pub fn pause(&mut self) {
        self.media.pause();
    }

    /// Seek to `time` seconds
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn seek(&mut self, time: f64) {
        if !self.normalizer.has_observed_state() {
            // Some engines drop a seek issued before the first play
            let _ = self.media.play();
            self.media.pause();
        }

        self.media.set_current_time(time);
    }

    pub fn get_current_time(&self) -> f64 {
        self.media.current_time()
    }

    /// Duration in seconds, `None` while unknown
    pub fn get_duration(&self) -> Option<f64> {
        let duration = self.media.duration();
        if duration.is_nan() {
            None
        } else {
            Some(duration)
        }
    }

    /// Percentage (0-100) of the media buffered in the range holding the
    /// playhead
    pub fn get_buffered(&self) -> f64 {
        let Some(duration) = self.get_duration().filter(|d| *d > 0.0) else {
            return 0.0;
        };

        self.media
            .buffered()
            .end_containing(self.media.current_time())
            .map(|end| (end / duration) * 100.0)
            .unwrap_or(0.0)
    }

    pub fn mute(&mut self) {
        self.media.set_muted(true);
    }

    pub fn un_mute(&mut self) {
        self.media.set_muted(false);
    }

    pub fn is_muted(&self) -> bool {
        self.media.muted()
    }

    /// Volume in 0-100
    pub fn get_volume(&self) -> f64 {
        self.media.volume() * 100.0
    }

    pub fn set_volume(&mut self, level: f64) {
        self.media.set_volume(level.clamp(0.0, 100.0) / 100.0);
    }

    pub fn get_playback_rates(&self) -> &'static [f64] {
        &PLAYBACK_RATES
    }

    pub fn get_playback_rate(&self) -> f64 {
        self.media.playback_rate()
    }

    /// Observers are notified through the element's rate change callback
    pub fn set_playback_rate(&mut self, rate: f64) {
        self.media.set_playback_rate(rate);
    }
}
