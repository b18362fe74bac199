//! Media element seam
//!
//! The controller drives exactly one [`MediaElement`]. Hosts implement the
//! trait over their native element and forward its callbacks as
//! [`crate::RawMediaEvent`]s. [`SimulatedMedia`] is a deterministic
//! in-process element used by tests and the CLI.

use crate::{
    config::PlayerOptions,
    types::{CanPlay, TextTrack, TimeRanges},
    Error, Result,
};
use std::future::Future;
use std::pin::Pin;

/// Handle returned by an asynchronous play call
pub type PlayFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Element attributes derived from the options bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttributes {
    pub controls: bool,
    pub autoplay: bool,
    pub loop_playback: bool,
    pub fit: bool,
    /// Inline playback on iOS
    pub plays_inline: bool,
    pub preload: &'static str,
    /// Suppress the context menu so it cannot expose native controls
    pub context_menu_disabled: bool,
}

impl From<&PlayerOptions> for MediaAttributes {
    fn from(options: &PlayerOptions) -> Self {
        Self {
            controls: options.controls,
            autoplay: options.autoplay,
            loop_playback: options.loop_playback,
            fit: options.fit,
            plays_inline: true,
            preload: "metadata",
            context_menu_disabled: !options.controls,
        }
    }
}

/// The underlying media element
pub trait MediaElement {
    /// Attach the element to a host container
    fn append_to(&mut self, container: &str);

    fn configure(&mut self, attributes: &MediaAttributes);

    fn set_src(&mut self, path: &str);

    fn load(&mut self);

    /// Start playback. Returns a handle when the engine resolves play
    /// asynchronously.
    fn play(&mut self) -> Option<PlayFuture>;

    fn pause(&mut self);

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, time: f64);

    /// Duration in seconds, NaN while unknown
    fn duration(&self) -> f64;

    fn buffered(&self) -> TimeRanges;

    fn muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Volume in 0.0..=1.0
    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);

    /// Set or remove the poster image
    fn set_poster(&mut self, poster: Option<&str>);

    fn add_track(&mut self, track: &TextTrack);

    fn can_play_type(&self, type_string: &str) -> CanPlay;
}

/// Operation recorded by [`SimulatedMedia`]
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    AppendTo(String),
    Configure,
    SetSrc(String),
    Load,
    Play,
    Pause,
    Seek(f64),
    SetMuted(bool),
    SetVolume(f64),
    SetPlaybackRate(f64),
    SetPoster(Option<String>),
    AddTrack(String),
}

/// Scripted media element
#[derive(Debug)]
pub struct SimulatedMedia {
    pub src: Option<String>,
    pub container: Option<String>,
    pub attributes: Option<MediaAttributes>,
    pub poster: Option<String>,
    pub tracks: Vec<TextTrack>,
    pub paused: bool,
    pub current_time: f64,
    pub duration: f64,
    pub buffered: TimeRanges,
    pub muted: bool,
    pub volume: f64,
    pub playback_rate: f64,
    /// Return a play handle instead of playing synchronously
    pub async_play: bool,
    /// Reason the asynchronous play handle rejects with
    pub reject_play: Option<String>,
    /// MIME prefixes the engine accepts
    pub supported: Vec<(String, CanPlay)>,
    calls: Vec<MediaCall>,
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self {
            src: None,
            container: None,
            attributes: None,
            poster: None,
            tracks: Vec::new(),
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            buffered: TimeRanges::new(),
            muted: false,
            volume: 1.0,
            playback_rate: 1.0,
            async_play: false,
            reject_play: None,
            supported: vec![
                ("video/mp4".to_string(), CanPlay::Probably),
                ("video/webm".to_string(), CanPlay::Probably),
                ("video/ogg".to_string(), CanPlay::Maybe),
            ],
            calls: Vec::new(),
        }
    }
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine accepting only the given MIME prefixes
    pub fn supporting(types: &[&str]) -> Self {
        Self {
            supported: types
                .iter()
                .map(|t| (t.to_string(), CanPlay::Probably))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[MediaCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl MediaElement for SimulatedMedia {
    fn append_to(&mut self, container: &str) {
        self.container = Some(container.to_string());
        self.calls.push(MediaCall::AppendTo(container.to_string()));
    }

    fn configure(&mut self, attributes: &MediaAttributes) {
        self.attributes = Some(attributes.clone());
        self.calls.push(MediaCall::Configure);
    }

    fn set_src(&mut self, path: &str) {
        self.src = Some(path.to_string());
        self.duration = f64::NAN;
        self.calls.push(MediaCall::SetSrc(path.to_string()));
    }

    fn load(&mut self) {
        self.calls.push(MediaCall::Load);
    }

    fn play(&mut self) -> Option<PlayFuture> {
        self.paused = false;
        self.calls.push(MediaCall::Play);
        if self.async_play {
            let rejection = self.reject_play.clone();
            Some(Box::pin(async move {
                match rejection {
                    Some(reason) => Err(Error::PlayRejected(reason)),
                    None => Ok(()),
                }
            }))
        } else {
            None
        }
    }

    fn pause(&mut self) {
        self.paused = true;
        self.calls.push(MediaCall::Pause);
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, time: f64) {
        self.current_time = time;
        self.calls.push(MediaCall::Seek(time));
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn buffered(&self) -> TimeRanges {
        self.buffered.clone()
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.calls.push(MediaCall::SetMuted(muted));
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        self.calls.push(MediaCall::SetVolume(volume));
    }

    fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
        self.calls.push(MediaCall::SetPlaybackRate(rate));
    }

    fn set_poster(&mut self, poster: Option<&str>) {
        self.poster = poster.map(str::to_string);
        self.calls.push(MediaCall::SetPoster(self.poster.clone()));
    }

    fn add_track(&mut self, track: &TextTrack) {
        self.tracks.push(track.clone());
        self.calls.push(MediaCall::AddTrack(track.kind.clone()));
    }

    fn can_play_type(&self, type_string: &str) -> CanPlay {
        self.supported
            .iter()
            .find(|(prefix, _)| type_string.starts_with(prefix.as_str()))
            .map(|(_, answer)| *answer)
            .unwrap_or(CanPlay::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_from_options() {
        let options = PlayerOptions {
            controls: false,
            loop_playback: true,
            ..Default::default()
        };
        let attributes = MediaAttributes::from(&options);
        assert!(attributes.loop_playback);
        assert!(attributes.plays_inline);
        assert!(attributes.context_menu_disabled);
        assert_eq!(attributes.preload, "metadata");
    }

    #[test]
    fn test_simulated_capabilities() {
        let media = SimulatedMedia::supporting(&["video/webm"]);
        assert_eq!(media.can_play_type("video/webm; codecs=\"vp9\""), CanPlay::Probably);
        assert_eq!(media.can_play_type("video/mp4"), CanPlay::Empty);
    }

    #[test]
    fn test_new_source_resets_duration() {
        let mut media = SimulatedMedia::new();
        media.duration = 60.0;
        media.set_src("b.mp4");
        assert!(media.duration().is_nan());
        assert_eq!(media.calls(), &[MediaCall::SetSrc("b.mp4".into())]);
    }
}
