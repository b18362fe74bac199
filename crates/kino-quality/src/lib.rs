//! Kino Quality - quality management for the Kino HTML5 player
//!
//! This crate sits between a raw media element and the player UI:
//! - Source classification into mutually exclusive qualities
//! - Preferred-quality persistence
//! - Quality switching that keeps playback position and state
//! - Normalization of native media events into a small state vocabulary
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Kino Quality                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐                             │
//! │  │    Source    │  │   Quality    │                             │
//! │  │  Classifier  │  │    Store     │                             │
//! │  └──────┬───────┘  └──────┬───────┘                             │
//! │         │                 │                                     │
//! │         └────────┬────────┘                                     │
//! │                  │                                              │
//! │           ┌──────┴──────┐        ┌──────────────┐               │
//! │           │  Playback   │◄───────│    Event     │◄── raw events │
//! │           │ Controller  │        │  Normalizer  │               │
//! │           └──────┬──────┘        └──────────────┘               │
//! │                  │                                              │
//! │           ┌──────┴──────┐        ┌──────────────┐               │
//! │           │   Media     │        │  Event Bus   │──► observers  │
//! │           │  Element    │        │              │               │
//! │           └─────────────┘        └──────────────┘               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod classifier;
pub mod store;
pub mod events;
pub mod media;
pub mod normalizer;
pub mod switch;
pub mod controller;

pub use error::{Error, MediaErrorCode, MediaErrorKind, Result};
pub use types::*;
pub use config::{Capabilities, Localization, PlayerConfig, PlayerOptions};
pub use classifier::{can_play, source_type, Quality, QualityMap, QualityOption, SourceClassifier};
pub use store::{CookieJar, FileStore, KeyValueStore, QualityStore, QUALITY_KEY};
pub use events::{EventBus, PlayerEvent, RawMediaEvent};
pub use media::{MediaAttributes, MediaCall, MediaElement, PlayFuture, SimulatedMedia};
pub use normalizer::{Effect, EventNormalizer};
pub use switch::{QualitySwitch, SwitchContext};
pub use controller::PlaybackController;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Kino Quality initialized");
}
