//! Quality switch state machine
//!
//! A switch spans the gap between assigning a new source and the element's
//! `loadedmetadata` callback. The resume point is captured when the first
//! switch begins; switches that arrive while one is pending only change the
//! target quality and resume at the originally captured point.

use crate::types::PlaybackState;

/// Resume point captured when a switch begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchContext {
    /// Last observed state before the switch
    pub resume_state: PlaybackState,
    /// Playback position before the switch
    pub resume_time: f64,
}

impl SwitchContext {
    /// Playback continues after the reload only if it was playing before
    pub fn resumes_playing(&self) -> bool {
        self.resume_state == PlaybackState::Playing
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum QualitySwitch {
    #[default]
    Idle,
    Switching(SwitchContext),
}

impl QualitySwitch {
    pub fn is_switching(&self) -> bool {
        matches!(self, QualitySwitch::Switching(_))
    }

    /// Begin a switch. Returns true if a new context was captured, false if a
    /// switch was already pending and its resume point kept.
    pub fn begin(&mut self, state: PlaybackState, time: f64) -> bool {
        match self {
            QualitySwitch::Idle => {
                *self = QualitySwitch::Switching(SwitchContext {
                    resume_state: state,
                    resume_time: time,
                });
                true
            }
            QualitySwitch::Switching(_) => false,
        }
    }

    pub fn context(&self) -> Option<&SwitchContext> {
        match self {
            QualitySwitch::Switching(context) => Some(context),
            QualitySwitch::Idle => None,
        }
    }

    /// Finish the pending switch, returning its resume point
    pub fn complete(&mut self) -> Option<SwitchContext> {
        match std::mem::take(self) {
            QualitySwitch::Switching(context) => Some(context),
            QualitySwitch::Idle => None,
        }
    }
}
