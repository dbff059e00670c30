//! Theme transition state machine
//!
//! A scheme change is an explicit four-phase sequence run strictly in order:
//!
//! | phase        | default delay | effect                      |
//! |--------------|---------------|-----------------------------|
//! | `OverlayOn`  | 50 ms         | cross-fade overlay shown    |
//! | `Flip`       | 150 ms        | `is_dark_mode` switched     |
//! | `OverlayOff` | 600 ms        | overlay hidden              |
//! | `Settle`     | 300 ms        | `is_transitioning` cleared  |
//!
//! [`ThemeTransition`] only computes steps; the provider owns the timers.
//!
//! ```rust
//! use lumen_theme::scheme::ColorScheme;
//! use lumen_theme::transition::{ThemeState, ThemeTransition, TransitionTimings};
//!
//! let mut state = ThemeState::new(ColorScheme::Light);
//! let timings = TransitionTimings::default();
//! let mut transition = ThemeTransition::begin(&mut state, ColorScheme::Dark, timings);
//! assert!(state.is_transitioning);
//!
//! while let Some((phase, _delay)) = transition.next_step() {
//!     transition.apply(phase, &mut state);
//! }
//! assert!(state.is_dark_mode);
//! assert!(!state.is_transitioning);
//! ```

use crate::scheme::ColorScheme;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Observable theme state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeState {
    pub is_dark_mode: bool,
    pub is_transitioning: bool,
    /// Cross-fade overlay visibility
    pub overlay_active: bool,
}

impl ThemeState {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            is_dark_mode: scheme.is_dark(),
            is_transitioning: false,
            overlay_active: false,
        }
    }

    pub fn scheme(&self) -> ColorScheme {
        ColorScheme::from_dark(self.is_dark_mode)
    }

    /// Back to idle in the current scheme
    pub fn settle(&mut self) {
        self.is_transitioning = false;
        self.overlay_active = false;
    }
}

/// One step of a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    OverlayOn,
    Flip,
    OverlayOff,
    Settle,
}

impl TransitionPhase {
    pub const SEQUENCE: [TransitionPhase; 4] = [
        TransitionPhase::OverlayOn,
        TransitionPhase::Flip,
        TransitionPhase::OverlayOff,
        TransitionPhase::Settle,
    ];
}

/// Delay before each phase, in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTimings {
    pub overlay_on_ms: u64,
    pub flip_ms: u64,
    pub overlay_off_ms: u64,
    pub settle_ms: u64,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            overlay_on_ms: 50,
            flip_ms: 150,
            overlay_off_ms: 600,
            settle_ms: 300,
        }
    }
}

impl TransitionTimings {
    /// All phases back to back with no delay
    pub fn instant() -> Self {
        Self {
            overlay_on_ms: 0,
            flip_ms: 0,
            overlay_off_ms: 0,
            settle_ms: 0,
        }
    }

    pub fn delay(&self, phase: TransitionPhase) -> Duration {
        let ms = match phase {
            TransitionPhase::OverlayOn => self.overlay_on_ms,
            TransitionPhase::Flip => self.flip_ms,
            TransitionPhase::OverlayOff => self.overlay_off_ms,
            TransitionPhase::Settle => self.settle_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn total(&self) -> Duration {
        TransitionPhase::SEQUENCE
            .iter()
            .map(|&phase| self.delay(phase))
            .sum()
    }
}

/// An in-progress change from one scheme to another
#[derive(Clone, Debug)]
pub struct ThemeTransition {
    from: ColorScheme,
    to: ColorScheme,
    timings: TransitionTimings,
    cursor: usize,
}

impl ThemeTransition {
    /// Enter the transitioning state
    pub fn begin(state: &mut ThemeState, to: ColorScheme, timings: TransitionTimings) -> Self {
        let from = state.scheme();
        state.is_transitioning = true;
        Self {
            from,
            to,
            timings,
            cursor: 0,
        }
    }

    pub fn from(&self) -> ColorScheme {
        self.from
    }

    pub fn to(&self) -> ColorScheme {
        self.to
    }

    /// Next phase and the delay to wait before applying it
    pub fn next_step(&mut self) -> Option<(TransitionPhase, Duration)> {
        let phase = *TransitionPhase::SEQUENCE.get(self.cursor)?;
        self.cursor += 1;
        Some((phase, self.timings.delay(phase)))
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= TransitionPhase::SEQUENCE.len()
    }

    pub fn apply(&self, phase: TransitionPhase, state: &mut ThemeState) {
        match phase {
            TransitionPhase::OverlayOn => state.overlay_active = true,
            TransitionPhase::Flip => state.is_dark_mode = self.to.is_dark(),
            TransitionPhase::OverlayOff => state.overlay_active = false,
            TransitionPhase::Settle => state.is_transitioning = false,
        }
    }
}
