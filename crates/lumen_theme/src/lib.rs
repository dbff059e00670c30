//! Lumen Theme
//!
//! Light/dark theming for Lumen slides:
//!
//! - **Color scheme**: `light` / `dark`, persisted under the `theme` key
//! - **Ambient preference**: platform light/dark setting used when nothing is
//!   persisted
//! - **Transitions**: four-phase timed cross-fade run as one cancellable task
//! - **Provider / context**: an explicitly owned state handle with
//!   thread-scoped lookup for consumers
//!
//! # Example
//!
//! ```rust
//! use lumen_core::store::MemoryStore;
//! use lumen_theme::{provide, use_theme, FixedAmbient, ThemeProvider, TransitionTimings};
//! use std::sync::Arc;
//!
//! let provider = ThemeProvider::new(
//!     Arc::new(MemoryStore::new()),
//!     &FixedAmbient(None),
//!     TransitionTimings::default(),
//! );
//!
//! let _scope = provide(provider.context());
//! let theme = use_theme().unwrap();
//! assert!(!theme.is_dark_mode().unwrap());
//! ```

pub mod platform;
pub mod provider;
pub mod scheme;
pub mod transition;

use thiserror::Error;

pub use platform::{AmbientPreference, FixedAmbient, SystemAmbient};
pub use provider::{
    provide, resolve_initial_scheme, resolve_initial_scheme_with_source, use_theme, SchemeSource,
    StartedTransition, SubscriptionId, ThemeContext, ThemeProvider, ThemeScope, TransitionHandle,
    TransitionOutcome,
};
pub use scheme::{ColorScheme, ParseSchemeError, THEME_KEY};
pub use transition::{ThemeState, ThemeTransition, TransitionPhase, TransitionTimings};

/// Errors from theme context use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeError {
    /// `use_theme()` called with no provider in scope
    #[error("use_theme() called outside of a theme provider scope")]
    MissingProvider,

    /// The provider behind a context has been dropped
    #[error("theme provider has been dropped")]
    ProviderDropped,

    /// Transitions need a tokio runtime to run their timers
    #[error("theme transitions must be started from within a tokio runtime")]
    NoRuntime,

    /// The transition task ended before finishing its sequence
    #[error("theme transition was cancelled before completing")]
    Cancelled,
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;
