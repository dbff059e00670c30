//! Lumen Core
//!
//! Shared runtime pieces behind every Lumen lesson slide:
//!
//! - **Interactions**: descriptors declared per slide and the responses
//!   learners produce
//! - **Registry**: latest response per interaction id, last write wins
//! - **Tracked boundaries**: pair a region of content with its descriptor and
//!   completion callback
//! - **Slides**: mount/unmount lifecycle and the host-facing progress boundary
//! - **Quiz flow**: one reusable multiple-choice state machine
//! - **Preference stores**: small persisted key-value settings
//!
//! # Example
//!
//! ```rust
//! use lumen_core::prelude::*;
//! use std::sync::Arc;
//!
//! let descriptor = InteractionDescriptor::new(
//!     "freefall-q1",
//!     "kinematics.freefall",
//!     "Free fall",
//!     InteractionKind::Judging,
//!     "Acceleration near the surface",
//! );
//!
//! let host = Arc::new(RecordingHost::new());
//! let slide = Slide::mount(
//!     SlideIds::new("freefall", "mechanics", "kinematics"),
//!     vec![descriptor.clone()],
//!     host.clone(),
//! )
//! .unwrap();
//!
//! let mut quiz = QuizMachine::new(QuizConfig::new(vec![McqQuestion::new(
//!     "What is g on Earth?",
//!     ["1.6 m/s²", "9.8 m/s²", "24.8 m/s²"],
//!     1,
//! )
//! .tracked_by(descriptor)]))
//! .unwrap();
//!
//! quiz.select(1).unwrap();
//! if let Some(response) = quiz.submit().unwrap() {
//!     slide.record_response(response);
//! }
//!
//! let registry = host.latest("freefall").unwrap();
//! assert_eq!(registry.get("freefall-q1").unwrap().is_correct, Some(true));
//! ```

pub mod interaction;
pub mod quiz;
pub mod registry;
pub mod slide;
pub mod store;
pub mod tracked;

pub use interaction::{
    now_millis, InteractionDescriptor, InteractionKind, InteractionResponse, QuestionMeta,
    ResponseBuilder,
};
pub use quiz::{
    McqQuestion, QuestionResult, QuizConfig, QuizError, QuizEvent, QuizMachine, QuizPhase,
    ScoringPolicy,
};
pub use registry::{GradedTally, InteractionRegistry};
pub use slide::{NoopHost, RecordingHost, Slide, SlideError, SlideHost, SlideIds};
pub use store::{JsonFileStore, MemoryStore, PreferenceStore, StoreError};
pub use tracked::{ResponseSink, Tracked, TrackedInteraction};

/// Common imports for slide authors
pub mod prelude {
    pub use crate::interaction::{InteractionDescriptor, InteractionKind, InteractionResponse};
    pub use crate::quiz::{McqQuestion, QuizConfig, QuizEvent, QuizMachine, QuizPhase};
    pub use crate::registry::InteractionRegistry;
    pub use crate::slide::{RecordingHost, Slide, SlideHost, SlideIds};
    pub use crate::tracked::TrackedInteraction;
}
