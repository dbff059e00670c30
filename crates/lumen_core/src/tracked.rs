//! Tracked-interaction boundary
//!
//! Associates a region of slide content with the [`InteractionDescriptor`] it
//! measures and carries the callback through which a finished response
//! reaches the slide's registry.
//!
//! The boundary is a pure pass-through: wrapped content is returned unchanged
//! and nothing checks that the callback is ever invoked.
//!
//! ```rust
//! use lumen_core::interaction::{InteractionDescriptor, InteractionKind};
//! use lumen_core::tracked::TrackedInteraction;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! let tracked = TrackedInteraction::new(
//!     InteractionDescriptor::new("slider", "forces", "Forces", InteractionKind::Learning, ""),
//!     move |response| sink.lock().unwrap().push(response),
//! );
//!
//! let panel = tracked.wrap("force diagram");
//! assert_eq!(*panel, "force diagram");
//!
//! tracked.complete(tracked.respond("25N"));
//! assert_eq!(seen.lock().unwrap()[0].interaction_id, "slider");
//! ```

use crate::interaction::{InteractionDescriptor, InteractionResponse, ResponseBuilder};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Callback receiving completed responses
pub type ResponseSink = Arc<dyn Fn(InteractionResponse) + Send + Sync>;

/// A declared interaction bound to its completion callback
#[derive(Clone)]
pub struct TrackedInteraction {
    descriptor: InteractionDescriptor,
    sink: ResponseSink,
}

impl TrackedInteraction {
    pub fn new<F>(descriptor: InteractionDescriptor, on_complete: F) -> Self
    where
        F: Fn(InteractionResponse) + Send + Sync + 'static,
    {
        Self {
            descriptor,
            sink: Arc::new(on_complete),
        }
    }

    /// Build from an already shared sink
    pub fn with_sink(descriptor: InteractionDescriptor, sink: ResponseSink) -> Self {
        Self { descriptor, sink }
    }

    pub fn descriptor(&self) -> &InteractionDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Start a response pre-filled from this boundary's descriptor
    pub fn respond(&self, value: impl Into<String>) -> ResponseBuilder {
        self.descriptor.respond(value)
    }

    /// Finish `builder` and forward the response upward
    pub fn complete(&self, builder: ResponseBuilder) {
        self.complete_with(builder.build());
    }

    /// Forward an arbitrary response unchanged
    ///
    /// The response is not checked against this boundary's descriptor.
    pub fn complete_with(&self, response: InteractionResponse) {
        if response.interaction_id != self.descriptor.id {
            tracing::debug!(
                declared = %self.descriptor.id,
                reported = %response.interaction_id,
                "response id differs from tracked interaction"
            );
        }
        (self.sink)(response);
    }

    /// Wrap content in this boundary without altering it
    pub fn wrap<C>(&self, content: C) -> Tracked<C> {
        Tracked {
            interaction_id: self.descriptor.id.clone(),
            content,
        }
    }
}

impl fmt::Debug for TrackedInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedInteraction")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Content wrapped by a [`TrackedInteraction`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tracked<C> {
    interaction_id: String,
    content: C,
}

impl<C> Tracked<C> {
    /// Id of the interaction this content belongs to
    pub fn interaction_id(&self) -> &str {
        &self.interaction_id
    }

    pub fn into_inner(self) -> C {
        self.content
    }
}

impl<C> Deref for Tracked<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.content
    }
}

impl<C> DerefMut for Tracked<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn descriptor() -> InteractionDescriptor {
        InteractionDescriptor::new(
            "mode-switch",
            "waves.superposition",
            "Superposition",
            InteractionKind::Learning,
            "Toggle between component and sum view",
        )
    }

    #[test]
    fn test_wrap_is_pass_through() {
        let tracked = TrackedInteraction::new(descriptor(), |_| {});
        let mut wrapped = tracked.wrap(vec![1, 2, 3]);

        assert_eq!(wrapped.interaction_id(), "mode-switch");
        wrapped.push(4);
        assert_eq!(wrapped.into_inner(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_wrap_does_not_invoke_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let tracked = TrackedInteraction::new(descriptor(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let _wrapped = tracked.wrap(());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_complete_forwards_prefilled_response() {
        let received = Arc::new(Mutex::new(None));
        let slot = received.clone();
        let tracked = TrackedInteraction::new(descriptor(), move |r| {
            *slot.lock().unwrap() = Some(r);
        });

        tracked.complete(tracked.respond("sum").at(5));

        let response = received.lock().unwrap().take().unwrap();
        assert_eq!(response.interaction_id, "mode-switch");
        assert_eq!(response.concept_id, "waves.superposition");
        assert_eq!(response.value, "sum");
    }

    #[test]
    fn test_complete_with_forwards_mismatched_id_unchanged() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let slot = received.clone();
        let tracked = TrackedInteraction::new(descriptor(), move |r| {
            slot.lock().unwrap().push(r);
        });

        let mut foreign = tracked.respond("x").at(0).build();
        foreign.interaction_id = "other".into();
        tracked.complete_with(foreign);

        assert_eq!(received.lock().unwrap()[0].interaction_id, "other");
    }
}
