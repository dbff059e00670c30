//! Slide wrapper
//!
//! A [`Slide`] owns the interaction registry for one mounted slide and is the
//! only boundary through which responses reach the hosting application. Every
//! recorded response pushes the full registry snapshot to the [`SlideHost`],
//! so a host watching the slide always sees current state rather than an
//! append-only log.
//!
//! # Example
//!
//! ```rust
//! use lumen_core::interaction::{InteractionDescriptor, InteractionKind};
//! use lumen_core::slide::{RecordingHost, Slide, SlideIds};
//! use std::sync::Arc;
//!
//! let host = Arc::new(RecordingHost::new());
//! let slide = Slide::mount(
//!     SlideIds::new("projectile-motion", "mechanics", "kinematics"),
//!     vec![InteractionDescriptor::new(
//!         "angle-drag",
//!         "kinematics.projectile",
//!         "Projectile motion",
//!         InteractionKind::Learning,
//!         "Drag the launch angle",
//!     )],
//!     host.clone(),
//! )
//! .unwrap();
//!
//! let angle = slide.tracked("angle-drag").unwrap();
//! angle.complete(angle.respond("45"));
//!
//! let seen = host.latest("projectile-motion").unwrap();
//! assert_eq!(seen.get("angle-drag").unwrap().value, "45");
//! ```

use crate::interaction::{InteractionDescriptor, InteractionResponse};
use crate::registry::InteractionRegistry;
use crate::tracked::TrackedInteraction;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use thiserror::Error;

/// Errors raised while mounting or addressing a slide
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlideError {
    /// Two descriptors on one slide share an id
    #[error("interaction '{0}' is declared more than once")]
    DuplicateInteraction(String),

    /// No descriptor with this id was declared on the slide
    #[error("interaction '{0}' is not declared on this slide")]
    UnknownInteraction(String),
}

/// Result type for slide operations
pub type Result<T> = std::result::Result<T, SlideError>;

/// Where a slide sits in the course
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideIds {
    pub slide_id: String,
    pub module_id: String,
    pub submodule_id: String,
}

impl SlideIds {
    pub fn new(
        slide_id: impl Into<String>,
        module_id: impl Into<String>,
        submodule_id: impl Into<String>,
    ) -> Self {
        Self {
            slide_id: slide_id.into(),
            module_id: module_id.into(),
            submodule_id: submodule_id.into(),
        }
    }
}

/// Receiver of slide progress, implemented by the hosting application
pub trait SlideHost: Send + Sync {
    /// Called with the full registry after every recorded response
    fn on_responses(&self, ids: &SlideIds, registry: &InteractionRegistry);
}

impl<F> SlideHost for F
where
    F: Fn(&SlideIds, &InteractionRegistry) + Send + Sync,
{
    fn on_responses(&self, ids: &SlideIds, registry: &InteractionRegistry) {
        self(ids, registry)
    }
}

/// Host that ignores all progress
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHost;

impl SlideHost for NoopHost {
    fn on_responses(&self, _ids: &SlideIds, _registry: &InteractionRegistry) {}
}

/// Host that keeps the latest registry snapshot per slide id
#[derive(Debug, Default)]
pub struct RecordingHost {
    latest: Mutex<FxHashMap<String, InteractionRegistry>>,
    updates: Mutex<usize>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot received for `slide_id`
    pub fn latest(&self, slide_id: &str) -> Option<InteractionRegistry> {
        lock(&self.latest).get(slide_id).cloned()
    }

    /// Number of snapshots received across all slides
    pub fn update_count(&self) -> usize {
        *lock(&self.updates)
    }
}

impl SlideHost for RecordingHost {
    fn on_responses(&self, ids: &SlideIds, registry: &InteractionRegistry) {
        lock(&self.latest).insert(ids.slide_id.clone(), registry.snapshot());
        *lock(&self.updates) += 1;
    }
}

struct SlideInner {
    ids: SlideIds,
    descriptors: IndexMap<String, InteractionDescriptor>,
    registry: InteractionRegistry,
    host: Arc<dyn SlideHost>,
}

/// A mounted slide and its interaction registry
///
/// Dropping the slide unmounts it and discards the registry. Tracked
/// boundaries handed out earlier stop forwarding once the slide is gone.
pub struct Slide {
    inner: Arc<Mutex<SlideInner>>,
}

impl Slide {
    /// Mount a slide with its declared interactions and an empty registry
    pub fn mount(
        ids: SlideIds,
        descriptors: impl IntoIterator<Item = InteractionDescriptor>,
        host: Arc<dyn SlideHost>,
    ) -> Result<Self> {
        let mut declared = IndexMap::new();
        for descriptor in descriptors {
            if declared.contains_key(&descriptor.id) {
                return Err(SlideError::DuplicateInteraction(descriptor.id));
            }
            declared.insert(descriptor.id.clone(), descriptor);
        }

        tracing::debug!(
            slide = %ids.slide_id,
            interactions = declared.len(),
            "slide mounted"
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(SlideInner {
                ids,
                descriptors: declared,
                registry: InteractionRegistry::new(),
                host,
            })),
        })
    }

    pub fn ids(&self) -> SlideIds {
        lock(&self.inner).ids.clone()
    }

    /// Declared descriptors in declaration order
    pub fn descriptors(&self) -> Vec<InteractionDescriptor> {
        lock(&self.inner).descriptors.values().cloned().collect()
    }

    pub fn descriptor(&self, interaction_id: &str) -> Option<InteractionDescriptor> {
        lock(&self.inner).descriptors.get(interaction_id).cloned()
    }

    /// Snapshot of the current registry
    pub fn registry(&self) -> InteractionRegistry {
        lock(&self.inner).registry.snapshot()
    }

    /// Record a response and push the updated registry to the host
    pub fn record_response(&self, response: InteractionResponse) {
        record_into(&self.inner, response);
    }

    /// Tracked boundary for a declared interaction
    pub fn tracked(&self, interaction_id: &str) -> Result<TrackedInteraction> {
        let descriptor = self
            .descriptor(interaction_id)
            .ok_or_else(|| SlideError::UnknownInteraction(interaction_id.to_string()))?;

        let slide: Weak<Mutex<SlideInner>> = Arc::downgrade(&self.inner);
        Ok(TrackedInteraction::new(descriptor, move |response| {
            match slide.upgrade() {
                Some(inner) => record_into(&inner, response),
                None => tracing::debug!(
                    interaction = %response.interaction_id,
                    "response dropped, slide already unmounted"
                ),
            }
        }))
    }
}

impl Drop for Slide {
    fn drop(&mut self) {
        let inner = lock(&self.inner);
        tracing::debug!(
            slide = %inner.ids.slide_id,
            discarded = inner.registry.len(),
            "slide unmounted"
        );
    }
}

impl std::fmt::Debug for Slide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("Slide")
            .field("ids", &inner.ids)
            .field("responses", &inner.registry.len())
            .finish_non_exhaustive()
    }
}

fn record_into(inner: &Mutex<SlideInner>, response: InteractionResponse) {
    // Notify outside the lock so hosts may read the slide back.
    let (ids, snapshot, host) = {
        let mut slide = lock(inner);
        slide.registry.record_response(response);
        (
            slide.ids.clone(),
            slide.registry.snapshot(),
            Arc::clone(&slide.host),
        )
    };
    host.on_responses(&ids, &snapshot);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
