//! Theme provider and context handles
//!
//! [`ThemeProvider`] owns the theme state for its lifetime. Consumers get a
//! [`ThemeContext`] handle from it, either passed explicitly or installed for
//! the current thread with [`provide`] and read back with [`use_theme`].
//!
//! Transitions run as a spawned tokio task that walks a
//! [`ThemeTransition`] phase by phase. Only one transition may be in flight;
//! triggers while busy are ignored and reported as
//! [`TransitionOutcome::Busy`]. Dropping the provider aborts an in-flight
//! transition.
//!
//! ```rust
//! use lumen_core::store::{MemoryStore, PreferenceStore};
//! use lumen_theme::platform::FixedAmbient;
//! use lumen_theme::provider::{ThemeProvider, TransitionOutcome};
//! use lumen_theme::scheme::ColorScheme;
//! use lumen_theme::transition::TransitionTimings;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! let ambient = FixedAmbient(None);
//! let provider = ThemeProvider::new(store.clone(), &ambient, TransitionTimings::instant());
//! let theme = provider.context();
//!
//! assert!(!theme.is_dark_mode().unwrap());
//! let outcome = theme.toggle().await.unwrap();
//! assert_eq!(outcome, TransitionOutcome::Completed(ColorScheme::Dark));
//! assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
//! # });
//! ```

use crate::platform::AmbientPreference;
use crate::scheme::{ColorScheme, THEME_KEY};
use crate::transition::{ThemeState, ThemeTransition, TransitionPhase, TransitionTimings};
use crate::{Result, ThemeError};
use lumen_core::store::PreferenceStore;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Callback invoked with the new state after every change
pub type ThemeCallback = Box<dyn Fn(&ThemeState) + Send + Sync>;

/// Result of a theme change request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Full sequence ran; the scheme is now the contained value
    Completed(ColorScheme),
    /// Already in the requested scheme, nothing ran
    Unchanged,
    /// Another transition was in flight, request ignored
    Busy,
}

/// Identifier returned by [`ThemeContext::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct ThemeShared {
    state: RwLock<ThemeState>,
    store: Arc<dyn PreferenceStore>,
    timings: TransitionTimings,
    subscribers: RwLock<Vec<(SubscriptionId, ThemeCallback)>>,
    next_subscription: AtomicU64,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl ThemeShared {
    fn read(&self) -> ThemeState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` to the state and notify subscribers with the result
    fn update(&self, f: impl FnOnce(&mut ThemeState)) -> ThemeState {
        let state = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut state);
            *state
        };
        self.notify(&state);
        state
    }

    fn notify(&self, state: &ThemeState) {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in subscribers.iter() {
            callback(state);
        }
    }

    fn persist(&self, scheme: ColorScheme) {
        if let Err(err) = self.store.set(THEME_KEY, scheme.as_str()) {
            tracing::warn!("failed to persist theme '{}': {}", scheme, err);
        }
    }

    fn inflight(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Where the startup scheme came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeSource {
    /// Valid value under the `theme` key
    Persisted,
    /// Platform light/dark preference
    Ambient,
    /// Neither was available
    Default,
}

impl std::fmt::Display for SchemeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SchemeSource::Persisted => "persisted",
            SchemeSource::Ambient => "system preference",
            SchemeSource::Default => "default",
        })
    }
}

/// Pick the startup scheme: persisted value, then ambient preference, then light
pub fn resolve_initial_scheme(
    store: &dyn PreferenceStore,
    ambient: &dyn AmbientPreference,
) -> ColorScheme {
    resolve_initial_scheme_with_source(store, ambient).0
}

/// Like [`resolve_initial_scheme`], also reporting which source won
pub fn resolve_initial_scheme_with_source(
    store: &dyn PreferenceStore,
    ambient: &dyn AmbientPreference,
) -> (ColorScheme, SchemeSource) {
    match store.get(THEME_KEY) {
        Ok(Some(value)) => match value.parse() {
            Ok(scheme) => return (scheme, SchemeSource::Persisted),
            Err(err) => tracing::warn!("ignoring persisted theme: {}", err),
        },
        Ok(None) => {}
        Err(err) => tracing::warn!("failed to read persisted theme: {}", err),
    }

    match ambient.preferred_scheme() {
        Some(scheme) => (scheme, SchemeSource::Ambient),
        None => (ColorScheme::default(), SchemeSource::Default),
    }
}

/// Owner of the theme state
///
/// Holds the only strong reference to the shared state. Contexts created from
/// it stop working once it is dropped.
pub struct ThemeProvider {
    shared: Arc<ThemeShared>,
}

impl ThemeProvider {
    /// Create a provider, resolving the initial scheme once
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        ambient: &dyn AmbientPreference,
        timings: TransitionTimings,
    ) -> Self {
        let scheme = resolve_initial_scheme(store.as_ref(), ambient);
        tracing::debug!(%scheme, "theme provider initialized");

        Self {
            shared: Arc::new(ThemeShared {
                state: RwLock::new(ThemeState::new(scheme)),
                store,
                timings,
                subscribers: RwLock::new(Vec::new()),
                next_subscription: AtomicU64::new(0),
                inflight: Mutex::new(None),
            }),
        }
    }

    /// Handle for consumers
    pub fn context(&self) -> ThemeContext {
        ThemeContext {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn state(&self) -> ThemeState {
        self.shared.read()
    }

    pub fn timings(&self) -> TransitionTimings {
        self.shared.timings
    }
}

impl Drop for ThemeProvider {
    fn drop(&mut self) {
        if let Some(handle) = self.shared.inflight().take() {
            if !handle.is_finished() {
                tracing::debug!("theme provider dropped mid-transition, aborting");
                handle.abort();
            }
        }
        self.shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .settle();
    }
}

impl std::fmt::Debug for ThemeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeProvider")
            .field("state", &self.shared.read())
            .field("timings", &self.shared.timings)
            .finish_non_exhaustive()
    }
}

/// A transition that has been started
///
/// The transition keeps running if this handle is dropped.
#[derive(Debug)]
pub struct TransitionHandle {
    target: ColorScheme,
    done: oneshot::Receiver<ColorScheme>,
}

impl TransitionHandle {
    pub fn target(&self) -> ColorScheme {
        self.target
    }

    /// Wait for the full sequence to finish
    pub async fn wait(self) -> Result<ColorScheme> {
        self.done.await.map_err(|_| ThemeError::Cancelled)
    }
}

/// Result of [`ThemeContext::start`]
#[derive(Debug)]
pub enum StartedTransition {
    Running(TransitionHandle),
    Unchanged,
    Busy,
}

/// Cheap handle to a provider's theme state
#[derive(Clone)]
pub struct ThemeContext {
    shared: Weak<ThemeShared>,
}

impl ThemeContext {
    fn shared(&self) -> Result<Arc<ThemeShared>> {
        self.shared.upgrade().ok_or(ThemeError::ProviderDropped)
    }

    pub fn state(&self) -> Result<ThemeState> {
        Ok(self.shared()?.read())
    }

    pub fn is_dark_mode(&self) -> Result<bool> {
        Ok(self.state()?.is_dark_mode)
    }

    pub fn is_transitioning(&self) -> Result<bool> {
        Ok(self.state()?.is_transitioning)
    }

    pub fn scheme(&self) -> Result<ColorScheme> {
        Ok(self.state()?.scheme())
    }

    /// Run `callback` after every state change
    ///
    /// Callbacks run while the subscriber list is locked and must not
    /// subscribe or unsubscribe themselves.
    pub fn subscribe<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: Fn(&ThemeState) + Send + Sync + 'static,
    {
        let shared = self.shared()?;
        let id = SubscriptionId(shared.next_subscription.fetch_add(1, Ordering::Relaxed));
        shared
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Box::new(callback)));
        Ok(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        self.shared()?
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(sub, _)| *sub != id);
        Ok(())
    }

    /// Switch to the opposite scheme and wait for the transition
    pub async fn toggle(&self) -> Result<TransitionOutcome> {
        let target = self.scheme()?.toggled();
        self.set_scheme(target).await
    }

    pub async fn set_dark_mode(&self, dark: bool) -> Result<TransitionOutcome> {
        self.set_scheme(ColorScheme::from_dark(dark)).await
    }

    /// Transition to `target` and wait for the full sequence
    pub async fn set_scheme(&self, target: ColorScheme) -> Result<TransitionOutcome> {
        match self.start(target)? {
            StartedTransition::Running(handle) => {
                Ok(TransitionOutcome::Completed(handle.wait().await?))
            }
            StartedTransition::Unchanged => Ok(TransitionOutcome::Unchanged),
            StartedTransition::Busy => Ok(TransitionOutcome::Busy),
        }
    }

    /// Start a transition to `target` without waiting for it
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, target: ColorScheme) -> Result<StartedTransition> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ThemeError::NoRuntime)?;
        let shared = self.shared()?;

        let transition = {
            let mut state = shared.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.is_transitioning {
                tracing::debug!(%target, "theme transition already running, request ignored");
                return Ok(StartedTransition::Busy);
            }
            if state.scheme() == target {
                return Ok(StartedTransition::Unchanged);
            }
            ThemeTransition::begin(&mut state, target, shared.timings)
        };
        shared.notify(&shared.read());

        tracing::debug!(from = %transition.from(), to = %target, "theme transition started");

        let (done_tx, done_rx) = oneshot::channel();
        let task = run_transition(Arc::downgrade(&shared), transition, done_tx);
        *shared.inflight() = Some(runtime.spawn(task));

        Ok(StartedTransition::Running(TransitionHandle {
            target,
            done: done_rx,
        }))
    }
}

impl std::fmt::Debug for ThemeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeContext")
            .field("attached", &(self.shared.strong_count() > 0))
            .finish()
    }
}

/// Settles the state if a transition task stops before its last phase
struct SettleOnExit {
    shared: Weak<ThemeShared>,
    finished: bool,
}

impl Drop for SettleOnExit {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let Some(owner) = self.shared.upgrade() else {
            return;
        };
        tracing::debug!("theme transition ended early, settling state");
        let state = {
            let mut state = owner.state.write().unwrap_or_else(PoisonError::into_inner);
            state.settle();
            *state
        };
        // A subscriber may be what failed; don't call back into it mid-unwind.
        if !std::thread::panicking() {
            owner.notify(&state);
        }
    }
}

async fn run_transition(
    shared: Weak<ThemeShared>,
    mut transition: ThemeTransition,
    done: oneshot::Sender<ColorScheme>,
) {
    let mut guard = SettleOnExit {
        shared: shared.clone(),
        finished: false,
    };

    while let Some((phase, delay)) = transition.next_step() {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        // Provider gone: drop `done` so waiters see the cancellation.
        let Some(owner) = shared.upgrade() else {
            return;
        };
        owner.update(|state| transition.apply(phase, state));
        if phase == TransitionPhase::Flip {
            owner.persist(transition.to());
        }
        tracing::trace!(?phase, "theme transition phase applied");
    }

    guard.finished = true;
    tracing::debug!(scheme = %transition.to(), "theme transition finished");
    let _ = done.send(transition.to());
}

thread_local! {
    static THEME_SCOPE: RefCell<Vec<(u64, ThemeContext)>> = const { RefCell::new(Vec::new()) };
    static NEXT_SCOPE_ID: Cell<u64> = const { Cell::new(0) };
}

/// Guard returned by [`provide`]; removes its context when dropped
#[must_use = "the theme context is removed as soon as the scope guard is dropped"]
pub struct ThemeScope {
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ThemeScope {
    fn drop(&mut self) {
        // Guards may be dropped out of order; remove exactly our own entry.
        THEME_SCOPE.with(|scope| {
            let mut scope = scope.borrow_mut();
            if let Some(pos) = scope.iter().rposition(|(id, _)| *id == self.id) {
                scope.remove(pos);
            }
        });
    }
}

/// Make `context` available to [`use_theme`] on this thread
///
/// Scopes nest; the innermost live one wins.
pub fn provide(context: ThemeContext) -> ThemeScope {
    let id = NEXT_SCOPE_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    THEME_SCOPE.with(|scope| scope.borrow_mut().push((id, context)));
    ThemeScope {
        id,
        _not_send: PhantomData,
    }
}

/// The innermost provided theme context
///
/// Fails with [`ThemeError::MissingProvider`] outside any [`provide`] scope.
pub fn use_theme() -> Result<ThemeContext> {
    THEME_SCOPE
        .with(|scope| scope.borrow().last().map(|(_, context)| context.clone()))
        .ok_or(ThemeError::MissingProvider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FixedAmbient;
    use lumen_core::store::{MemoryStore, StoreError};
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn provider_with(
        persisted: Option<&str>,
        ambient: Option<ColorScheme>,
    ) -> (ThemeProvider, Arc<MemoryStore>) {
        let store = Arc::new(match persisted {
            Some(value) => MemoryStore::with_entries([(THEME_KEY, value)]),
            None => MemoryStore::new(),
        });
        let provider = ThemeProvider::new(
            store.clone(),
            &FixedAmbient(ambient),
            TransitionTimings::default(),
        );
        (provider, store)
    }

    #[test]
    fn test_startup_persisted_wins_over_ambient() {
        let (provider, _) = provider_with(Some("dark"), Some(ColorScheme::Light));
        assert!(provider.state().is_dark_mode);
    }

    #[test]
    fn test_startup_falls_back_to_ambient() {
        let (provider, _) = provider_with(None, Some(ColorScheme::Dark));
        assert!(provider.state().is_dark_mode);
    }

    #[test]
    fn test_startup_defaults_to_light() {
        let (provider, _) = provider_with(None, None);
        assert_eq!(provider.state(), ThemeState::default());
    }

    #[test]
    fn test_startup_ignores_garbage_persisted_value() {
        let (provider, _) = provider_with(Some("purple"), Some(ColorScheme::Dark));
        assert!(provider.state().is_dark_mode);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_dark_mode_scenario() {
        let (provider, store) = provider_with(None, None);
        let theme = provider.context();

        let outcome = theme.set_dark_mode(true).await.unwrap();

        assert_eq!(outcome, TransitionOutcome::Completed(ColorScheme::Dark));
        assert!(theme.is_dark_mode().unwrap());
        assert!(!theme.is_transitioning().unwrap());
        assert!(!theme.state().unwrap().overlay_active);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_toggle_round_trip() {
        let (provider, store) = provider_with(Some("light"), None);
        let theme = provider.context();

        theme.toggle().await.unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        theme.toggle().await.unwrap();

        assert!(!theme.is_dark_mode().unwrap());
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_timeline() {
        let (provider, store) = provider_with(None, None);
        let theme = provider.context();

        let StartedTransition::Running(handle) = theme.start(ColorScheme::Dark).unwrap() else {
            panic!("expected transition to start");
        };
        let started = theme.state().unwrap();
        assert!(started.is_transitioning);
        assert!(!started.overlay_active);

        tokio::time::sleep(Duration::from_millis(60)).await;
        let state = theme.state().unwrap();
        assert!(state.overlay_active);
        assert!(!state.is_dark_mode);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(theme.is_dark_mode().unwrap());
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert!(theme.state().unwrap().overlay_active);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let state = theme.state().unwrap();
        assert!(!state.overlay_active);
        assert!(state.is_transitioning);

        assert_eq!(handle.wait().await.unwrap(), ColorScheme::Dark);
        assert!(!theme.is_transitioning().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_while_busy_is_ignored() {
        let (provider, _) = provider_with(None, None);
        let theme = provider.context();

        let first = theme.start(ColorScheme::Dark).unwrap();
        assert!(matches!(first, StartedTransition::Running(_)));

        assert_eq!(theme.toggle().await.unwrap(), TransitionOutcome::Busy);
        assert_eq!(
            theme.set_dark_mode(false).await.unwrap(),
            TransitionOutcome::Busy
        );

        if let StartedTransition::Running(handle) = first {
            handle.wait().await.unwrap();
        }
        assert!(theme.is_dark_mode().unwrap());
        assert!(!theme.is_transitioning().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_scheme_is_unchanged() {
        let (provider, store) = provider_with(None, None);
        let theme = provider.context();

        assert_eq!(
            theme.set_dark_mode(false).await.unwrap(),
            TransitionOutcome::Unchanged
        );
        assert!(!theme.is_transitioning().unwrap());
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_every_phase() {
        let (provider, _) = provider_with(None, None);
        let theme = provider.context();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        theme
            .subscribe(move |state| sink.lock().unwrap().push(*state))
            .unwrap();

        theme.toggle().await.unwrap();

        let seen = seen.lock().unwrap();
        // begin + four phases
        assert_eq!(seen.len(), 5);
        assert!(seen[0].is_transitioning && !seen[0].overlay_active);
        assert!(seen[2].is_dark_mode);
        assert!(!seen[4].is_transitioning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe() {
        let (provider, _) = provider_with(None, None);
        let theme = provider.context();
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let id = theme
            .subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        theme.unsubscribe(id).unwrap();

        theme.toggle().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_provider_cancels_transition() {
        let (provider, store) = provider_with(None, None);
        let theme = provider.context();

        let StartedTransition::Running(handle) = theme.start(ColorScheme::Dark).unwrap() else {
            panic!("expected transition to start");
        };
        tokio::time::sleep(Duration::from_millis(60)).await;
        drop(provider);

        assert_eq!(handle.wait().await, Err(ThemeError::Cancelled));
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
        assert_eq!(theme.state(), Err(ThemeError::ProviderDropped));
        assert_eq!(theme.toggle().await, Err(ThemeError::ProviderDropped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_transition_settles_and_unblocks() {
        let (provider, store) = provider_with(None, None);
        let theme = provider.context();

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        theme
            .subscribe(move |state| {
                if state.overlay_active && !flag.swap(true, Ordering::SeqCst) {
                    panic!("subscriber failure");
                }
            })
            .unwrap();

        assert_eq!(theme.toggle().await, Err(ThemeError::Cancelled));
        assert!(fired.load(Ordering::SeqCst));

        let state = theme.state().unwrap();
        assert!(!state.is_dark_mode);
        assert!(!state.is_transitioning);
        assert!(!state.overlay_active);
        assert_eq!(store.get(THEME_KEY).unwrap(), None);

        assert_eq!(
            theme.toggle().await.unwrap(),
            TransitionOutcome::Completed(ColorScheme::Dark)
        );
        assert!(!theme.is_transitioning().unwrap());
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    /// Store whose writes always fail
    struct ReadOnlyStore;

    impl PreferenceStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> lumen_core::store::Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> lumen_core::store::Result<()> {
            Err(StoreError::Io {
                path: "preferences.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self, key: &str) -> lumen_core::store::Result<()> {
            self.set(key, "")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_persist_failure_does_not_stop_transition() {
        let provider = ThemeProvider::new(
            Arc::new(ReadOnlyStore),
            &FixedAmbient(None),
            TransitionTimings::default(),
        );
        let theme = provider.context();

        let outcome = theme.set_dark_mode(true).await.unwrap();

        assert_eq!(outcome, TransitionOutcome::Completed(ColorScheme::Dark));
        assert!(theme.is_dark_mode().unwrap());
        assert!(!theme.is_transitioning().unwrap());
        assert!(!theme.state().unwrap().overlay_active);
    }

    #[test]
    fn test_startup_reports_source() {
        let resolve = |persisted: Option<&str>, ambient: Option<ColorScheme>| {
            let store = match persisted {
                Some(value) => MemoryStore::with_entries([(THEME_KEY, value)]),
                None => MemoryStore::new(),
            };
            resolve_initial_scheme_with_source(&store, &FixedAmbient(ambient))
        };

        assert_eq!(
            resolve(Some("dark"), None),
            (ColorScheme::Dark, SchemeSource::Persisted)
        );
        assert_eq!(
            resolve(Some("purple"), Some(ColorScheme::Dark)),
            (ColorScheme::Dark, SchemeSource::Ambient)
        );
        assert_eq!(
            resolve(Some("purple"), None),
            (ColorScheme::Light, SchemeSource::Default)
        );
        assert_eq!(resolve(None, None), (ColorScheme::Light, SchemeSource::Default));
    }

    #[test]
    fn test_start_outside_runtime() {
        let (provider, _) = provider_with(None, None);
        let theme = provider.context();
        assert!(matches!(
            theme.start(ColorScheme::Dark),
            Err(ThemeError::NoRuntime)
        ));
    }

    #[test]
    fn test_use_theme_requires_provider() {
        assert!(matches!(use_theme(), Err(ThemeError::MissingProvider)));

        let (outer, _) = provider_with(None, None);
        let (inner, _) = provider_with(Some("dark"), None);

        let _outer_scope = provide(outer.context());
        assert!(!use_theme().unwrap().is_dark_mode().unwrap());
        {
            let _inner_scope = provide(inner.context());
            assert!(use_theme().unwrap().is_dark_mode().unwrap());
        }
        assert!(!use_theme().unwrap().is_dark_mode().unwrap());
    }

    #[test]
    fn test_scopes_dropped_out_of_order() {
        let (light, _) = provider_with(None, None);
        let (dark, _) = provider_with(Some("dark"), None);

        let outer = provide(light.context());
        let inner = provide(dark.context());

        drop(outer);
        assert!(use_theme().unwrap().is_dark_mode().unwrap());

        drop(inner);
        assert_eq!(use_theme().unwrap_err(), ThemeError::MissingProvider);
    }
}
