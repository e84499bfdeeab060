//! Recording engine lifecycle.
//!
//! A page context is one execution lifetime of the capture logic: the
//! browser tears the shim down on every navigation, so session continuity
//! is reconstructed from durable storage each time a context starts.
//! Resuming differs from an explicit start only in that the prior trace
//! is kept.

use crate::persist::DurableStore;
use crate::selector;
use crate::store::TraceStore;
use spoor_common::action::{Action, Modifiers};
use spoor_common::protocol::InputEvent;
use spoor_common::state::RecordingState;
use tracing::{debug, info, warn};

/// Observable source of page input events. The engine attaches to start
/// receiving events and detaches to stop; implementations decide what
/// attachment means (the relay signals shims to install or remove DOM
/// listeners, tests flip a flag and inject events directly).
pub trait InputSource: Send {
    fn attach(&mut self);
    fn detach(&mut self);
    fn is_attached(&self) -> bool;
}

/// Engine lifecycle state for one page context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Active,
}

/// The recording engine for one page context.
pub struct Recorder<S: DurableStore> {
    store: TraceStore<S>,
    source: Box<dyn InputSource>,
    page_url: String,
}

impl<S: DurableStore> Recorder<S> {
    /// Fresh engine for a page context at `page_url`. Idle and detached
    /// until [`on_context_start`](Self::on_context_start) restores a live
    /// session or a start command arrives.
    pub fn new(
        page_url: impl Into<String>,
        store: TraceStore<S>,
        source: Box<dyn InputSource>,
    ) -> Self {
        Self { store, source, page_url: page_url.into() }
    }

    /// Load persisted state and run the context-start transition with it.
    /// A missing or unreadable state document starts the context fresh and
    /// idle; neither is an error.
    pub async fn on_context_start(&mut self) -> EngineState {
        let restored = match self.store.load_persisted().await {
            Ok(Some(state)) => state,
            Ok(None) => RecordingState::default(),
            Err(e) => {
                warn!("restoring recording state failed, starting fresh: {}", e);
                RecordingState::default()
            }
        };
        self.apply_restored(restored).await
    }

    /// The context-start transition itself. When the restored flag says a
    /// session is live, the engine re-enters Active without resetting the
    /// trace: one `navigate` action marks the new URL and the input source
    /// re-attaches.
    pub async fn apply_restored(&mut self, restored: RecordingState) -> EngineState {
        self.store.restore(restored);

        if self.store.is_recording() {
            info!("resuming recording on {}", self.page_url);
            self.store.append(Action::navigate(&self.page_url)).await;
            self.source.attach();
        }
        self.state()
    }

    /// Begin a recording session. Re-entrant: starting while already
    /// Active resets the session. The trace always begins with a
    /// `navigate` action recording the origin URL.
    pub async fn start(&mut self) -> EngineState {
        info!("recording started on {}", self.page_url);
        self.store.set_recording(true).await;
        self.store.clear().await;
        self.store.append(Action::navigate(&self.page_url)).await;
        self.source.attach();
        self.state()
    }

    /// Stop capturing. The input source is detached before this returns;
    /// the accumulated trace stays available for export.
    pub async fn stop(&mut self) -> EngineState {
        info!("recording stopped on {}", self.page_url);
        self.store.set_recording(false).await;
        self.source.detach();
        self.state()
    }

    /// Route one observed input event. Only Active contexts record;
    /// events arriving while Idle are dropped.
    pub async fn handle_input(&mut self, event: InputEvent) {
        if !self.store.is_recording() {
            debug!("dropping input event while idle");
            return;
        }
        let action = match event {
            InputEvent::Click { target, text } => {
                Action::click(selector::resolve(&target), &text)
            }
            InputEvent::KeyDown {
                target,
                key,
                code,
                ctrl_key,
                shift_key,
                alt_key,
                meta_key,
            } => Action::keyboard(
                selector::resolve(&target),
                key,
                code,
                Modifiers { ctrl: ctrl_key, shift: shift_key, alt: alt_key, meta: meta_key },
            ),
        };
        self.store.append(action).await;
    }

    /// Copy of the current state, the `getStatus` payload.
    pub fn status(&self) -> RecordingState {
        self.store.state().clone()
    }

    pub fn state(&self) -> EngineState {
        if self.store.is_recording() { EngineState::Active } else { EngineState::Idle }
    }

    pub fn is_attached(&self) -> bool {
        self.source.is_attached()
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// The owned trace store. The exporter drains it through this.
    pub fn store_mut(&mut self) -> &mut TraceStore<S> {
        &mut self.store
    }
}
