//! Navigation router
//!
//! Owns the "what is on screen" state and runs the panel swap protocol:
//!
//! 1. load shared modules (skipped for the root panel)
//! 2. `before_hide` the current panel
//! 3. `before_show` the target panel
//! 4. transition between the two elements
//! 5. `hide` the current panel
//! 6. `show` the target panel, then commit
//!
//! The root panel stays resident, so steps 2 and 5 never run for it.
//!
//! At most one navigation runs at a time. Requests arriving meanwhile park in
//! a single pending slot; a newer request replaces the parked one, whose
//! handle then resolves to [`NavigationOutcome::Superseded`] without any
//! lifecycle hook having run.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};

use super::document::PanelElement;
use super::embed::EmbedResolver;
use super::error::{HookStage, NavigationError};
use super::lifecycle::Panel;
use super::options::PanelOptions;
use super::registry::PanelRegistry;
use super::transition::{ColumnMode, PanelReady, TransitionEngine};

/// Synthetic target that dismisses an activity
pub const CLOSE_TARGET: &str = "close";

/// An external activity the app was launched to serve
pub trait ActivityHandler: Send + Sync {
    /// Panel the activity asked for
    fn target_panel_id(&self) -> &str;

    /// Return the activity result to the calling app
    fn post_result(&self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouterPhase {
    #[default]
    Idle,
    Navigating,
}

/// What is currently on screen
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub panel_id: String,
    pub element: Arc<PanelElement>,
    pub panel: Arc<Panel>,
    pub options: PanelOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The panel swap ran to completion and is now current
    Committed(String),
    /// The target was already current; nothing ran
    AlreadyCurrent,
    /// An activity result was posted instead of navigating
    ActivityClosed,
    /// A newer request replaced this one before it started
    Superseded,
    /// Nothing to go back or up to
    NoHistory,
}

pub type NavigationResult = Result<NavigationOutcome, NavigationError>;

/// A navigation waiting to run
#[derive(Debug)]
pub struct NavigationRequest {
    pub panel_id: String,
    pub options: PanelOptions,
    reply: oneshot::Sender<NavigationResult>,
}

impl NavigationRequest {
    fn new(panel_id: String, options: PanelOptions) -> (Self, NavigationHandle) {
        let (reply, rx) = oneshot::channel();
        let request = Self {
            panel_id,
            options,
            reply,
        };
        (request, NavigationHandle { rx })
    }

    fn resolve(self, result: NavigationResult) {
        // The caller may have dropped its handle.
        let _ = self.reply.send(result);
    }
}

/// Completion of a navigation request
///
/// Resolves once the navigation commits, or right away when nothing had to
/// run. Dropping the handle does not cancel the navigation.
#[must_use = "a navigation handle does nothing unless awaited or dropped on purpose"]
#[derive(Debug)]
pub struct NavigationHandle {
    rx: oneshot::Receiver<NavigationResult>,
}

impl NavigationHandle {
    fn resolved(result: NavigationResult) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }
}

impl Future for NavigationHandle {
    type Output = NavigationResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Ok(NavigationOutcome::Superseded)))
    }
}

#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Always-resident panel that is never hidden
    pub root_panel_id: String,
    /// Container panel used for embedded apps
    pub frame_panel_id: String,
    /// Abort a navigation whose hook does not settle within this time
    pub hook_timeout: Option<Duration>,
    pub embeds: EmbedResolver,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            root_panel_id: "root".to_string(),
            frame_panel_id: "frame".to_string(),
            hook_timeout: None,
            embeds: EmbedResolver::default(),
        }
    }
}

#[derive(Debug, Default)]
struct RouterState {
    phase: RouterPhase,
    current: Option<NavigationState>,
    previous: Option<NavigationState>,
    pending: Option<NavigationRequest>,
}

struct RouterInner {
    registry: Arc<PanelRegistry>,
    transitions: Arc<TransitionEngine>,
    settings: RouterSettings,
    activity: Option<Arc<dyn ActivityHandler>>,
    state: Mutex<RouterState>,
}

/// Handle to the navigation service; clones share the same state
#[derive(Clone)]
pub struct NavigationRouter {
    inner: Arc<RouterInner>,
}

impl NavigationRouter {
    pub fn new(
        registry: Arc<PanelRegistry>,
        transitions: Arc<TransitionEngine>,
        settings: RouterSettings,
        activity: Option<Arc<dyn ActivityHandler>>,
    ) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                registry,
                transitions,
                settings,
                activity,
                state: Mutex::new(RouterState::default()),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<PanelRegistry> {
        &self.inner.registry
    }

    pub fn transitions(&self) -> &Arc<TransitionEngine> {
        &self.inner.transitions
    }

    pub fn root_panel_id(&self) -> &str {
        &self.inner.settings.root_panel_id
    }

    pub fn phase(&self) -> RouterPhase {
        self.inner.state.lock().unwrap().phase
    }

    pub fn current(&self) -> Option<NavigationState> {
        self.inner.state.lock().unwrap().current.clone()
    }

    pub fn current_panel_id(&self) -> Option<String> {
        self.inner.state.lock().unwrap().current.as_ref().map(|c| c.panel_id.clone())
    }

    /// The state shown before the current one, kept for a single `back()`
    pub fn previous(&self) -> Option<NavigationState> {
        self.inner.state.lock().unwrap().previous.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelReady> {
        self.inner.transitions.subscribe()
    }

    /// Request a navigation to `panel_id`
    ///
    /// Never blocks: the returned handle resolves when this request's
    /// navigation commits, fails, or is superseded. Must be called from
    /// within a tokio runtime.
    pub fn navigate(&self, panel_id: impl Into<String>, options: PanelOptions) -> NavigationHandle {
        let (request, handle) = NavigationRequest::new(panel_id.into(), options);
        self.submit(request);
        handle
    }

    /// Go back to the previously shown panel, or finish the activity
    pub fn back(&self) -> NavigationHandle {
        if let Some(activity) = &self.inner.activity {
            log::info!("Back pressed while serving an activity, posting result");
            activity.post_result();
            return NavigationHandle::resolved(Ok(NavigationOutcome::ActivityClosed));
        }

        // The slot is only replaced once a navigation commits.
        let previous = self.previous();
        match previous {
            Some(previous) => self.navigate(previous.panel_id, previous.options),
            None => NavigationHandle::resolved(Ok(NavigationOutcome::NoHistory)),
        }
    }

    /// Navigate to the parent the current panel's header links to
    pub fn up(&self) -> NavigationHandle {
        let parent = self
            .current()
            .and_then(|current| current.element.parent().map(str::to_string));
        match parent {
            Some(parent) => self.navigate(parent, PanelOptions::default()),
            None => NavigationHandle::resolved(Ok(NavigationOutcome::NoHistory)),
        }
    }

    fn is_root(&self, panel_id: &str) -> bool {
        panel_id == self.inner.settings.root_panel_id
    }

    fn submit(&self, mut request: NavigationRequest) {
        let mut state = self.inner.state.lock().unwrap();

        if self.shall_close_activity(&state, &request.panel_id) {
            drop(state);
            if let Some(activity) = &self.inner.activity {
                log::info!("Navigation to '{}' closes the activity", request.panel_id);
                activity.post_result();
            }
            request.resolve(Ok(NavigationOutcome::ActivityClosed));
            return;
        }

        if state.phase == RouterPhase::Navigating {
            log::debug!("Navigation in flight, parking request for '{}'", request.panel_id);
            if let Some(superseded) = state.pending.replace(request) {
                log::debug!("Dropping superseded navigation to '{}'", superseded.panel_id);
            }
            return;
        }

        if let Some(app_name) = EmbedResolver::app_name(&request.panel_id) {
            let app_name = app_name.to_string();
            match self.inner.settings.embeds.resolve(&app_name) {
                Some(target) => {
                    log::debug!("Embedding app '{}' from {}", app_name, target.src);
                    request.panel_id = self.inner.settings.frame_panel_id.clone();
                    request.options.mozapp = Some(target.mozapp);
                    request.options.src = Some(target.src);
                }
                None => {
                    drop(state);
                    log::error!("Only trusted apps are embedded, refusing '{}'", app_name);
                    request.resolve(Err(NavigationError::UntrustedEmbed(app_name)));
                    return;
                }
            }
        }

        let already_current = state
            .current
            .as_ref()
            .is_some_and(|current| current.panel_id == request.panel_id);
        if already_current {
            drop(state);
            log::debug!("Panel '{}' is already current", request.panel_id);
            request.resolve(Ok(NavigationOutcome::AlreadyCurrent));
            return;
        }

        state.phase = RouterPhase::Navigating;
        drop(state);

        let router = self.clone();
        tokio::spawn(async move { router.drive(request).await });
    }

    fn shall_close_activity(&self, state: &RouterState, panel_id: &str) -> bool {
        let Some(activity) = &self.inner.activity else {
            return false;
        };
        if panel_id == CLOSE_TARGET {
            return true;
        }
        let Some(current) = &state.current else {
            return false;
        };

        // Leaving the activity's own panel towards its parent ends the activity.
        current.panel_id == activity.target_panel_id() && current.element.parent() == Some(panel_id)
    }

    async fn drive(self, request: NavigationRequest) {
        let NavigationRequest {
            panel_id,
            options,
            reply,
        } = request;

        let result = self.swap(&panel_id, options).await;
        if let Err(err) = &result {
            log::warn!("Navigation to '{}' abandoned: {}", panel_id, err);
        }

        let pending = {
            let mut state = self.inner.state.lock().unwrap();
            state.phase = RouterPhase::Idle;
            state.pending.take()
        };
        if let Some(next) = pending {
            self.submit(next);
        }

        let _ = reply.send(result);
    }

    async fn swap(&self, panel_id: &str, options: PanelOptions) -> NavigationResult {
        let panel = self
            .inner
            .registry
            .get(panel_id)
            .await
            .ok_or_else(|| NavigationError::PanelNotFound(panel_id.to_string()))?;
        let element = panel.element().clone();

        let current = self.current();
        let outgoing = current
            .as_ref()
            .filter(|current| !self.is_root(&current.panel_id))
            .map(|current| current.panel.clone());
        let old_element = current.as_ref().map(|current| current.element.clone());

        log::info!(
            "🧭 Navigating {} -> {}",
            current.as_ref().map_or("(none)", |c| c.panel_id.as_str()),
            panel_id
        );

        if !self.is_root(panel_id) {
            self.step(panel_id, HookStage::SharedModules, self.inner.registry.ensure_shared_modules())
                .await?;
        }

        if let Some(outgoing) = &outgoing {
            self.step(outgoing.id(), HookStage::BeforeHide, outgoing.before_hide()).await?;
        }

        self.step(panel_id, HookStage::BeforeShow, panel.before_show(&element, &options))
            .await?;

        let mode = self.column_mode();
        self.step(panel_id, HookStage::Transition, async {
            self.inner
                .transitions
                .transition(old_element.as_ref(), &element, mode)
                .await;
            anyhow::Ok(())
        })
        .await?;

        if let Some(outgoing) = &outgoing {
            self.step(outgoing.id(), HookStage::Hide, outgoing.hide()).await?;
        }

        self.step(panel_id, HookStage::Show, panel.show(&element, &options)).await?;

        let committed = NavigationState {
            panel_id: panel_id.to_string(),
            element,
            panel,
            options,
        };
        {
            let mut state = self.inner.state.lock().unwrap();
            let previous = state.current.replace(committed);
            state.previous = previous;
        }
        log::info!("Committed navigation to '{}'", panel_id);

        Ok(NavigationOutcome::Committed(panel_id.to_string()))
    }

    /// Column mode is read fresh for every swap; rotation may change it
    fn column_mode(&self) -> ColumnMode {
        if self.inner.transitions.viewport().layout().is_tablet_and_landscape() {
            ColumnMode::Two
        } else {
            ColumnMode::Single
        }
    }

    async fn step<T>(
        &self,
        panel_id: &str,
        stage: HookStage,
        hook: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, NavigationError> {
        log::debug!("{} '{}'", stage, panel_id);
        let outcome = match self.inner.settings.hook_timeout {
            Some(limit) => tokio::time::timeout(limit, hook).await.map_err(|_| NavigationError::HookTimeout {
                panel_id: panel_id.to_string(),
                stage,
            })?,
            None => hook.await,
        };
        outcome.map_err(|source| NavigationError::Hook {
            panel_id: panel_id.to_string(),
            stage,
            source,
        })
    }
}
