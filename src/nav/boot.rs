//! Startup wiring
//!
//! [`SettingsShell`] builds every navigation service from a
//! [`NavigatorConfig`] and performs the launch navigation.

use std::fmt;
use std::sync::Arc;

use crate::config::NavigatorConfig;
use crate::panels;

use super::dialog::DialogOrchestrator;
use super::document::{PanelDocument, Viewport};
use super::options::PanelOptions;
use super::registry::PanelRegistry;
use super::router::{ActivityHandler, NavigationOutcome, NavigationResult, NavigationRouter};
use super::transition::{Compositor, TimedCompositor, TransitionEngine};
use super::visibility::VisibilityBridge;

/// How the app was launched
#[derive(Clone, Default)]
pub struct LaunchContext {
    /// First panel to show, the root panel when unset
    pub initial_panel_id: Option<String>,
    /// Deep-link target shown once the initial panel is up
    pub pending_target_panel: Option<String>,
    /// Set when the app was started to serve an activity
    pub activity: Option<Arc<dyn ActivityHandler>>,
}

impl fmt::Debug for LaunchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchContext")
            .field("initial_panel_id", &self.initial_panel_id)
            .field("pending_target_panel", &self.pending_target_panel)
            .field("activity", &self.activity.as_ref().map(|a| a.target_panel_id().to_string()))
            .finish()
    }
}

impl LaunchContext {
    pub fn with_initial_panel(mut self, panel_id: impl Into<String>) -> Self {
        self.initial_panel_id = Some(panel_id.into());
        self
    }

    pub fn with_pending_target(mut self, panel_id: impl Into<String>) -> Self {
        self.pending_target_panel = Some(panel_id.into());
        self
    }

    pub fn with_activity(mut self, activity: Arc<dyn ActivityHandler>) -> Self {
        self.activity = Some(activity);
        self
    }
}

pub struct SettingsShell {
    config: NavigatorConfig,
    launch: LaunchContext,
    router: NavigationRouter,
    dialogs: DialogOrchestrator,
    visibility: VisibilityBridge,
}

impl SettingsShell {
    /// Wire the services; `configure` registers panel factories
    pub fn new(
        config: NavigatorConfig,
        compositor: Arc<dyn Compositor>,
        launch: LaunchContext,
        configure: impl FnOnce(&mut PanelRegistry),
    ) -> Self {
        let document = Arc::new(PanelDocument::new(config.panels.iter().cloned()));
        let mut registry = PanelRegistry::new(document);
        configure(&mut registry);

        let viewport = Arc::new(Viewport::new(config.screen));
        let transitions = Arc::new(TransitionEngine::new(compositor, viewport));
        let router = NavigationRouter::new(
            Arc::new(registry),
            transitions,
            config.router_settings(),
            launch.activity.clone(),
        );
        let dialogs = DialogOrchestrator::new(router.clone(), config.dialogs.clone());
        let visibility = VisibilityBridge::new(router.clone());

        log::info!(
            "Settings shell ready with {} panels (root '{}')",
            config.panels.len(),
            config.root_panel_id
        );

        Self {
            config,
            launch,
            router,
            dialogs,
            visibility,
        }
    }

    /// Shell with the built-in panels and a timed compositor
    pub fn with_builtin_panels(config: NavigatorConfig, launch: LaunchContext) -> Self {
        let compositor = Arc::new(TimedCompositor::new(config.transition_duration()));
        Self::new(config, compositor, launch, panels::register_builtin)
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn router(&self) -> &NavigationRouter {
        &self.router
    }

    pub fn dialogs(&self) -> &DialogOrchestrator {
        &self.dialogs
    }

    pub fn visibility(&self) -> &VisibilityBridge {
        &self.visibility
    }

    pub fn viewport(&self) -> &Arc<Viewport> {
        self.router.transitions().viewport()
    }

    /// Show the initial panel, then the pending deep-link target if any
    pub async fn start(&self) -> NavigationResult {
        let initial = self
            .launch
            .initial_panel_id
            .clone()
            .unwrap_or_else(|| self.config.root_panel_id.clone());

        log::info!("Starting at panel '{}'", initial);
        let outcome = self.router.navigate(initial, PanelOptions::default()).await?;

        match &self.launch.pending_target_panel {
            Some(target) if outcome != NavigationOutcome::ActivityClosed => {
                log::info!("Opening pending target panel '{}'", target);
                self.router.navigate(target.clone(), PanelOptions::default()).await
            }
            _ => Ok(outcome),
        }
    }
}

