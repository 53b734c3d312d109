//! Panel and dialog transitions
//!
//! Panels are positioned purely through the `current`/`previous` classes; the
//! host animates the class change and reports back through a [`Compositor`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::dialog::DialogTransition;
use super::document::{PanelElement, Viewport};

const CURRENT: &str = "current";
const PREVIOUS: &str = "previous";

/// Host side of an animation: resolves once the element's transition has settled
#[async_trait]
pub trait Compositor: Send + Sync {
    async fn transition_end(&self, element: &PanelElement);
}

/// Settles every transition after a fixed duration
#[derive(Debug, Clone)]
pub struct TimedCompositor {
    duration: Duration,
}

impl TimedCompositor {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Compositor for TimedCompositor {
    async fn transition_end(&self, _element: &PanelElement) {
        tokio::time::sleep(self.duration).await;
    }
}

/// Settles every transition immediately (headless hosts)
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateCompositor;

#[async_trait]
impl Compositor for ImmediateCompositor {
    async fn transition_end(&self, _element: &PanelElement) {}
}

/// Layout strategy for a panel swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnMode {
    /// Phone layout: the incoming panel slides in and is awaited
    Single,
    /// Tablet landscape layout: classes flip without animation
    Two,
}

/// Emitted once per committed panel swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelReady {
    pub previous: Option<String>,
    pub current: String,
}

pub struct TransitionEngine {
    compositor: Arc<dyn Compositor>,
    viewport: Arc<Viewport>,
    ready: broadcast::Sender<PanelReady>,
}

impl TransitionEngine {
    pub fn new(compositor: Arc<dyn Compositor>, viewport: Arc<Viewport>) -> Self {
        let (ready, _) = broadcast::channel(64);
        Self {
            compositor,
            viewport,
            ready,
        }
    }

    pub fn viewport(&self) -> &Arc<Viewport> {
        &self.viewport
    }

    /// Listen for panel-ready notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PanelReady> {
        self.ready.subscribe()
    }

    /// Swap `old` out and `new` in
    ///
    /// Swapping an element with itself resolves immediately without touching
    /// classes or notifying observers.
    pub async fn transition(&self, old: Option<&Arc<PanelElement>>, new: &Arc<PanelElement>, mode: ColumnMode) {
        if let Some(old) = old {
            if Arc::ptr_eq(old, new) {
                return;
            }
        }

        // A panel coming back from the `previous` slot pushes the old one
        // forward instead of stacking it behind.
        if let Some(old) = old {
            let coming_back = !new.class_name().is_empty();
            old.set_class_name(if coming_back { "" } else { PREVIOUS });
        }

        match mode {
            ColumnMode::Single => {
                if new.has_class(CURRENT) {
                    self.notify_ready(old, new);
                    return;
                }
                new.set_class_name(CURRENT);

                // Panel positioning assumes the viewport sits at the document origin.
                if self.viewport.scroll_offset() != (0, 0) {
                    log::debug!("Resetting viewport scroll before sliding in '{}'", new.id());
                    self.viewport.scroll_to(0, 0);
                }

                self.compositor.transition_end(new).await;
                self.notify_ready(old, new);
            }
            ColumnMode::Two => {
                new.set_class_name(CURRENT);
                self.notify_ready(old, new);
            }
        }
    }

    fn notify_ready(&self, old: Option<&Arc<PanelElement>>, new: &PanelElement) {
        let ready = PanelReady {
            previous: old.map(|element| element.id().to_string()),
            current: new.id().to_string(),
        };
        log::debug!("Panel ready: {:?} -> {}", ready.previous, ready.current);
        // No subscribers is fine.
        let _ = self.ready.send(ready);
    }

    /// Bring a dialog element on screen
    pub async fn open_dialog(&self, element: &PanelElement, transition: DialogTransition) {
        element.add_class(transition.css_class());
        if transition.dims_scrim() {
            self.viewport.set_scrim_dimmed(true);
        }
        element.add_class(CURRENT);
        self.compositor.transition_end(element).await;
    }

    /// Take a dialog element off screen and strip the transition class
    pub async fn close_dialog(&self, element: &PanelElement, transition: DialogTransition) {
        element.remove_class(CURRENT);
        self.compositor.transition_end(element).await;
        element.remove_class(transition.css_class());
        if transition.dims_scrim() {
            self.viewport.set_scrim_dimmed(false);
        }
    }
}
