//! Keeps the current panel's lifecycle in step with app backgrounding

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::router::NavigationRouter;

#[derive(Clone)]
pub struct VisibilityBridge {
    router: NavigationRouter,
}

impl VisibilityBridge {
    pub fn new(router: NavigationRouter) -> Self {
        Self { router }
    }

    /// Replay the hide or show hooks on whatever panel is current
    ///
    /// Showing again reuses the options of the last committed navigation.
    /// Does nothing before the first navigation commits.
    pub async fn handle_visibility_change(&self, visible: bool) -> Result<()> {
        let Some(current) = self.router.current() else {
            log::debug!("Visibility changed with no current panel");
            return Ok(());
        };

        let panel = &current.panel;
        if visible {
            log::debug!("App visible, showing '{}'", current.panel_id);
            panel
                .before_show(&current.element, &current.options)
                .await
                .with_context(|| format!("beforeShow of '{}' on resume", current.panel_id))?;
            panel
                .show(&current.element, &current.options)
                .await
                .with_context(|| format!("show of '{}' on resume", current.panel_id))?;
        } else {
            log::debug!("App hidden, hiding '{}'", current.panel_id);
            panel
                .before_hide()
                .await
                .with_context(|| format!("beforeHide of '{}' on suspend", current.panel_id))?;
            panel
                .hide()
                .await
                .with_context(|| format!("hide of '{}' on suspend", current.panel_id))?;
        }
        Ok(())
    }

    /// Follow a host visibility flag until its sender goes away
    pub fn spawn(self, mut visibility: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while visibility.changed().await.is_ok() {
                let visible = *visibility.borrow_and_update();
                if let Err(err) = self.handle_visibility_change(visible).await {
                    log::warn!("Visibility change not applied: {:#}", err);
                }
            }
            log::debug!("Visibility source closed");
        })
    }
}
