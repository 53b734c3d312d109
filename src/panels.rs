//! Built-in panels used by the binary
//!
//! Real panel content lives outside this crate; these stand-ins log their
//! lifecycle so a walk through the panel tree can be traced.

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::nav::document::PanelElement;
use crate::nav::lifecycle::PanelHooks;
use crate::nav::options::PanelOptions;
use crate::nav::registry::{PanelRegistry, SharedModuleLoader};

pub const FRAME_MODULE: &str = "panels/frame/panel";

/// Module paths served by [`LoggingPanel`]
pub const LOGGING_MODULES: &[&str] = &[
    "panels/wifi/panel",
    "panels/wifi_manage_networks/panel",
    "panels/bluetooth/panel",
];

/// Logs every lifecycle hook it receives
#[derive(Debug)]
pub struct LoggingPanel {
    id: String,
}

impl LoggingPanel {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl PanelHooks for LoggingPanel {
    async fn on_init(&mut self, _element: &PanelElement, _options: &PanelOptions) -> Result<()> {
        info!("[{}] init", self.id);
        Ok(())
    }

    async fn on_uninit(&mut self) -> Result<()> {
        info!("[{}] uninit", self.id);
        Ok(())
    }

    async fn on_before_show(&mut self, _element: &PanelElement, _options: &PanelOptions) -> Result<()> {
        info!("[{}] beforeShow", self.id);
        Ok(())
    }

    async fn on_show(&mut self, _element: &PanelElement, _options: &PanelOptions) -> Result<()> {
        info!("[{}] show", self.id);
        Ok(())
    }

    async fn on_before_hide(&mut self) -> Result<()> {
        info!("[{}] beforeHide", self.id);
        Ok(())
    }

    async fn on_hide(&mut self) -> Result<()> {
        info!("[{}] hide", self.id);
        Ok(())
    }
}

/// Container panel hosting an embedded app
#[derive(Debug, Default)]
pub struct FramePanel {
    loaded: Option<String>,
}

impl FramePanel {
    /// Source of the app currently loaded in the frame
    pub fn loaded(&self) -> Option<&str> {
        self.loaded.as_deref()
    }
}

#[async_trait]
impl PanelHooks for FramePanel {
    async fn on_before_show(&mut self, _element: &PanelElement, options: &PanelOptions) -> Result<()> {
        match (&options.mozapp, &options.src) {
            (Some(mozapp), Some(src)) => {
                info!("Loading embedded app {} ({})", src, mozapp);
                self.loaded = Some(src.clone());
            }
            _ => log::warn!("Frame shown without an app to embed"),
        }
        Ok(())
    }

    async fn on_hide(&mut self) -> Result<()> {
        if let Some(src) = self.loaded.take() {
            info!("Unloading embedded app {}", src);
        }
        Ok(())
    }
}

/// Stand-in for the modules every non-root panel depends on
#[derive(Debug, Default)]
pub struct SharedModules;

#[async_trait]
impl SharedModuleLoader for SharedModules {
    async fn load(&self) -> Result<()> {
        info!("Shared panel modules ready");
        Ok(())
    }
}

/// Register the built-in panels with a registry
pub fn register_builtin(registry: &mut PanelRegistry) {
    for module in LOGGING_MODULES {
        registry.register_fn(*module, |id| -> Box<dyn PanelHooks> { Box::new(LoggingPanel::new(id)) });
    }
    registry.register::<FramePanel>(FRAME_MODULE);
    registry.set_shared_modules(Arc::new(SharedModules));
}
