use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::document::PanelElement;
use super::options::PanelOptions;

/// Hooks a panel module implements
///
/// Every hook has a no-op default, so a panel only overrides what it needs.
/// The router and the dialog orchestrator never call these directly; they
/// go through [`Panel`], which guarantees `on_init` runs once before the
/// first `on_before_show`/`on_show`.
#[async_trait]
pub trait PanelHooks: Send {
    async fn on_init(&mut self, _element: &PanelElement, _options: &PanelOptions) -> Result<()> {
        Ok(())
    }

    async fn on_uninit(&mut self) -> Result<()> {
        Ok(())
    }

    async fn on_before_show(&mut self, _element: &PanelElement, _options: &PanelOptions) -> Result<()> {
        Ok(())
    }

    async fn on_show(&mut self, _element: &PanelElement, _options: &PanelOptions) -> Result<()> {
        Ok(())
    }

    async fn on_before_hide(&mut self) -> Result<()> {
        Ok(())
    }

    async fn on_hide(&mut self) -> Result<()> {
        Ok(())
    }

    /// Result value of a dialog closed with its submit button
    async fn on_submit(&mut self) -> Result<Option<Value>> {
        Ok(None)
    }

    /// Result value of a dialog closed with its cancel button
    async fn on_cancel(&mut self) -> Result<Option<Value>> {
        Ok(None)
    }
}

/// Fallback for panels that declare no module of their own
#[derive(Debug, Default)]
pub struct GenericPanel;

#[async_trait]
impl PanelHooks for GenericPanel {}

/// A live panel instance: the hooks plus the init-once bookkeeping
pub struct Panel {
    id: String,
    element: Arc<PanelElement>,
    initialized: AtomicBool,
    hooks: Mutex<Box<dyn PanelHooks>>,
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Panel {
    pub fn new(element: Arc<PanelElement>, hooks: Box<dyn PanelHooks>) -> Self {
        Self {
            id: element.id().to_string(),
            element,
            initialized: AtomicBool::new(false),
            hooks: Mutex::new(hooks),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The element this panel was created for
    pub fn element(&self) -> &Arc<PanelElement> {
        &self.element
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Run `on_init` unless it already ran
    pub async fn init(&self, element: &PanelElement, options: &PanelOptions) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        log::debug!("Initializing panel '{}'", self.id);
        self.hooks.lock().await.on_init(element, options).await
    }

    /// Run `on_uninit` if the panel was initialized; the next show initializes again
    pub async fn uninit(&self) -> Result<()> {
        if !self.initialized.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        log::debug!("Uninitializing panel '{}'", self.id);
        self.hooks.lock().await.on_uninit().await
    }

    pub async fn before_show(&self, element: &PanelElement, options: &PanelOptions) -> Result<()> {
        self.init(element, options).await?;
        self.hooks.lock().await.on_before_show(element, options).await
    }

    pub async fn show(&self, element: &PanelElement, options: &PanelOptions) -> Result<()> {
        self.init(element, options).await?;
        self.hooks.lock().await.on_show(element, options).await
    }

    pub async fn before_hide(&self) -> Result<()> {
        self.hooks.lock().await.on_before_hide().await
    }

    pub async fn hide(&self) -> Result<()> {
        self.hooks.lock().await.on_hide().await
    }

    pub async fn submit(&self) -> Result<Option<Value>> {
        self.hooks.lock().await.on_submit().await
    }

    pub async fn cancel(&self) -> Result<Option<Value>> {
        self.hooks.lock().await.on_cancel().await
    }
}
