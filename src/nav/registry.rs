//! Panel registry
//!
//! Maps the module path an element declares to a factory, and caches the one
//! [`Panel`] instance created per panel id for the rest of the session.
//! Factories are registered once at startup; instantiation stays lazy.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::document::{PanelDocument, PanelElement};
use super::lifecycle::{GenericPanel, Panel, PanelHooks};

/// Creates the hooks for a panel (factory pattern for lazy initialization)
pub trait PanelFactory: Send + Sync {
    fn create(&self, panel_id: &str) -> Box<dyn PanelHooks>;
}

impl<P> PanelFactory for PhantomData<fn() -> P>
where
    P: PanelHooks + Default + 'static,
{
    fn create(&self, _panel_id: &str) -> Box<dyn PanelHooks> {
        Box::new(P::default())
    }
}

/// Factory backed by a closure, for panels that need captured state
pub struct FactoryFn<F>(pub F);

impl<F> PanelFactory for FactoryFn<F>
where
    F: Fn(&str) -> Box<dyn PanelHooks> + Send + Sync,
{
    fn create(&self, panel_id: &str) -> Box<dyn PanelHooks> {
        (self.0)(panel_id)
    }
}

/// Modules every non-root panel depends on, loaded once before the first such navigation
#[async_trait]
pub trait SharedModuleLoader: Send + Sync {
    async fn load(&self) -> Result<()>;
}

pub struct PanelRegistry {
    document: Arc<PanelDocument>,
    factories: HashMap<String, Arc<dyn PanelFactory>>,
    cache: Mutex<HashMap<String, Arc<Panel>>>,
    shared_modules: Option<Arc<dyn SharedModuleLoader>>,
    shared_loaded: OnceCell<()>,
}

impl PanelRegistry {
    pub fn new(document: Arc<PanelDocument>) -> Self {
        Self {
            document,
            factories: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
            shared_modules: None,
            shared_loaded: OnceCell::new(),
        }
    }

    /// Register a panel type for a module path
    pub fn register<P>(&mut self, module: impl Into<String>) -> &mut Self
    where
        P: PanelHooks + Default + 'static,
    {
        self.register_factory(module, Arc::new(PhantomData::<fn() -> P>))
    }

    /// Register a closure producing the hooks for a module path
    pub fn register_fn<F>(&mut self, module: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&str) -> Box<dyn PanelHooks> + Send + Sync + 'static,
    {
        self.register_factory(module, Arc::new(FactoryFn(factory)))
    }

    pub fn register_factory(&mut self, module: impl Into<String>, factory: Arc<dyn PanelFactory>) -> &mut Self {
        let module = module.into();
        if self.factories.insert(module.clone(), factory).is_some() {
            log::warn!("Replaced panel factory for module '{}'", module);
        }
        self
    }

    pub fn set_shared_modules(&mut self, loader: Arc<dyn SharedModuleLoader>) -> &mut Self {
        self.shared_modules = Some(loader);
        self
    }

    pub fn document(&self) -> &Arc<PanelDocument> {
        &self.document
    }

    pub fn has_factory(&self, module: &str) -> bool {
        self.factories.contains_key(module)
    }

    /// Panel instance already created for `panel_id`, if any
    pub fn cached(&self, panel_id: &str) -> Option<Arc<Panel>> {
        self.cache.lock().unwrap().get(panel_id).cloned()
    }

    /// Resolve a panel id to its instance
    ///
    /// Activates the element's markup on first use, then creates and caches
    /// the instance. Resolves to `None` when no element with that id is
    /// declared; callers must abandon the navigation in that case.
    pub async fn get(&self, panel_id: &str) -> Option<Arc<Panel>> {
        let Some(element) = self.document.get(panel_id) else {
            log::warn!("No element declared for panel '{}'", panel_id);
            return None;
        };

        self.document.activate(panel_id);

        let mut cache = self.cache.lock().unwrap();
        let panel = cache
            .entry(panel_id.to_string())
            .or_insert_with(|| Arc::new(self.instantiate(element)))
            .clone();
        Some(panel)
    }

    fn instantiate(&self, element: Arc<PanelElement>) -> Panel {
        let hooks: Box<dyn PanelHooks> = match element.module() {
            Some(module) => match self.factories.get(module) {
                Some(factory) => factory.create(element.id()),
                None => {
                    log::warn!(
                        "Panel '{}' declares unknown module '{}', using the generic panel",
                        element.id(),
                        module
                    );
                    Box::new(GenericPanel)
                }
            },
            None => Box::new(GenericPanel),
        };
        log::info!("Created panel '{}'", element.id());
        Panel::new(element, hooks)
    }

    /// Load the shared modules once; later calls return immediately
    pub async fn ensure_shared_modules(&self) -> Result<()> {
        let Some(loader) = self.shared_modules.clone() else {
            return Ok(());
        };
        self.shared_loaded
            .get_or_try_init(|| async move {
                log::debug!("Loading shared panel modules");
                loader.load().await
            })
            .await?;
        Ok(())
    }
}
