//! Declarative panel document
//!
//! Stands in for the host page: every navigable panel and dialog is declared
//! up front as a [`PanelElement`] carrying the module it is backed by, the
//! panel its header links back to, and its live class list. The [`Viewport`]
//! models the window state transitions depend on (scroll offset, screen
//! layout and the modal scrim).

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::dialog::DialogChrome;

/// Declaration of a panel element, usually read from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDecl {
    pub id: String,

    /// Module path of the panel's factory; the generic panel is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Panel the header back link points to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Activate `<id>-*` sub-panels together with this one
    #[serde(default)]
    pub require_sub_panels: bool,
}

impl PanelDecl {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            module: None,
            parent: None,
            require_sub_panels: false,
        }
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_sub_panels(mut self) -> Self {
        self.require_sub_panels = true;
        self
    }
}

/// A live panel element
#[derive(Debug)]
pub struct PanelElement {
    id: String,
    module: Option<String>,
    parent: Option<String>,
    require_sub_panels: bool,
    classes: Mutex<BTreeSet<String>>,
    rendered: AtomicBool,
    chrome: Mutex<DialogChrome>,
}

impl PanelElement {
    pub fn new(decl: PanelDecl) -> Self {
        Self {
            id: decl.id,
            module: decl.module,
            parent: decl.parent,
            require_sub_panels: decl.require_sub_panels,
            classes: Mutex::new(BTreeSet::new()),
            rendered: AtomicBool::new(false),
            chrome: Mutex::new(DialogChrome::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn requires_sub_panels(&self) -> bool {
        self.require_sub_panels
    }

    /// Space separated class list, empty when no class is set
    pub fn class_name(&self) -> String {
        let classes = self.classes.lock().unwrap();
        classes.iter().cloned().collect::<Vec<_>>().join(" ")
    }

    /// Replace the whole class list; an empty string clears it
    pub fn set_class_name(&self, class_name: &str) {
        let mut classes = self.classes.lock().unwrap();
        classes.clear();
        classes.extend(class_name.split_whitespace().map(str::to_string));
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.lock().unwrap().contains(class)
    }

    pub fn add_class(&self, class: &str) {
        self.classes.lock().unwrap().insert(class.to_string());
    }

    pub fn remove_class(&self, class: &str) {
        self.classes.lock().unwrap().remove(class);
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered.load(Ordering::SeqCst)
    }

    /// Mark the element's markup as activated
    ///
    /// Returns true only for the call that performed the activation.
    pub fn activate(&self) -> bool {
        !self.rendered.swap(true, Ordering::SeqCst)
    }

    /// Snapshot of the dialog chrome slots
    pub fn chrome(&self) -> DialogChrome {
        self.chrome.lock().unwrap().clone()
    }

    pub fn update_chrome<R>(&self, f: impl FnOnce(&mut DialogChrome) -> R) -> R {
        let mut chrome = self.chrome.lock().unwrap();
        f(&mut chrome)
    }

    /// Current value of the dialog's input field
    pub fn input_value(&self) -> String {
        self.chrome.lock().unwrap().input_value.clone()
    }

    /// Simulate the user editing the dialog's input field
    pub fn set_input_value(&self, value: impl Into<String>) {
        self.chrome.lock().unwrap().input_value = value.into();
    }
}

/// All declared panel elements, keyed by id
#[derive(Debug, Default)]
pub struct PanelDocument {
    elements: HashMap<String, Arc<PanelElement>>,
    order: Vec<String>,
}

impl PanelDocument {
    pub fn new(decls: impl IntoIterator<Item = PanelDecl>) -> Self {
        let mut document = Self::default();
        for decl in decls {
            document.insert(decl);
        }
        document
    }

    /// Declare a panel; a later declaration with the same id replaces the earlier one
    pub fn insert(&mut self, decl: PanelDecl) -> Arc<PanelElement> {
        let id = decl.id.clone();
        let element = Arc::new(PanelElement::new(decl));
        if self.elements.insert(id.clone(), element.clone()).is_none() {
            self.order.push(id);
        }
        element
    }

    pub fn get(&self, id: &str) -> Option<Arc<PanelElement>> {
        self.elements.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Elements in declaration order
    pub fn elements(&self) -> impl Iterator<Item = &Arc<PanelElement>> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Activate a panel's markup the first time it is loaded
    ///
    /// Panels that require sub-panels activate every `<id>-*` element first.
    /// Returns false when the panel is unknown.
    pub fn activate(&self, id: &str) -> bool {
        let Some(element) = self.elements.get(id) else {
            return false;
        };
        if element.is_rendered() {
            return true;
        }

        if element.requires_sub_panels() {
            let prefix = format!("{}-", id);
            for sub_panel in self.elements().filter(|e| e.id().starts_with(&prefix)) {
                if sub_panel.activate() {
                    log::debug!("Activated sub-panel '{}' of '{}'", sub_panel.id(), id);
                }
            }
        }

        if element.activate() {
            log::debug!("Activated panel '{}'", id);
        }
        true
    }
}

/// Breakpoints used to classify the screen width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutClass {
    Tiny,
    Small,
    Medium,
    Large,
}

impl LayoutClass {
    pub fn from_width(width: u32) -> Self {
        match width {
            0..=767 => LayoutClass::Tiny,
            768..=991 => LayoutClass::Small,
            992..=1200 => LayoutClass::Medium,
            _ => LayoutClass::Large,
        }
    }
}

/// Screen size and orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenLayout {
    pub width: u32,
    pub landscape: bool,
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self {
            width: 320,
            landscape: false,
        }
    }
}

impl ScreenLayout {
    pub fn class(&self) -> LayoutClass {
        LayoutClass::from_width(self.width)
    }

    /// Tablet sized screens held in landscape show two columns
    pub fn is_tablet_and_landscape(&self) -> bool {
        self.landscape && self.class() != LayoutClass::Tiny
    }
}

/// Window state shared by the transition engine and the router
#[derive(Debug, Default)]
pub struct Viewport {
    scroll: Mutex<(i32, i32)>,
    layout: Mutex<ScreenLayout>,
    scrim_dimmed: AtomicBool,
}

impl Viewport {
    pub fn new(layout: ScreenLayout) -> Self {
        Self {
            layout: Mutex::new(layout),
            ..Self::default()
        }
    }

    pub fn layout(&self) -> ScreenLayout {
        *self.layout.lock().unwrap()
    }

    pub fn set_layout(&self, layout: ScreenLayout) {
        *self.layout.lock().unwrap() = layout;
    }

    pub fn scroll_offset(&self) -> (i32, i32) {
        *self.scroll.lock().unwrap()
    }

    pub fn scroll_to(&self, x: i32, y: i32) {
        *self.scroll.lock().unwrap() = (x, y);
    }

    pub fn is_scrim_dimmed(&self) -> bool {
        self.scrim_dimmed.load(Ordering::SeqCst)
    }

    pub fn set_scrim_dimmed(&self, dimmed: bool) {
        self.scrim_dimmed.store(dimmed, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_round_trip() {
        let element = PanelElement::new(PanelDecl::new("wifi"));
        assert_eq!(element.class_name(), "");

        element.set_class_name("current");
        assert!(element.has_class("current"));

        element.add_class("fade");
        assert_eq!(element.class_name(), "current fade");

        element.set_class_name("");
        assert!(!element.has_class("current"));
        assert_eq!(element.class_name(), "");
    }

    #[test]
    fn test_activate_is_one_shot() {
        let element = PanelElement::new(PanelDecl::new("wifi"));
        assert!(element.activate());
        assert!(!element.activate());
        assert!(element.is_rendered());
    }

    #[test]
    fn test_activate_sub_panels() {
        let document = PanelDocument::new([
            PanelDecl::new("wifi").with_sub_panels(),
            PanelDecl::new("wifi-wps"),
            PanelDecl::new("wifi-manage-networks"),
            PanelDecl::new("bluetooth"),
        ]);

        assert!(document.activate("wifi"));
        assert!(document.get("wifi").unwrap().is_rendered());
        assert!(document.get("wifi-wps").unwrap().is_rendered());
        assert!(document.get("wifi-manage-networks").unwrap().is_rendered());
        assert!(!document.get("bluetooth").unwrap().is_rendered());
    }

    #[test]
    fn test_activate_unknown_panel() {
        let document = PanelDocument::new([PanelDecl::new("root")]);
        assert!(!document.activate("missing"));
    }

    #[test]
    fn test_layout_breakpoints() {
        assert_eq!(LayoutClass::from_width(320), LayoutClass::Tiny);
        assert_eq!(LayoutClass::from_width(768), LayoutClass::Small);
        assert_eq!(LayoutClass::from_width(1000), LayoutClass::Medium);
        assert_eq!(LayoutClass::from_width(1280), LayoutClass::Large);

        assert!(!ScreenLayout { width: 1280, landscape: false }.is_tablet_and_landscape());
        assert!(!ScreenLayout { width: 640, landscape: true }.is_tablet_and_landscape());
        assert!(ScreenLayout { width: 1024, landscape: true }.is_tablet_and_landscape());
    }
}
