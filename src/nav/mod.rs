//! Panel navigation and dialog engine

pub mod boot;
pub mod dialog;
pub mod document;
pub mod embed;
pub mod error;
pub mod lifecycle;
pub mod options;
pub mod registry;
pub mod router;
pub mod transition;
pub mod visibility;

pub use boot::{LaunchContext, SettingsShell};
pub use dialog::{
    DialogEvent, DialogHandle, DialogKind, DialogOrchestrator, DialogPanels, DialogResult, DialogResultType,
    DialogTransition,
};
pub use document::{PanelDecl, PanelDocument, PanelElement, ScreenLayout, Viewport};
pub use error::{DialogError, HookStage, NavigationError};
pub use lifecycle::{GenericPanel, Panel, PanelHooks};
pub use options::{L10nMessage, L10nText, LocalizedLabel, PanelOptions};
pub use registry::{PanelFactory, PanelRegistry, SharedModuleLoader};
pub use router::{
    ActivityHandler, NavigationHandle, NavigationOutcome, NavigationRouter, NavigationState, RouterPhase,
    RouterSettings,
};
pub use transition::{ColumnMode, Compositor, ImmediateCompositor, PanelReady, TimedCompositor, TransitionEngine};
pub use visibility::VisibilityBridge;
