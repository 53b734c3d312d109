use std::fmt;

use thiserror::Error;

/// Step of the navigation protocol a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    SharedModules,
    BeforeHide,
    BeforeShow,
    Transition,
    Hide,
    Show,
    Submit,
    Cancel,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookStage::SharedModules => "shared-modules",
            HookStage::BeforeHide => "beforeHide",
            HookStage::BeforeShow => "beforeShow",
            HookStage::Transition => "transition",
            HookStage::Hide => "hide",
            HookStage::Show => "show",
            HookStage::Submit => "onSubmit",
            HookStage::Cancel => "onCancel",
        };
        f.write_str(name)
    }
}

/// Errors surfaced through a [`NavigationHandle`](super::NavigationHandle)
///
/// None of these commit navigation state.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("panel '{0}' is not declared in the document")]
    PanelNotFound(String),

    #[error("refusing to embed untrusted app '{0}'")]
    UntrustedEmbed(String),

    #[error("{stage} of panel '{panel_id}' failed: {source}")]
    Hook {
        panel_id: String,
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("{stage} of panel '{panel_id}' did not settle in time")]
    HookTimeout { panel_id: String, stage: HookStage },
}

/// Errors surfaced through a [`DialogHandle`](super::DialogHandle) or a button press
#[derive(Debug, Error)]
pub enum DialogError {
    #[error("dialog '{0}' is already showing")]
    AlreadyShowing(String),

    #[error("dialog panel '{0}' is not declared in the document")]
    PanelNotFound(String),

    #[error("localizable `{0}` option is missing its id")]
    MalformedL10n(&'static str),

    #[error("{stage} of dialog '{panel_id}' failed: {source}")]
    Hook {
        panel_id: String,
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("no dialog is waiting for input")]
    NoActiveDialog,

    #[error("{0} dialogs have no cancel button")]
    ButtonNotBound(&'static str),

    #[error("dialog was dropped before it produced a result")]
    Aborted,
}
