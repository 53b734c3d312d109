//! Modal dialogs layered on top of the panel machinery
//!
//! Alert, confirm and prompt are ordinary panels declared in the document
//! and presented modally; any other panel can be shown as a dialog too.
//! Requests made while a dialog is up wait in a FIFO queue, each caller
//! getting its own [`DialogResult`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, oneshot};

use super::document::PanelElement;
use super::error::{DialogError, HookStage};
use super::lifecycle::Panel;
use super::options::{L10nText, LocalizedLabel, PanelOptions};
use super::router::NavigationRouter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
    Panel,
}

impl DialogKind {
    pub fn name(self) -> &'static str {
        match self {
            DialogKind::Alert => "alert",
            DialogKind::Confirm => "confirm",
            DialogKind::Prompt => "prompt",
            DialogKind::Panel => "panel",
        }
    }

    /// Class applied to the element while it is shown as this kind of dialog
    pub fn dialog_class(self) -> &'static str {
        match self {
            DialogKind::Alert => "alert-dialog",
            DialogKind::Confirm => "confirm-dialog",
            DialogKind::Prompt => "prompt-dialog",
            DialogKind::Panel => "panel-dialog",
        }
    }

    /// Alerts only have a submit button
    pub fn binds_cancel(self) -> bool {
        self != DialogKind::Alert
    }

    pub fn default_transition(self) -> DialogTransition {
        match self {
            DialogKind::Panel => DialogTransition::Fade,
            _ => DialogTransition::ZoomIn,
        }
    }
}

/// Open/close animation of a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogTransition {
    #[serde(rename = "fade")]
    Fade,
    #[serde(rename = "zoom-in-80")]
    ZoomIn,
}

impl DialogTransition {
    pub fn css_class(self) -> &'static str {
        match self {
            DialogTransition::Fade => "fade",
            DialogTransition::ZoomIn => "zoom-in-80",
        }
    }

    /// Zooming dialogs sit on top of a dimmed full-screen scrim
    pub fn dims_scrim(self) -> bool {
        self == DialogTransition::ZoomIn
    }
}

/// Title, message, buttons and input slots of a dialog element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogChrome {
    pub title: Option<LocalizedLabel>,
    pub message: Option<LocalizedLabel>,
    pub submit_label: LocalizedLabel,
    pub cancel_label: LocalizedLabel,
    pub cancel_bound: bool,
    pub input_value: String,
}

impl Default for DialogChrome {
    fn default() -> Self {
        Self {
            title: None,
            message: None,
            submit_label: LocalizedLabel::new("ok"),
            cancel_label: LocalizedLabel::new("cancel"),
            cancel_bound: false,
            input_value: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogResultType {
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogResult {
    #[serde(rename = "type")]
    pub kind: DialogResultType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// The dialog is on screen and its buttons are live
    Opened { panel_id: String, kind: DialogKind },
    Closed {
        panel_id: String,
        kind: DialogKind,
        result: DialogResultType,
    },
}

/// Panel ids backing the built-in dialogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogPanels {
    pub alert: String,
    pub confirm: String,
    pub prompt: String,
}

impl Default for DialogPanels {
    fn default() -> Self {
        Self {
            alert: "app-alert-dialog".to_string(),
            confirm: "app-confirm-dialog".to_string(),
            prompt: "app-prompt-dialog".to_string(),
        }
    }
}

pub type DialogOutput = Result<DialogResult, DialogError>;

#[derive(Debug)]
pub struct DialogRequest {
    pub panel_id: String,
    pub kind: DialogKind,
    pub options: PanelOptions,
    reply: oneshot::Sender<DialogOutput>,
}

impl DialogRequest {
    fn new(panel_id: String, kind: DialogKind, options: PanelOptions) -> (Self, DialogHandle) {
        let (reply, rx) = oneshot::channel();
        let request = Self {
            panel_id,
            kind,
            options,
            reply,
        };
        (request, DialogHandle { rx })
    }

    fn resolve(self, output: DialogOutput) {
        let _ = self.reply.send(output);
    }
}

/// Resolves with the dialog's result once it has fully closed
#[must_use = "a dialog handle does nothing unless awaited"]
#[derive(Debug)]
pub struct DialogHandle {
    rx: oneshot::Receiver<DialogOutput>,
}

impl Future for DialogHandle {
    type Output = DialogOutput;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(DialogError::Aborted)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogPhase {
    #[default]
    Idle,
    Showing,
}

#[derive(Debug)]
struct ActiveDialog {
    panel_id: String,
    kind: DialogKind,
    element: Option<Arc<PanelElement>>,
    buttons: Option<oneshot::Sender<DialogResultType>>,
}

#[derive(Debug, Default)]
struct DialogState {
    phase: DialogPhase,
    active: Option<ActiveDialog>,
    queue: VecDeque<DialogRequest>,
}

struct DialogInner {
    router: NavigationRouter,
    panels: DialogPanels,
    state: Mutex<DialogState>,
    events: broadcast::Sender<DialogEvent>,
}

#[derive(Clone)]
pub struct DialogOrchestrator {
    inner: Arc<DialogInner>,
}

impl DialogOrchestrator {
    /// Dialogs share the router's registry and transition engine
    pub fn new(router: NavigationRouter, panels: DialogPanels) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(DialogInner {
                router,
                panels,
                state: Mutex::new(DialogState::default()),
                events,
            }),
        }
    }

    pub fn panels(&self) -> &DialogPanels {
        &self.inner.panels
    }

    pub fn phase(&self) -> DialogPhase {
        self.inner.state.lock().unwrap().phase
    }

    pub fn active_panel_id(&self) -> Option<String> {
        let state = self.inner.state.lock().unwrap();
        state.active.as_ref().map(|active| active.panel_id.clone())
    }

    /// Element of the dialog currently waiting for input
    pub fn active_element(&self) -> Option<Arc<PanelElement>> {
        let state = self.inner.state.lock().unwrap();
        state.active.as_ref().and_then(|active| active.element.clone())
    }

    /// Number of requests waiting behind the active dialog
    pub fn queued(&self) -> usize {
        self.inner.state.lock().unwrap().queue.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DialogEvent> {
        self.inner.events.subscribe()
    }

    pub fn alert(&self, message: impl Into<L10nText>, options: PanelOptions) -> DialogHandle {
        let panel_id = self.inner.panels.alert.clone();
        self.request(panel_id, DialogKind::Alert, options.with_message(message))
    }

    pub fn confirm(&self, message: impl Into<L10nText>, options: PanelOptions) -> DialogHandle {
        let panel_id = self.inner.panels.confirm.clone();
        self.request(panel_id, DialogKind::Confirm, options.with_message(message))
    }

    /// Ask for a line of text, `options.default_value` pre-fills the input
    pub fn prompt(&self, message: impl Into<L10nText>, options: PanelOptions) -> DialogHandle {
        let panel_id = self.inner.panels.prompt.clone();
        self.request(panel_id, DialogKind::Prompt, options.with_message(message))
    }

    /// Show an arbitrary panel as a dialog
    pub fn show(&self, panel_id: impl Into<String>, options: PanelOptions) -> DialogHandle {
        self.request(panel_id.into(), DialogKind::Panel, options)
    }

    /// Press the active dialog's submit button
    pub fn submit(&self) -> Result<(), DialogError> {
        self.press(DialogResultType::Submit)
    }

    /// Press the active dialog's cancel button
    pub fn cancel(&self) -> Result<(), DialogError> {
        self.press(DialogResultType::Cancel)
    }

    fn press(&self, button: DialogResultType) -> Result<(), DialogError> {
        let mut state = self.inner.state.lock().unwrap();
        let active = state.active.as_mut().ok_or(DialogError::NoActiveDialog)?;
        if button == DialogResultType::Cancel && !active.kind.binds_cancel() {
            return Err(DialogError::ButtonNotBound(active.kind.name()));
        }
        let buttons = active.buttons.take().ok_or(DialogError::NoActiveDialog)?;
        log::debug!("{:?} pressed on dialog '{}'", button, active.panel_id);
        let _ = buttons.send(button);
        Ok(())
    }

    fn request(&self, panel_id: String, kind: DialogKind, options: PanelOptions) -> DialogHandle {
        let (request, handle) = DialogRequest::new(panel_id, kind, options);
        let current_panel = self.inner.router.current_panel_id();

        let mut state = self.inner.state.lock().unwrap();
        let already_showing = state
            .active
            .as_ref()
            .is_some_and(|active| active.panel_id == request.panel_id)
            || current_panel.as_deref() == Some(request.panel_id.as_str());
        if already_showing {
            drop(state);
            log::warn!("Dialog '{}' is already showing", request.panel_id);
            let panel_id = request.panel_id.clone();
            request.resolve(Err(DialogError::AlreadyShowing(panel_id)));
            return handle;
        }

        if state.phase == DialogPhase::Showing {
            log::debug!(
                "Queueing {} dialog '{}' behind {} other(s)",
                request.kind.name(),
                request.panel_id,
                state.queue.len()
            );
            state.queue.push_back(request);
            return handle;
        }

        state.phase = DialogPhase::Showing;
        self.start(&mut state, request);
        handle
    }

    /// Mark `request` active and present it; the caller holds the state lock
    fn start(&self, state: &mut DialogState, request: DialogRequest) {
        state.active = Some(ActiveDialog {
            panel_id: request.panel_id.clone(),
            kind: request.kind,
            element: None,
            buttons: None,
        });
        let orchestrator = self.clone();
        tokio::spawn(async move { orchestrator.run(request).await });
    }

    async fn run(self, request: DialogRequest) {
        let DialogRequest {
            panel_id,
            kind,
            options,
            reply,
        } = request;

        let output = self.present(&panel_id, kind, &options).await;
        match &output {
            Ok(result) => log::info!("Dialog '{}' closed with {:?}", panel_id, result.kind),
            Err(err) => log::warn!("Dialog '{}' failed: {}", panel_id, err),
        }

        // The dialog must read as gone before its caller wakes up.
        {
            let mut state = self.inner.state.lock().unwrap();
            state.active = None;
            match state.queue.pop_front() {
                Some(next) => self.start(&mut state, next),
                None => state.phase = DialogPhase::Idle,
            }
        }
        let _ = reply.send(output);
    }

    async fn present(&self, panel_id: &str, kind: DialogKind, options: &PanelOptions) -> DialogOutput {
        let panel = self
            .inner
            .router
            .registry()
            .get(panel_id)
            .await
            .ok_or_else(|| DialogError::PanelNotFound(panel_id.to_string()))?;
        let element = panel.element().clone();
        let transition = options.transition.unwrap_or(kind.default_transition());

        hook(panel_id, HookStage::BeforeShow, panel.before_show(&element, options)).await?;
        if let Err(err) = init_chrome(&element, kind, options) {
            self.dismiss(&panel, &element, kind, transition, Dismissal::OffScreen).await;
            return Err(err);
        }

        let (buttons, pressed) = oneshot::channel();
        {
            let mut state = self.inner.state.lock().unwrap();
            if let Some(active) = state.active.as_mut() {
                active.element = Some(element.clone());
                active.buttons = Some(buttons);
            }
        }

        self.inner.router.transitions().open_dialog(&element, transition).await;
        if let Err(err) = hook(panel_id, HookStage::Show, panel.show(&element, options)).await {
            self.dismiss(&panel, &element, kind, transition, Dismissal::OnScreen).await;
            return Err(err);
        }

        log::info!("Opened {} dialog '{}'", kind.name(), panel_id);
        let _ = self.inner.events.send(DialogEvent::Opened {
            panel_id: panel_id.to_string(),
            kind,
        });

        let Ok(pressed) = pressed.await else {
            self.dismiss(&panel, &element, kind, transition, Dismissal::OnScreen).await;
            return Err(DialogError::Aborted);
        };
        let closed = self.close(&panel, &element, kind, transition, pressed).await;

        let _ = self.inner.events.send(DialogEvent::Closed {
            panel_id: panel_id.to_string(),
            kind,
            result: pressed,
        });
        closed
    }

    async fn close(
        &self,
        panel: &Panel,
        element: &PanelElement,
        kind: DialogKind,
        transition: DialogTransition,
        pressed: DialogResultType,
    ) -> DialogOutput {
        let panel_id = panel.id();
        let hook_value = match pressed {
            DialogResultType::Submit => hook(panel_id, HookStage::Submit, panel.submit()).await,
            DialogResultType::Cancel => hook(panel_id, HookStage::Cancel, panel.cancel()).await,
        };
        let hook_value = match hook_value {
            Ok(value) => value,
            Err(err) => {
                self.dismiss(panel, element, kind, transition, Dismissal::OnScreen).await;
                return Err(err);
            }
        };

        if let Err(err) = hook(panel_id, HookStage::BeforeHide, panel.before_hide()).await {
            self.dismiss(panel, element, kind, transition, Dismissal::Hiding).await;
            return Err(err);
        }
        self.inner.router.transitions().close_dialog(element, transition).await;

        // Read before the chrome is reset
        let value = match (kind, pressed) {
            (DialogKind::Prompt, DialogResultType::Submit) => Some(Value::String(element.input_value())),
            _ => hook_value,
        };
        let hidden = hook(panel_id, HookStage::Hide, panel.hide()).await;
        reset_chrome(element, kind, transition);
        hidden?;

        Ok(DialogResult { kind: pressed, value })
    }

    /// Take a dialog down after a hook failed, logging any further failures
    async fn dismiss(
        &self,
        panel: &Panel,
        element: &PanelElement,
        kind: DialogKind,
        transition: DialogTransition,
        from: Dismissal,
    ) {
        let panel_id = panel.id();
        if from != Dismissal::Hiding {
            if let Err(err) = hook(panel_id, HookStage::BeforeHide, panel.before_hide()).await {
                log::warn!("Ignoring failure while dismissing: {}", err);
            }
        }
        if from != Dismissal::OffScreen {
            self.inner.router.transitions().close_dialog(element, transition).await;
        }
        if let Err(err) = hook(panel_id, HookStage::Hide, panel.hide()).await {
            log::warn!("Ignoring failure while dismissing: {}", err);
        }
        reset_chrome(element, kind, transition);
    }
}

/// Where an aborted dialog is when it gets dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dismissal {
    /// Shown to the panel but never brought on screen
    OffScreen,
    /// On screen, nothing hidden yet
    OnScreen,
    /// On screen, `before_hide` already ran
    Hiding,
}

async fn hook<T>(
    panel_id: &str,
    stage: HookStage,
    call: impl Future<Output = anyhow::Result<T>>,
) -> Result<T, DialogError> {
    log::debug!("{} of dialog '{}'", stage, panel_id);
    call.await.map_err(|source| DialogError::Hook {
        panel_id: panel_id.to_string(),
        stage,
        source,
    })
}

fn resolve_label(text: Option<&L10nText>, field: &'static str) -> Result<Option<LocalizedLabel>, DialogError> {
    text.map(|text| text.resolve(field)).transpose()
}

/// Fill the chrome slots from the request options
///
/// Every label is resolved before anything is written, so a malformed
/// option leaves the element untouched.
fn init_chrome(element: &PanelElement, kind: DialogKind, options: &PanelOptions) -> Result<(), DialogError> {
    let title = resolve_label(options.title.as_ref(), "title")?;
    let message = resolve_label(options.message.as_ref(), "message")?;
    let submit = resolve_label(options.submit_button.as_ref(), "submitButton")?;
    let cancel = resolve_label(options.cancel_button.as_ref(), "cancelButton")?;

    element.update_chrome(|chrome| {
        chrome.title = title;
        chrome.message = message;
        if let Some(submit) = submit {
            chrome.submit_label = submit;
        }
        if let Some(cancel) = cancel {
            chrome.cancel_label = cancel;
        }
        chrome.cancel_bound = kind.binds_cancel();
        if kind == DialogKind::Prompt {
            chrome.input_value = options.default_value.clone().unwrap_or_default();
        }
    });
    element.add_class(kind.dialog_class());
    Ok(())
}

fn reset_chrome(element: &PanelElement, kind: DialogKind, transition: DialogTransition) {
    element.update_chrome(|chrome| *chrome = DialogChrome::default());
    element.remove_class(kind.dialog_class());
    element.remove_class(transition.css_class());
}
