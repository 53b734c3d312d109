//! Shared helpers for the navigation integration tests
//!
//! Every declared panel is backed by a [`RecordingPanel`] that appends
//! `"<panel>.<hook>"` to a shared call log, and the compositor appends
//! `"transition:<panel>"`, so tests can assert on exact protocol order.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use settings_nav::config::NavigatorConfig;
use settings_nav::nav::{
    ActivityHandler, Compositor, DialogEvent, DialogOrchestrator, LaunchContext, NavigationRouter, PanelDecl,
    PanelElement, PanelHooks, PanelOptions, ScreenLayout, SettingsShell,
};
use tokio::sync::broadcast;

pub const RECORDING_MODULE: &str = "test/recording";

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// `"<panel>.<hook>"` paired with the options a show hook received
pub type ShowLog = Arc<Mutex<Vec<(String, PanelOptions)>>>;

/// Per-panel behaviour of a [`RecordingPanel`]
#[derive(Debug, Clone, Default)]
pub struct PanelScript {
    /// Hook that returns an error
    pub fail_on: Option<&'static str>,
    /// Hook that never completes
    pub stall_on: Option<&'static str>,
    pub submit_value: Option<Value>,
    pub cancel_value: Option<Value>,
}

pub struct RecordingPanel {
    id: String,
    log: CallLog,
    shown: ShowLog,
    script: PanelScript,
}

impl RecordingPanel {
    fn record_options(&self, hook: &'static str, options: &PanelOptions) {
        let call = format!("{}.{}", self.id, hook);
        self.shown.lock().unwrap().push((call, options.clone()));
    }

    async fn record(&self, hook: &'static str) -> Result<()> {
        self.log.lock().unwrap().push(format!("{}.{}", self.id, hook));
        if self.script.stall_on == Some(hook) {
            std::future::pending::<()>().await;
        }
        if self.script.fail_on == Some(hook) {
            bail!("{} refused {}", self.id, hook);
        }
        Ok(())
    }
}

#[async_trait]
impl PanelHooks for RecordingPanel {
    async fn on_init(&mut self, _element: &PanelElement, _options: &PanelOptions) -> Result<()> {
        self.record("init").await
    }

    async fn on_uninit(&mut self) -> Result<()> {
        self.record("uninit").await
    }

    async fn on_before_show(&mut self, _element: &PanelElement, options: &PanelOptions) -> Result<()> {
        self.record_options("beforeShow", options);
        self.record("beforeShow").await
    }

    async fn on_show(&mut self, _element: &PanelElement, options: &PanelOptions) -> Result<()> {
        self.record_options("show", options);
        self.record("show").await
    }

    async fn on_before_hide(&mut self) -> Result<()> {
        self.record("beforeHide").await
    }

    async fn on_hide(&mut self) -> Result<()> {
        self.record("hide").await
    }

    async fn on_submit(&mut self) -> Result<Option<Value>> {
        self.record("onSubmit").await?;
        Ok(self.script.submit_value.clone())
    }

    async fn on_cancel(&mut self) -> Result<Option<Value>> {
        self.record("onCancel").await?;
        Ok(self.script.cancel_value.clone())
    }
}

pub struct RecordingCompositor {
    log: CallLog,
}

#[async_trait]
impl Compositor for RecordingCompositor {
    async fn transition_end(&self, element: &PanelElement) {
        self.log.lock().unwrap().push(format!("transition:{}", element.id()));
        tokio::task::yield_now().await;
    }
}

/// Activity that counts how often its result was posted
pub struct RecordingActivity {
    target: String,
    posted: AtomicUsize,
}

impl RecordingActivity {
    pub fn new(target: &str) -> Arc<Self> {
        Arc::new(Self {
            target: target.to_string(),
            posted: AtomicUsize::new(0),
        })
    }

    pub fn posted(&self) -> usize {
        self.posted.load(Ordering::SeqCst)
    }
}

impl ActivityHandler for RecordingActivity {
    fn target_panel_id(&self) -> &str {
        &self.target
    }

    fn post_result(&self) {
        self.posted.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn test_config() -> NavigatorConfig {
    let panel = |id: &str| PanelDecl::new(id).module(RECORDING_MODULE);
    NavigatorConfig {
        panels: vec![
            panel("root"),
            panel("wifi").parent("root").with_sub_panels(),
            panel("wifi-wps").parent("wifi"),
            panel("wifi-manage-networks").parent("wifi"),
            panel("bluetooth").parent("root"),
            panel("frame").parent("root"),
            panel("app-alert-dialog"),
            panel("app-confirm-dialog"),
            panel("app-prompt-dialog"),
            panel("d1"),
            panel("d2"),
            panel("d3"),
        ],
        ..NavigatorConfig::default()
    }
}

pub struct HarnessBuilder {
    config: NavigatorConfig,
    launch: LaunchContext,
    scripts: HashMap<String, PanelScript>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            config: test_config(),
            launch: LaunchContext::default(),
            scripts: HashMap::new(),
        }
    }

    pub fn script(mut self, panel_id: &str, script: PanelScript) -> Self {
        self.scripts.insert(panel_id.to_string(), script);
        self
    }

    pub fn tablet(mut self) -> Self {
        self.config.screen = ScreenLayout {
            width: 1024,
            landscape: true,
        };
        self
    }

    pub fn hook_timeout(mut self, timeout: Duration) -> Self {
        self.config.hook_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn launch(mut self, launch: LaunchContext) -> Self {
        self.launch = launch;
        self
    }

    pub fn build(self) -> Harness {
        let log = CallLog::default();
        let shown = ShowLog::default();
        let factory_shown = shown.clone();
        let compositor = Arc::new(RecordingCompositor { log: log.clone() });
        let factory_log = log.clone();
        let scripts = self.scripts;

        let shell = SettingsShell::new(self.config, compositor, self.launch, move |registry| {
            registry.register_fn(RECORDING_MODULE, move |id| -> Box<dyn PanelHooks> {
                Box::new(RecordingPanel {
                    id: id.to_string(),
                    log: factory_log.clone(),
                    shown: factory_shown.clone(),
                    script: scripts.get(id).cloned().unwrap_or_default(),
                })
            });
        });

        Harness { log, shown, shell }
    }

    /// Build, show the initial panel and clear the call log
    pub async fn start(self) -> Harness {
        let harness = self.build();
        harness.shell.start().await.expect("startup navigation");
        harness.clear();
        harness
    }
}

pub struct Harness {
    pub log: CallLog,
    pub shown: ShowLog,
    pub shell: SettingsShell,
}

impl Harness {
    pub fn router(&self) -> &NavigationRouter {
        self.shell.router()
    }

    pub fn dialogs(&self) -> &DialogOrchestrator {
        self.shell.dialogs()
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
        self.shown.lock().unwrap().clear();
    }

    /// Value of `key` in the options each show hook received
    pub fn shown_with(&self, key: &str) -> Vec<(String, Option<Value>)> {
        self.shown
            .lock()
            .unwrap()
            .iter()
            .map(|(call, options)| (call.clone(), options.get(key).cloned()))
            .collect()
    }

    pub fn element(&self, panel_id: &str) -> Arc<PanelElement> {
        self.router()
            .registry()
            .document()
            .get(panel_id)
            .expect("declared panel")
    }
}

/// Wait until the dialog `panel_id` is open and its buttons are live
pub async fn opened(events: &mut broadcast::Receiver<DialogEvent>, panel_id: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let DialogEvent::Opened { panel_id: id, .. } = events.recv().await.expect("dialog events") {
                if id == panel_id {
                    return;
                }
            }
        }
    })
    .await
    .expect("dialog never opened");
}

/// Poll `condition` until it holds
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never held");
}
