//! Integration tests for the dialog orchestrator

mod common;

use common::{HarnessBuilder, PanelScript, opened};
use futures::FutureExt;
use serde_json::json;
use settings_nav::nav::{
    DialogError, DialogEvent, DialogResult, DialogResultType, HookStage, L10nMessage, LocalizedLabel, PanelOptions,
    dialog::{DialogChrome, DialogPhase},
};

/// An alert shows its message, dims the scrim and resolves on submit
#[tokio::test]
async fn test_alert_submit() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let handle = dialogs.alert("wifi-connected", PanelOptions::new().with_title("wifi"));
    opened(&mut events, "app-alert-dialog").await;

    let element = harness.element("app-alert-dialog");
    let chrome = element.chrome();
    assert_eq!(chrome.message, Some(LocalizedLabel::new("wifi-connected")));
    assert_eq!(chrome.title, Some(LocalizedLabel::new("wifi")));
    assert!(!chrome.cancel_bound);
    assert!(element.has_class("alert-dialog"));
    assert!(element.has_class("zoom-in-80"));
    assert!(element.has_class("current"));
    assert!(harness.shell.viewport().is_scrim_dimmed());

    dialogs.submit().unwrap();
    let result = handle.await.unwrap();

    assert_eq!(
        result,
        DialogResult {
            kind: DialogResultType::Submit,
            value: None
        }
    );
    assert_eq!(element.chrome(), DialogChrome::default());
    assert_eq!(element.class_name(), "");
    assert!(!harness.shell.viewport().is_scrim_dimmed());
    assert_eq!(dialogs.phase(), DialogPhase::Idle);
    assert_eq!(harness.router().current_panel_id().as_deref(), Some("root"));
}

/// Alerts have no cancel button
#[tokio::test]
async fn test_alert_cancel_is_not_bound() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let handle = dialogs.alert("done", PanelOptions::default());
    opened(&mut events, "app-alert-dialog").await;

    assert!(matches!(dialogs.cancel(), Err(DialogError::ButtonNotBound("alert"))));

    dialogs.submit().unwrap();
    assert_eq!(handle.await.unwrap().kind, DialogResultType::Submit);
}

/// A prompt submitted after editing returns the edited input
#[tokio::test]
async fn test_prompt_returns_edited_input() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let handle = dialogs.prompt("device-name", PanelOptions::new().with_default_value("x"));
    opened(&mut events, "app-prompt-dialog").await;

    let element = dialogs.active_element().unwrap();
    assert_eq!(element.input_value(), "x");
    element.set_input_value("y");
    dialogs.submit().unwrap();

    let result = handle.await.unwrap();
    assert_eq!(result.kind, DialogResultType::Submit);
    assert_eq!(result.value, Some(json!("y")));
    assert_eq!(element.input_value(), "");
}

/// Cancelling a prompt yields the cancel hook's value, not the input
#[tokio::test]
async fn test_prompt_cancel_uses_hook_value() {
    let harness = HarnessBuilder::new()
        .script(
            "app-prompt-dialog",
            PanelScript {
                cancel_value: Some(json!("kept")),
                ..PanelScript::default()
            },
        )
        .start()
        .await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let handle = dialogs.prompt("device-name", PanelOptions::new().with_default_value("x"));
    opened(&mut events, "app-prompt-dialog").await;
    dialogs.cancel().unwrap();

    let result = handle.await.unwrap();
    assert_eq!(result.kind, DialogResultType::Cancel);
    assert_eq!(result.value, Some(json!("kept")));
}

/// A confirm dialog hands back its submit hook's value
#[tokio::test]
async fn test_confirm_uses_submit_hook_value() {
    let harness = HarnessBuilder::new()
        .script(
            "app-confirm-dialog",
            PanelScript {
                submit_value: Some(json!(true)),
                ..PanelScript::default()
            },
        )
        .start()
        .await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let handle = dialogs.confirm(
        "forget-network",
        PanelOptions::new()
            .with_submit_button("forget")
            .with_cancel_button("keep"),
    );
    opened(&mut events, "app-confirm-dialog").await;

    let chrome = harness.element("app-confirm-dialog").chrome();
    assert_eq!(chrome.submit_label, LocalizedLabel::new("forget"));
    assert_eq!(chrome.cancel_label, LocalizedLabel::new("keep"));
    assert!(chrome.cancel_bound);

    dialogs.submit().unwrap();
    assert_eq!(handle.await.unwrap().value, Some(json!(true)));
}

/// Open and close protocols run the panel hooks in order
#[tokio::test]
async fn test_dialog_hook_order() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let handle = dialogs.show("d1", PanelOptions::default());
    opened(&mut events, "d1").await;
    dialogs.cancel().unwrap();
    handle.await.unwrap();

    assert_eq!(
        harness.calls(),
        vec![
            "d1.init",
            "d1.beforeShow",
            "transition:d1",
            "d1.show",
            "d1.onCancel",
            "d1.beforeHide",
            "transition:d1",
            "d1.hide",
        ]
    );
}

/// Panels shown as dialogs fade in without dimming the scrim
#[tokio::test]
async fn test_panel_dialog_fades() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let handle = dialogs.show("d2", PanelOptions::default());
    opened(&mut events, "d2").await;

    let element = harness.element("d2");
    assert!(element.has_class("panel-dialog"));
    assert!(element.has_class("fade"));
    assert!(!harness.shell.viewport().is_scrim_dimmed());

    dialogs.cancel().unwrap();
    assert_eq!(handle.await.unwrap().kind, DialogResultType::Cancel);
    assert_eq!(element.class_name(), "");
}

/// Requests made while a dialog is up resolve in FIFO order with their own results
#[tokio::test]
async fn test_queued_dialogs_resolve_in_order() {
    let script = |n: i64| PanelScript {
        submit_value: Some(json!(n)),
        ..PanelScript::default()
    };
    let harness = HarnessBuilder::new()
        .script("d1", script(1))
        .script("d2", script(2))
        .script("d3", script(3))
        .start()
        .await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();
    let mut closed = dialogs.subscribe();

    let alert = dialogs.alert("busy", PanelOptions::default());
    let d1 = dialogs.show("d1", PanelOptions::default());
    let d2 = dialogs.show("d2", PanelOptions::default());
    let d3 = dialogs.show("d3", PanelOptions::default());
    assert_eq!(dialogs.queued(), 3);

    for panel_id in ["app-alert-dialog", "d1", "d2", "d3"] {
        opened(&mut events, panel_id).await;
        assert_eq!(dialogs.active_panel_id().as_deref(), Some(panel_id));
        dialogs.submit().unwrap();
    }

    assert_eq!(alert.await.unwrap().value, None);
    assert_eq!(d1.await.unwrap().value, Some(json!(1)));
    assert_eq!(d2.await.unwrap().value, Some(json!(2)));
    assert_eq!(d3.await.unwrap().value, Some(json!(3)));

    let mut order = Vec::new();
    while let Ok(event) = closed.try_recv() {
        if let DialogEvent::Closed { panel_id, .. } = event {
            order.push(panel_id);
        }
    }
    assert_eq!(order, vec!["app-alert-dialog", "d1", "d2", "d3"]);
    assert_eq!(dialogs.phase(), DialogPhase::Idle);
}

/// Asking for the dialog that is already up is rejected at once
#[tokio::test]
async fn test_duplicate_dialog_is_rejected() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let first = dialogs.alert("one", PanelOptions::default());
    opened(&mut events, "app-alert-dialog").await;

    let second = dialogs.alert("two", PanelOptions::default());
    let err = second.now_or_never().expect("rejected synchronously").unwrap_err();
    assert!(matches!(err, DialogError::AlreadyShowing(ref id) if id == "app-alert-dialog"));
    assert_eq!(dialogs.queued(), 0);

    let current_panel = dialogs.show("root", PanelOptions::default());
    let err = current_panel.now_or_never().expect("rejected synchronously").unwrap_err();
    assert!(matches!(err, DialogError::AlreadyShowing(_)));

    dialogs.submit().unwrap();
    first.await.unwrap();
}

/// An undeclared dialog panel fails and the next request still runs
#[tokio::test]
async fn test_missing_dialog_panel() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let missing = dialogs.show("nope", PanelOptions::default());
    let next = dialogs.show("d1", PanelOptions::default());

    assert!(matches!(missing.await, Err(DialogError::PanelNotFound(ref id)) if id == "nope"));

    opened(&mut events, "d1").await;
    dialogs.submit().unwrap();
    assert_eq!(next.await.unwrap().kind, DialogResultType::Submit);
}

/// A localizable object without an id is rejected before the dialog opens
#[tokio::test]
async fn test_malformed_label_is_rejected() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();

    let options = PanelOptions::new().with_title(L10nMessage {
        id: None,
        args: Some(json!({ "n": 2 })),
        style: None,
    });
    let err = dialogs.alert("done", options).await.unwrap_err();

    assert!(matches!(err, DialogError::MalformedL10n("title")));
    assert!(!harness.element("app-alert-dialog").has_class("current"));
    assert_eq!(
        harness.calls(),
        vec![
            "app-alert-dialog.init",
            "app-alert-dialog.beforeShow",
            "app-alert-dialog.beforeHide",
            "app-alert-dialog.hide",
        ]
    );
    assert_eq!(dialogs.phase(), DialogPhase::Idle);
}

/// A failing close hook is reported and the dialog is taken off screen
#[tokio::test]
async fn test_failing_submit_hook() {
    let harness = HarnessBuilder::new()
        .script(
            "app-alert-dialog",
            PanelScript {
                fail_on: Some("onSubmit"),
                ..PanelScript::default()
            },
        )
        .start()
        .await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let handle = dialogs.alert("saved", PanelOptions::default());
    opened(&mut events, "app-alert-dialog").await;
    dialogs.submit().unwrap();

    let err = handle.await.unwrap_err();
    assert!(matches!(
        err,
        DialogError::Hook {
            stage: HookStage::Submit,
            ..
        }
    ));

    let element = harness.element("app-alert-dialog");
    assert_eq!(element.class_name(), "");
    assert!(!element.has_class("current"));
    assert!(!harness.shell.viewport().is_scrim_dimmed());
    assert_eq!(element.chrome(), DialogChrome::default());
    assert_eq!(
        harness.calls(),
        vec![
            "app-alert-dialog.init",
            "app-alert-dialog.beforeShow",
            "transition:app-alert-dialog",
            "app-alert-dialog.show",
            "app-alert-dialog.onSubmit",
            "app-alert-dialog.beforeHide",
            "transition:app-alert-dialog",
            "app-alert-dialog.hide",
        ]
    );
    assert_eq!(dialogs.phase(), DialogPhase::Idle);
}

/// A failing show hook still closes the dialog and hides the panel
#[tokio::test]
async fn test_failing_show_hook() {
    let harness = HarnessBuilder::new()
        .script(
            "d3",
            PanelScript {
                fail_on: Some("show"),
                ..PanelScript::default()
            },
        )
        .start()
        .await;
    let dialogs = harness.dialogs();

    let err = dialogs.show("d3", PanelOptions::default()).await.unwrap_err();

    assert!(matches!(
        err,
        DialogError::Hook {
            stage: HookStage::Show,
            ..
        }
    ));
    assert_eq!(harness.element("d3").class_name(), "");
    assert_eq!(&harness.calls()[3..], ["d3.show", "d3.beforeHide", "transition:d3", "d3.hide"]);
    assert_eq!(dialogs.phase(), DialogPhase::Idle);
}

/// A finished dialog can be asked for again as soon as its caller wakes up
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reopen_right_after_close() {
    let harness = HarnessBuilder::new().start().await;
    let dialogs = harness.dialogs();
    let mut events = dialogs.subscribe();

    let mut handle = dialogs.alert("saved", PanelOptions::default());
    for round in 0..20 {
        opened(&mut events, "app-alert-dialog").await;
        dialogs.submit().unwrap();
        handle.await.unwrap();

        handle = dialogs.alert("saved", PanelOptions::default());
        assert!((&mut handle).now_or_never().is_none(), "reopen rejected in round {}", round);
    }

    opened(&mut events, "app-alert-dialog").await;
    dialogs.submit().unwrap();
    assert_eq!(handle.await.unwrap().kind, DialogResultType::Submit);
}

/// Buttons do nothing without a dialog waiting for input
#[tokio::test]
async fn test_buttons_without_dialog() {
    let harness = HarnessBuilder::new().start().await;

    assert!(matches!(harness.dialogs().submit(), Err(DialogError::NoActiveDialog)));
    assert!(matches!(harness.dialogs().cancel(), Err(DialogError::NoActiveDialog)));
}
