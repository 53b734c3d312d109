use crate::config::NavigatorConfig;
use crate::nav::{DialogEvent, ImmediateCompositor, LaunchContext, PanelOptions, SettingsShell};
use crate::panels;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::info;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DialogType {
    Alert,
    Confirm,
    Prompt,
}

#[derive(Args)]
pub struct DialogCommand {
    /// Built-in dialog to open
    #[arg(value_enum)]
    pub kind: DialogType,

    /// Localization id of the dialog message
    pub message: String,

    /// Press cancel instead of submit
    #[arg(long)]
    pub cancel: bool,

    /// Type this into the prompt input before pressing a button
    #[arg(long)]
    pub input: Option<String>,

    /// Initial value of the prompt input
    #[arg(long)]
    pub default_value: Option<String>,
}

/// Open a built-in dialog, press a button and print the result as JSON
pub async fn dialog_command(config: NavigatorConfig, args: DialogCommand) -> Result<()> {
    let shell = SettingsShell::new(
        config,
        Arc::new(ImmediateCompositor),
        LaunchContext::default(),
        panels::register_builtin,
    );
    shell.start().await.context("Failed to show the initial panel")?;

    let dialogs = shell.dialogs();
    let mut events = dialogs.subscribe();

    let mut options = PanelOptions::new();
    if let Some(default_value) = &args.default_value {
        options = options.with_default_value(default_value.clone());
    }
    info!("Opening {:?} dialog '{}'", args.kind, args.message);
    let mut handle = match args.kind {
        DialogType::Alert => dialogs.alert(args.message.clone(), options),
        DialogType::Confirm => dialogs.confirm(args.message.clone(), options),
        DialogType::Prompt => dialogs.prompt(args.message.clone(), options),
    };

    tokio::select! {
        opened = wait_opened(&mut events) => opened?,
        output = &mut handle => {
            let result = output?;
            anyhow::bail!("Dialog closed before it opened ({:?})", result.kind);
        }
    }

    if let Some(input) = &args.input {
        let element = dialogs.active_element().context("No dialog is waiting for input")?;
        element.set_input_value(input.clone());
    }

    if args.cancel {
        dialogs.cancel()?;
    } else {
        dialogs.submit()?;
    }

    let result = handle.await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn wait_opened(events: &mut broadcast::Receiver<DialogEvent>) -> Result<()> {
    loop {
        if let DialogEvent::Opened { .. } = events.recv().await.context("Dialog events closed")? {
            return Ok(());
        }
    }
}
