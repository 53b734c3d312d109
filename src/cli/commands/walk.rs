use crate::config::NavigatorConfig;
use crate::nav::{LaunchContext, NavigationOutcome, PanelOptions, PanelReady, ScreenLayout, SettingsShell};
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use log::info;
use tokio::sync::broadcast;

#[derive(Args)]
pub struct WalkCommand {
    /// Panels to visit, in order
    #[arg(required = true)]
    pub panels: Vec<String>,

    /// Use a landscape tablet screen (two-column layout)
    #[arg(long)]
    pub tablet: bool,

    /// Finish with a back navigation
    #[arg(long)]
    pub back: bool,
}

/// Boot the shell and navigate through the given panels, printing each panel-ready event
pub async fn walk_command(mut config: NavigatorConfig, args: WalkCommand) -> Result<()> {
    if args.tablet {
        config.screen = ScreenLayout {
            width: 1024,
            landscape: true,
        };
    }
    info!("Walking {} panels", args.panels.len());

    let shell = SettingsShell::with_builtin_panels(config, LaunchContext::default());
    let mut ready = shell.router().subscribe();

    let outcome = shell.start().await.context("Failed to show the initial panel")?;
    report("start", &outcome);
    print_ready(&mut ready);

    for panel in &args.panels {
        let outcome = shell
            .router()
            .navigate(panel.clone(), PanelOptions::default())
            .await
            .with_context(|| format!("Navigation to '{}' failed", panel))?;
        report(panel, &outcome);
        print_ready(&mut ready);
    }

    if args.back {
        let outcome = shell.router().back().await.context("Back navigation failed")?;
        report("back", &outcome);
        print_ready(&mut ready);
    }

    Ok(())
}

fn report(request: &str, outcome: &NavigationOutcome) {
    match outcome {
        NavigationOutcome::Committed(panel_id) => {
            println!("{} {} → {}", "✓".bright_green().bold(), request, panel_id.bright_green().bold())
        }
        NavigationOutcome::AlreadyCurrent => println!("{} {} is already showing", "=".bright_white(), request),
        NavigationOutcome::ActivityClosed => println!("{} {} closed the activity", "↩".bright_cyan(), request),
        NavigationOutcome::Superseded => println!("{} {} was superseded", "⤼".bright_yellow(), request),
        NavigationOutcome::NoHistory => println!("{} {}: nothing to go back to", "⚠️".bright_yellow(), request),
    }
}

fn print_ready(ready: &mut broadcast::Receiver<PanelReady>) {
    while let Ok(event) = ready.try_recv() {
        println!(
            "  {} panel ready: {} → {}",
            "●".bright_green(),
            event.previous.as_deref().unwrap_or("-"),
            event.current.bright_white().bold()
        );
    }
}
