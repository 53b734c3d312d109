use crate::config::NavigatorConfig;
use anyhow::Result;
use colored::*;

/// List declared panels with their module and parent
pub fn panels_command(config: &NavigatorConfig) -> Result<()> {
    if config.panels.is_empty() {
        println!("  {}", "⚠️  No panels declared".bright_yellow().bold());
        return Ok(());
    }

    println!("  {}", "Declared panels:".bright_white().bold());
    for panel in &config.panels {
        let marker = if panel.id == config.root_panel_id {
            "●".bright_green()
        } else {
            "○".white()
        };
        let module = panel.module.as_deref().unwrap_or("(generic)");
        print!("  {} {} {}", marker, panel.id.bright_white().bold(), module.dimmed());
        if let Some(parent) = &panel.parent {
            print!(" ← {}", parent.cyan());
        }
        if panel.require_sub_panels {
            print!(" {}", "[sub-panels]".dimmed());
        }
        println!();
    }

    println!("\nTotal panels: {}", config.panels.len());
    Ok(())
}
