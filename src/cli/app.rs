use super::commands::{DialogCommand, WalkCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "settings-nav")]
#[command(about = "Drive the settings panel navigator from the command line")]
pub struct Cli {
    /// Configuration file to use instead of the one in the config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the declared panels
    Panels,
    /// Boot the navigator and visit panels in order
    Walk(WalkCommand),
    /// Open a built-in dialog and press one of its buttons
    Dialog(DialogCommand),
    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::dialog::DialogType;

    #[test]
    fn test_parse_walk() {
        let cli = Cli::parse_from(["settings-nav", "walk", "wifi", "wifi-wps", "--tablet", "--back"]);
        match cli.command {
            Commands::Walk(walk) => {
                assert_eq!(walk.panels, vec!["wifi", "wifi-wps"]);
                assert!(walk.tablet);
                assert!(walk.back);
            }
            _ => panic!("expected walk"),
        }
    }

    #[test]
    fn test_parse_prompt_dialog() {
        let cli = Cli::parse_from([
            "settings-nav",
            "--config",
            "/tmp/nav.toml",
            "dialog",
            "prompt",
            "enter-name",
            "--input",
            "y",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/nav.toml")));
        match cli.command {
            Commands::Dialog(dialog) => {
                assert!(matches!(dialog.kind, DialogType::Prompt));
                assert_eq!(dialog.message, "enter-name");
                assert_eq!(dialog.input.as_deref(), Some("y"));
                assert!(!dialog.cancel);
            }
            _ => panic!("expected dialog"),
        }
    }
}
