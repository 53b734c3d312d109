use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::nav::dialog::DialogPanels;
use crate::nav::document::{PanelDecl, ScreenLayout};
use crate::nav::embed::EmbedResolver;
use crate::nav::router::RouterSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub root_panel_id: String,
    pub frame_panel_id: String,
    /// Milliseconds a panel transition takes to settle
    pub transition_ms: u64,
    /// Abort navigations whose hooks stall longer than this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_timeout_ms: Option<u64>,
    pub dialogs: DialogPanels,
    pub screen: ScreenLayout,
    pub embeds: EmbedResolver,
    pub panels: Vec<PanelDecl>,
}

fn default_panels() -> Vec<PanelDecl> {
    vec![
        PanelDecl::new("root"),
        PanelDecl::new("wifi")
            .module("panels/wifi/panel")
            .parent("root")
            .with_sub_panels(),
        PanelDecl::new("wifi-manage-networks")
            .module("panels/wifi_manage_networks/panel")
            .parent("wifi"),
        PanelDecl::new("wifi-wps").parent("wifi"),
        PanelDecl::new("wifi-select-certificate-file").parent("wifi-manage-networks"),
        PanelDecl::new("bluetooth").module("panels/bluetooth/panel").parent("root"),
        PanelDecl::new("frame").module("panels/frame/panel").parent("root"),
        PanelDecl::new("app-alert-dialog"),
        PanelDecl::new("app-confirm-dialog"),
        PanelDecl::new("app-prompt-dialog"),
    ]
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            root_panel_id: "root".to_string(),
            frame_panel_id: "frame".to_string(),
            transition_ms: 300,
            hook_timeout_ms: None,
            dialogs: DialogPanels::default(),
            screen: ScreenLayout::default(),
            embeds: EmbedResolver::default(),
            panels: default_panels(),
        }
    }
}

impl NavigatorConfig {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("settings-nav")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".settings-nav")
        };
        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config = Self::from_toml(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!("Loaded config with {} panels", config.panels.len());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: NavigatorConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn router_settings(&self) -> RouterSettings {
        RouterSettings {
            root_panel_id: self.root_panel_id.clone(),
            frame_panel_id: self.frame_panel_id.clone(),
            hook_timeout: self.hook_timeout_ms.map(Duration::from_millis),
            embeds: self.embeds.clone(),
        }
    }
}
