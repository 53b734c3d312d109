//! Embedded companion apps
//!
//! A navigation target containing `app:<name>` asks for another app to be
//! hosted inside the frame panel. Only apps listed in the configuration are
//! embedded.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

static APP_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"app:(\w+)").unwrap());

const DEFAULT_SRC: &str = "settings.html";
const MANIFEST: &str = "manifest.webapp";

/// A trusted app that may be embedded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedApp {
    /// Page to load relative to the app origin, `settings.html` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// Resolved frame contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedTarget {
    pub src: String,
    pub mozapp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedResolver {
    /// Origin of an app, `{app}` is replaced by the app name
    pub origin_template: String,
    /// Merged over the default trusted apps when deserialized
    #[serde(deserialize_with = "merge_default_apps")]
    pub apps: BTreeMap<String, EmbedApp>,
}

impl Default for EmbedResolver {
    fn default() -> Self {
        Self {
            origin_template: "app://{app}.gaiamobile.org/".to_string(),
            apps: default_apps(),
        }
    }
}

fn default_apps() -> BTreeMap<String, EmbedApp> {
    ["keyboard", "bluetooth"]
        .into_iter()
        .map(|name| (name.to_string(), EmbedApp::default()))
        .collect()
}

fn merge_default_apps<'de, D>(deserializer: D) -> Result<BTreeMap<String, EmbedApp>, D::Error>
where
    D: Deserializer<'de>,
{
    let configured = BTreeMap::<String, EmbedApp>::deserialize(deserializer)?;
    let mut apps = default_apps();
    apps.extend(configured);
    Ok(apps)
}

impl EmbedResolver {
    /// Name of the app a panel id links to, if it is an app link at all
    pub fn app_name(panel_id: &str) -> Option<&str> {
        APP_LINK
            .captures(panel_id)
            .and_then(|captures| captures.get(1))
            .map(|name| name.as_str())
    }

    /// Frame contents for a trusted app, `None` for anything else
    pub fn resolve(&self, app_name: &str) -> Option<EmbedTarget> {
        let app = self.apps.get(app_name)?;
        let origin = self.origin_template.replace("{app}", app_name);
        let src = app.src.as_deref().unwrap_or(DEFAULT_SRC);
        Some(EmbedTarget {
            src: format!("{}{}", origin, src),
            mozapp: format!("{}{}", origin, MANIFEST),
        })
    }
}
