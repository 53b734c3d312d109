//! Options passed along with navigation and dialog requests

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dialog::DialogTransition;
use super::error::DialogError;

/// Options handed to `navigate`/`show` and forwarded to every lifecycle hook
///
/// Embed targets use `mozapp`/`src`, dialogs use the title/message/button
/// fields. Anything panel specific goes into `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mozapp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<DialogTransition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<L10nText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<L10nText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button: Option<L10nText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_button: Option<L10nText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PanelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<L10nText>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<L10nText>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_submit_button(mut self, label: impl Into<L10nText>) -> Self {
        self.submit_button = Some(label.into());
        self
    }

    pub fn with_cancel_button(mut self, label: impl Into<L10nText>) -> Self {
        self.cancel_button = Some(label.into());
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_transition(mut self, transition: DialogTransition) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Attach a panel specific value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// A localizable label: either a bare l10n id or a `{id, args, style}` object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum L10nText {
    Id(String),
    Message(L10nMessage),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct L10nMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl L10nText {
    /// Resolve into a label, failing when an object form carries no id
    ///
    /// `field` names the option being resolved and ends up in the error.
    pub fn resolve(&self, field: &'static str) -> Result<LocalizedLabel, DialogError> {
        match self {
            L10nText::Id(id) => Ok(LocalizedLabel::new(id.clone())),
            L10nText::Message(message) => match message.id.as_deref() {
                Some(id) if !id.is_empty() => Ok(LocalizedLabel {
                    id: id.to_string(),
                    args: message.args.clone(),
                    style: message.style.clone(),
                }),
                _ => Err(DialogError::MalformedL10n(field)),
            },
        }
    }
}

impl From<&str> for L10nText {
    fn from(id: &str) -> Self {
        L10nText::Id(id.to_string())
    }
}

impl From<String> for L10nText {
    fn from(id: String) -> Self {
        L10nText::Id(id)
    }
}

impl From<L10nMessage> for L10nText {
    fn from(message: L10nMessage) -> Self {
        L10nText::Message(message)
    }
}

/// A resolved label as rendered into dialog chrome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedLabel {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl LocalizedLabel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            args: None,
            style: None,
        }
    }
}
