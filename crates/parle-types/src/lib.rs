//! Shared types for Parle assistant components.
//!
//! This crate provides the events exchanged between parle-core and its hosts
//! (CLI, desktop UI). All types are serializable so a host can forward them
//! over whatever transport it uses.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a Vec that may be null or missing (both become empty vec)
fn deserialize_null_as_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Events sent from host to engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// User submitted a message (one turn)
    MessageSubmitted { text: String },

    /// Input text changed (proposition filtering)
    TextChanged { text: String },

    /// User triggered an action button attached to a reply
    ActionTriggered { action: String },

    /// Reset shown propositions to the base set
    ShowBasePropositions,

    /// Ask the engine to announce every registered extension
    ListExtensions,

    /// Forward a message from the view layer to an extension
    MessageToExtension {
        extension_id: String,
        message: String,
    },
}

/// How the host should present a reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Plain chat bubble
    #[default]
    Message,
    /// Open the settings view
    Settings,
    /// Web link without a follow-up action button
    WebWithoutActionBtn,
    /// Web link with a follow-up action button
    WebWithActionBtn,
}

impl ReplyKind {
    /// Wire name of the kind
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Settings => "settings",
            Self::WebWithoutActionBtn => "web_without_action_btn",
            Self::WebWithActionBtn => "web_with_action_btn",
        }
    }
}

impl std::fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Updates sent from engine to host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineUpdate {
    /// A reply to display
    Reply {
        text: String,
        /// Last reply of the turn (host may stop its typing indicator)
        #[serde(rename = "isFinal")]
        is_final: bool,
        #[serde(default)]
        kind: ReplyKind,
        /// URLs, or action commands for `Message` replies with buttons
        #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
        urls: Vec<String>,
        /// Button labels, parallel to `urls`
        #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
        labels: Vec<String>,
    },

    /// A proposition was appended to the shown list
    PropositionAdded { text: String },

    /// The shown proposition at `index` was removed
    PropositionRemoved { index: usize },

    /// All shown propositions were cleared
    PropositionsCleared,

    /// Display a view generated by an extension
    ShowGeneratedView { url: String },

    /// Request to hide the assistant window
    HideWindowRequested,

    /// Request to quit the host application
    QuitRequested,

    /// A registered extension (answer to `ListExtensions`)
    ExtensionFound { id: String },

    /// Message from an extension to the view layer
    ExtensionMessage {
        extension_id: String,
        message: String,
    },
}

impl EngineUpdate {
    /// Plain message reply with no attached buttons
    #[must_use]
    pub fn message(text: impl Into<String>, is_final: bool) -> Self {
        Self::Reply {
            text: text.into(),
            is_final,
            kind: ReplyKind::Message,
            urls: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Reply text, if this update is a reply
    #[must_use]
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Self::Reply { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_tagged_snake_case() {
        let event: EngineEvent =
            serde_json::from_value(json!({"type": "message_submitted", "text": "salut"})).unwrap();
        assert_eq!(
            event,
            EngineEvent::MessageSubmitted {
                text: "salut".to_string()
            }
        );
    }

    #[test]
    fn event_unit_variant() {
        let event: EngineEvent =
            serde_json::from_value(json!({"type": "show_base_propositions"})).unwrap();
        assert_eq!(event, EngineEvent::ShowBasePropositions);
    }

    #[test]
    fn reply_serializes_wire_names() {
        let update = EngineUpdate::Reply {
            text: String::new(),
            is_final: true,
            kind: ReplyKind::WebWithActionBtn,
            urls: vec!["https://example.org".to_string()],
            labels: Vec::new(),
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["type"], "reply");
        assert_eq!(value["isFinal"], true);
        assert_eq!(value["kind"], "web_with_action_btn");
        assert_eq!(value["urls"][0], "https://example.org");
    }

    #[test]
    fn reply_null_lists_become_empty() {
        let update: EngineUpdate = serde_json::from_value(json!({
            "type": "reply",
            "text": "ok",
            "isFinal": false,
            "urls": null,
            "labels": null
        }))
        .unwrap();
        match update {
            EngineUpdate::Reply {
                kind, urls, labels, ..
            } => {
                assert_eq!(kind, ReplyKind::Message);
                assert!(urls.is_empty());
                assert!(labels.is_empty());
            }
            other => panic!("Expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn reply_kind_display_matches_serde() {
        for kind in [
            ReplyKind::Message,
            ReplyKind::Settings,
            ReplyKind::WebWithoutActionBtn,
            ReplyKind::WebWithActionBtn,
        ] {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value, kind.to_string());
        }
    }

    #[test]
    fn message_helper() {
        let update = EngineUpdate::message("bonjour", true);
        assert_eq!(update.reply_text(), Some("bonjour"));
        assert_eq!(EngineUpdate::PropositionsCleared.reply_text(), None);
    }
}
