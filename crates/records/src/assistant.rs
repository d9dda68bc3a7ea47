//! Chat payloads exchanged with the conversational service.

use serde::{Deserialize, Serialize};

use crate::serde_util;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request body: the full transcript, newest turn last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ChatTurn],
}

/// A side-effecting action the service executed while answering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutedAction {
    pub action: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutedAction {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    #[serde(deserialize_with = "serde_util::nullable_string")]
    pub reply: String,
    #[serde(deserialize_with = "nullable_actions")]
    pub actions: Vec<ExecutedAction>,
}

fn nullable_actions<'de, D>(deserializer: D) -> Result<Vec<ExecutedAction>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ExecutedAction>>::deserialize(deserializer)?.unwrap_or_default())
}

const MARKER_OPEN: &str = "###{";
const MARKER_CLOSE: &str = "}###";

impl ChatReply {
    pub fn has_side_effects(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Reply text with embedded `###{...}###` action markers removed.
    pub fn display_text(&self) -> String {
        strip_action_markers(&self.reply)
    }

    /// Action messages joined for a status banner.
    pub fn action_summary(&self) -> String {
        self.actions
            .iter()
            .map(|a| a.message.as_str())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

/// Remove every `###{...}###` marker whose body contains no `#`.
pub fn strip_action_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(MARKER_OPEN) {
        let body_start = start + MARKER_OPEN.len();
        let body = &rest[body_start..];
        match body.find('#') {
            Some(hash) if hash >= 2 && body.as_bytes()[hash - 1] == b'}' && body[hash..].starts_with("###") => {
                out.push_str(&rest[..start]);
                rest = &body[hash - 1 + MARKER_CLOSE.len()..];
            }
            _ => {
                out.push_str(&rest[..body_start]);
                rest = body;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_removed_from_display_text() {
        let reply = ChatReply {
            reply: "C'est noté. ###{\"action\":\"add_vente\",\"qte\":3}### Bonne journée".into(),
            actions: vec![],
        };
        assert_eq!(reply.display_text(), "C'est noté.  Bonne journée");
    }

    #[test]
    fn unterminated_marker_is_left_alone() {
        assert_eq!(strip_action_markers("a ###{b c"), "a ###{b c");
        assert_eq!(strip_action_markers("###{x#y}### z"), "###{x#y}### z");
        assert_eq!(strip_action_markers("###{a}######{b}###!"), "!");
    }

    #[test]
    fn null_reply_and_missing_actions_deserialize() {
        let reply: ChatReply = serde_json::from_str(r#"{"reply": null}"#).unwrap();
        assert_eq!(reply.reply, "");
        assert!(!reply.has_side_effects());
    }

    #[test]
    fn action_summary_joins_messages() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"reply": "ok", "actions": [
                {"action": "add_vente", "message": "Vente ajoutée"},
                {"action": "add_rappel", "message": "Rappel créé", "error": null}
            ]}"#,
        )
        .unwrap();
        assert_eq!(reply.action_summary(), "Vente ajoutée · Rappel créé");
        assert!(reply.actions.iter().all(|a| !a.failed()));
    }

    #[test]
    fn request_serializes_roles_lowercase() {
        let turns = [ChatTurn::user("Bonjour"), ChatTurn::assistant("Salut")];
        let json = serde_json::to_value(ChatRequest { messages: &turns }).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Salut");
    }
}
