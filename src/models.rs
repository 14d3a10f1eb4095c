//! Core data models for the chat relay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//
// ================= Roles =================
//

/// Who produced a turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Role name in the Gemini request vocabulary ("user" / "model")
    pub fn as_gemini_role(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "model",
        }
    }
}

//
// ================= Turn =================
//

/// One message unit in a conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

//
// ================= Service Reply =================
//

/// Result of one chat exchange returned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization_is_lowercase() {
        let json = serde_json::to_string(&TurnRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let json = serde_json::to_string(&TurnRole::User).unwrap();
        assert_eq!(json, "\"user\"");
    }

    #[test]
    fn test_gemini_role_mapping() {
        assert_eq!(TurnRole::User.as_gemini_role(), "user");
        assert_eq!(TurnRole::Assistant.as_gemini_role(), "model");
    }

    #[test]
    fn test_turn_creation() {
        let turn = Turn::new(TurnRole::User, "Boys are better at math");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.text, "Boys are better at math");
    }
}
