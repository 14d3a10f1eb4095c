//! Chat orchestration
//!
//! Handles one request end to end: resolve or mint a conversation id, read
//! prior turns, call the model collaborator, record the exchange, return
//! the reply. The collaborator sits behind the ChatModel trait so the
//! service is testable without an API key.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::ChatError;
use crate::models::{ChatReply, Turn};
use crate::store::ConversationStore;

/// Upper bound on accepted message length, to bound payload size and cost
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Trait for reply generation (LLM controlled)
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply for the new user message given the prior turns
    async fn generate(&self, history: &[Turn], user_message: &str) -> crate::Result<String>;
}

/// Orchestrates conversations against the model collaborator
pub struct ChatService {
    store: Arc<ConversationStore>,
    model: Arc<dyn ChatModel>,
}

impl ChatService {
    pub fn new(store: Arc<ConversationStore>, model: Arc<dyn ChatModel>) -> Self {
        Self { store, model }
    }

    /// Handle one chat exchange.
    ///
    /// The conversation lock is not held across the model call: prior turns
    /// are snapshotted first and the exchange is appended afterwards, so
    /// unrelated network latency never serializes other conversations.
    pub async fn respond(
        &self,
        user_message: &str,
        conversation_id: Option<String>,
    ) -> crate::Result<ChatReply> {
        if user_message.trim().is_empty() {
            return Err(ChatError::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }
        if user_message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ChatError::InvalidRequest(format!(
                "message exceeds {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let conversation_id = match conversation_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };

        let history = self.store.snapshot(&conversation_id).await;
        info!(
            "Handling chat for conversation {} ({} prior turns)",
            conversation_id,
            history.len()
        );

        let reply = self.model.generate(&history, user_message).await?;

        self.store
            .append_exchange(&conversation_id, user_message, reply.as_str())
            .await;

        Ok(ChatReply {
            reply,
            conversation_id,
        })
    }
}
