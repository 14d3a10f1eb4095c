//! Inclusive Chat API
//!
//! A small HTTP service that relays chat messages to Google's Gemini API
//! with a fixed child-friendly, bias-aware persona:
//! - Keeps short per-conversation history in memory (last 10 exchanges)
//! - Assembles each model request from stored turns + the new message
//! - Applies fixed generation parameters and safety thresholds
//! - Returns the reply together with the conversation id
//!
//! REQUEST LOOP:
//! RESOLVE ID → SNAPSHOT HISTORY → CALL MODEL → RECORD EXCHANGE → REPLY

pub mod api;
pub mod chat;
pub mod error;
pub mod gemini;
pub mod models;
pub mod store;

pub use error::Result;

// Re-export common types
pub use chat::{ChatModel, ChatService};
pub use models::{ChatReply, Turn, TurnRole};
pub use store::ConversationStore;
