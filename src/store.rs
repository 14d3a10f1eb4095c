//! Conversation history storage
//!
//! In-memory, process-lifetime store mapping conversation ids to ordered
//! turn sequences. Mutation is serialized per conversation, not globally,
//! so unrelated conversations never contend on one lock.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::models::{Turn, TurnRole};

/// Maximum retained turns per conversation (last 10 exchanges)
pub const HISTORY_CAP: usize = 20;

/// Ordered turn sequence for one conversation
#[derive(Debug, Default)]
pub struct Conversation {
    /// VecDeque for efficient drop-oldest trimming
    turns: VecDeque<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            turns: VecDeque::new(),
        }
    }

    /// Append a turn, dropping the oldest once the cap is exceeded
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > HISTORY_CAP {
            self.turns.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Clone the current turns in chronological order
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }
}

/// Process-wide conversation store.
///
/// Explicitly constructed and injected into the service (never a hidden
/// global). Entries live until process termination; the only bound is the
/// per-conversation turn cap.
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Arc<Mutex<Conversation>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Get the conversation handle for an id, registering an empty one if
    /// absent. Always succeeds; retrieval is idempotent.
    pub async fn get_or_create(&self, conversation_id: &str) -> Arc<Mutex<Conversation>> {
        {
            let conversations = self.conversations.read().await;
            if let Some(conversation) = conversations.get(conversation_id) {
                return Arc::clone(conversation);
            }
        }

        let mut conversations = self.conversations.write().await;
        Arc::clone(
            conversations
                .entry(conversation_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Conversation::new()))),
        )
    }

    /// Clone the prior turns for an id without holding its lock afterwards
    pub async fn snapshot(&self, conversation_id: &str) -> Vec<Turn> {
        let conversation = self.get_or_create(conversation_id).await;
        let locked = conversation.lock().await;
        locked.snapshot()
    }

    /// Append a single turn, trimming to the most recent `HISTORY_CAP`
    pub async fn append(&self, conversation_id: &str, role: TurnRole, text: impl Into<String>) {
        let conversation = self.get_or_create(conversation_id).await;
        let mut locked = conversation.lock().await;
        locked.push(Turn::new(role, text));
    }

    /// Append a user turn and the assistant reply under one lock acquisition
    /// so concurrent requests for the same conversation cannot interleave
    /// their appends.
    pub async fn append_exchange(
        &self,
        conversation_id: &str,
        user_text: impl Into<String>,
        reply_text: impl Into<String>,
    ) {
        let conversation = self.get_or_create(conversation_id).await;
        let mut locked = conversation.lock().await;
        locked.push(Turn::new(TurnRole::User, user_text));
        locked.push(Turn::new(TurnRole::Assistant, reply_text));
    }

    /// Number of registered conversations
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_registers_once() {
        let store = ConversationStore::new();

        let first = store.get_or_create("conv-1").await;
        first.lock().await.push(Turn::new(TurnRole::User, "hello"));

        let second = store.get_or_create("conv-1").await;
        assert_eq!(second.lock().await.len(), 1);
        assert_eq!(store.conversation_count().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_of_unknown_id_is_empty() {
        let store = ConversationStore::new();
        let turns = store.snapshot("never-seen").await;
        assert!(turns.is_empty());
        // The id is now registered
        assert_eq!(store.conversation_count().await, 1);
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = ConversationStore::new();

        store.append("conv-1", TurnRole::User, "first").await;
        store.append("conv-1", TurnRole::Assistant, "second").await;
        store.append("conv-1", TurnRole::User, "third").await;

        let turns = store.snapshot("conv-1").await;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].text, "first");
        assert_eq!(turns[1].text, "second");
        assert_eq!(turns[2].text, "third");
    }

    #[tokio::test]
    async fn test_history_never_exceeds_cap() {
        let store = ConversationStore::new();

        for i in 0..50 {
            store
                .append("conv-1", TurnRole::User, format!("message {}", i))
                .await;
            let turns = store.snapshot("conv-1").await;
            assert!(turns.len() <= HISTORY_CAP);
        }

        // Survivors are exactly the most recent 20 in original order
        let turns = store.snapshot("conv-1").await;
        assert_eq!(turns.len(), HISTORY_CAP);
        for (i, turn) in turns.iter().enumerate() {
            assert_eq!(turn.text, format!("message {}", 30 + i));
        }
    }

    #[tokio::test]
    async fn test_eleven_exchanges_keep_exchanges_two_through_eleven() {
        let store = ConversationStore::new();

        for i in 1..=11 {
            store
                .append_exchange("conv-1", format!("question {}", i), format!("answer {}", i))
                .await;
        }

        let turns = store.snapshot("conv-1").await;
        assert_eq!(turns.len(), HISTORY_CAP);
        assert_eq!(turns[0].text, "question 2");
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[19].text, "answer 11");
        assert_eq!(turns[19].role, TurnRole::Assistant);
    }

    #[tokio::test]
    async fn test_concurrent_exchanges_do_not_interleave() {
        let store = Arc::new(ConversationStore::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append_exchange("conv-1", format!("q{}", i), format!("a{}", i))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Every user turn is immediately followed by its matching reply
        let turns = store.snapshot("conv-1").await;
        assert_eq!(turns.len(), 16);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role, TurnRole::User);
            assert_eq!(pair[1].role, TurnRole::Assistant);
            assert_eq!(pair[0].text[1..], pair[1].text[1..]);
        }
    }

    #[tokio::test]
    async fn test_conversations_are_isolated() {
        let store = ConversationStore::new();

        store.append("conv-a", TurnRole::User, "for a").await;
        store.append("conv-b", TurnRole::User, "for b").await;

        assert_eq!(store.snapshot("conv-a").await.len(), 1);
        assert_eq!(store.snapshot("conv-b").await.len(), 1);
        assert_eq!(store.conversation_count().await, 2);
    }
}
