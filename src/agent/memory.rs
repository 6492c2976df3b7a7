// ABOUTME: ConversationMemory - the ordered, append-only history of one conversation.
// ABOUTME: Owned by a single orchestrator; cleared as a whole, never edited in place.

use crate::llm::{Message, Role};

/// Ordered role-tagged message history.
///
/// The system message is not stored here; it is prepended when a
/// request is built.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end of the history.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// A copy of the current history, in conversation order.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Borrow the current history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Discard all history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut memory = ConversationMemory::new();
        memory.append(Role::User, "one");
        memory.append(Role::Assistant, "two");
        memory.append(Role::User, "three");

        let contents: Vec<_> = memory.snapshot().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(memory.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn test_clear_empties_any_history() {
        for size in [0, 1, 7, 100] {
            let mut memory = ConversationMemory::new();
            for i in 0..size {
                memory.append(Role::User, i.to_string());
            }
            memory.clear();
            assert!(memory.snapshot().is_empty());
            assert!(memory.is_empty());
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut memory = ConversationMemory::new();
        memory.append(Role::User, "hi");
        let snapshot = memory.snapshot();
        memory.append(Role::Assistant, "hello");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(memory.len(), 2);
    }
}
