//! Newest-first list of conversation summaries

use super::entities::{Conversation, ConversationId};

/// Ordered collection of conversation summaries.
///
/// Holds at most one entry per identifier and never embeds messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationList {
    entries: Vec<Conversation>,
}

impl ConversationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list, keeping server order and dropping repeated ids
    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        let mut entries: Vec<Conversation> = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            if entries.iter().any(|c| c.id == conversation.id) {
                continue;
            }
            entries.push(conversation.into_summary());
        }
        self.entries = entries;
    }

    /// Insert at the front; an existing entry with the same id is moved there
    pub fn prepend(&mut self, conversation: Conversation) {
        self.entries.retain(|c| c.id != conversation.id);
        self.entries.insert(0, conversation.into_summary());
    }

    /// Replace the entry with the same id in place. Returns false if absent.
    pub fn replace(&mut self, conversation: Conversation) -> bool {
        match self.entries.iter_mut().find(|c| c.id == conversation.id) {
            Some(slot) => {
                *slot = conversation.into_summary();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &ConversationId) -> Option<Conversation> {
        let index = self.entries.iter().position(|c| &c.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.entries.iter().find(|c| &c.id == id)
    }

    pub fn as_slice(&self) -> &[Conversation] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
