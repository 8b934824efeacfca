//! Open-conversation transcript with optimistic send state.
//!
//! A [`Transcript`] is the working copy of the one conversation currently
//! open. Entries are either server-confirmed [`Message`]s or a single
//! [`PendingMessage`]; the distinction is carried by [`TranscriptEntry`]
//! rather than by any identifier convention.
//!
//! Send lifecycle, per [`SendStatus`]:
//!
//! ```text
//! Idle ──begin_send──▶ Pending ──confirm──▶ Settled
//!                         │
//!                         └────roll_back──▶ RolledBack
//! ```

use super::entities::{Conversation, ConversationId, Message, MessagePair, Role};
use crate::core::content::MessageContent;
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(1);

/// Locally generated identifier of a pending message.
///
/// Unique within the process; never compared against server ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalMessageId(u64);

impl LocalMessageId {
    /// Allocate the next process-unique local id
    pub fn next() -> Self {
        Self(NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for LocalMessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

/// A user turn shown optimistically while the backend round trip is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub local_id: LocalMessageId,
    pub conversation_id: ConversationId,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
}

impl PendingMessage {
    /// Synthesize a pending message stamped with the local clock
    pub fn new(conversation_id: ConversationId, content: MessageContent) -> Self {
        Self {
            local_id: LocalMessageId::next(),
            conversation_id,
            content,
            timestamp: Utc::now(),
        }
    }
}

/// One row of the open transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Confirmed(Message),
    Pending(PendingMessage),
}

impl TranscriptEntry {
    pub fn content(&self) -> &str {
        match self {
            TranscriptEntry::Confirmed(m) => &m.content,
            TranscriptEntry::Pending(p) => p.content.as_str(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            TranscriptEntry::Confirmed(m) => m.role,
            TranscriptEntry::Pending(_) => Role::User,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TranscriptEntry::Confirmed(m) => m.timestamp,
            TranscriptEntry::Pending(p) => p.timestamp,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TranscriptEntry::Pending(_))
    }
}

/// Status of the most recent send in this transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendStatus {
    Idle,
    Pending { local_id: LocalMessageId },
    Settled,
    RolledBack { reason: String },
}

impl SendStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SendStatus::Pending { .. })
    }
}

/// Working copy of the open conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    conversation: Conversation,
    entries: Vec<TranscriptEntry>,
    status: SendStatus,
}

impl Transcript {
    /// Open a transcript from a conversation record, taking its embedded messages
    pub fn new(conversation: Conversation) -> Self {
        let (conversation, messages) = conversation.split_messages();
        Self {
            conversation,
            entries: messages.into_iter().map(TranscriptEntry::Confirmed).collect(),
            status: SendStatus::Idle,
        }
    }

    /// Conversation metadata (summary, no messages)
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn id(&self) -> &ConversationId {
        &self.conversation.id
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Confirmed messages only, in display order
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Confirmed(m) => Some(m),
            TranscriptEntry::Pending(_) => None,
        })
    }

    pub fn pending(&self) -> Option<&PendingMessage> {
        self.entries.iter().find_map(|e| match e {
            TranscriptEntry::Pending(p) => Some(p),
            TranscriptEntry::Confirmed(_) => None,
        })
    }

    pub fn status(&self) -> &SendStatus {
        &self.status
    }

    /// Optimistically append a pending message.
    ///
    /// Rejects a second send while one is pending, and a pending message
    /// addressed to a different conversation.
    pub fn begin_send(&mut self, pending: PendingMessage) -> Result<LocalMessageId, DomainError> {
        if pending.conversation_id != self.conversation.id {
            return Err(DomainError::ConversationNotOpen(
                pending.conversation_id.to_string(),
            ));
        }
        if self.status.is_pending() || self.pending().is_some() {
            return Err(DomainError::SendInFlight);
        }
        let local_id = pending.local_id;
        self.entries.push(TranscriptEntry::Pending(pending));
        self.status = SendStatus::Pending { local_id };
        Ok(local_id)
    }

    /// Replace the pending entry with the server-confirmed pair.
    ///
    /// Messages already present (a re-fetch that raced the reply) are not
    /// appended twice.
    pub fn confirm(
        &mut self,
        local_id: LocalMessageId,
        pair: MessagePair,
    ) -> Result<(), DomainError> {
        self.take_pending(local_id)?;
        for message in [pair.user, pair.assistant] {
            if !self.messages().any(|m| m.id == message.id) {
                self.entries.push(TranscriptEntry::Confirmed(message));
            }
        }
        self.status = SendStatus::Settled;
        Ok(())
    }

    /// Remove the pending entry, restoring the pre-send entries exactly.
    ///
    /// Returns the removed message so the caller can offer its text again.
    pub fn roll_back(
        &mut self,
        local_id: LocalMessageId,
        reason: impl Into<String>,
    ) -> Result<PendingMessage, DomainError> {
        let pending = self.take_pending(local_id)?;
        self.status = SendStatus::RolledBack {
            reason: reason.into(),
        };
        Ok(pending)
    }

    /// Replace the conversation metadata with a canonical record of the same id.
    ///
    /// Embedded messages on `conversation` are ignored; entries are owned here.
    pub fn replace_conversation(&mut self, conversation: Conversation) -> bool {
        if conversation.id != self.conversation.id {
            return false;
        }
        let summary = conversation.into_summary();
        if summary == self.conversation {
            return false;
        }
        self.conversation = summary;
        true
    }

    fn take_pending(&mut self, local_id: LocalMessageId) -> Result<PendingMessage, DomainError> {
        let index = self
            .entries
            .iter()
            .position(|e| matches!(e, TranscriptEntry::Pending(p) if p.local_id == local_id))
            .ok_or_else(|| DomainError::PendingNotFound(local_id.to_string()))?;
        match self.entries.remove(index) {
            TranscriptEntry::Pending(p) => Ok(p),
            TranscriptEntry::Confirmed(_) => {
                Err(DomainError::PendingNotFound(local_id.to_string()))
            }
        }
    }
}
