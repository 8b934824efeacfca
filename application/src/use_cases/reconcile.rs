//! Message Reconciliation use case.
//!
//! Owns the [`Transcript`] of the conversation currently open and runs the
//! optimistic send lifecycle against it:
//!
//! 1. Append a [`PendingMessage`](polychat_domain::PendingMessage) so the
//!    user's text is visible before the remote call is issued
//! 2. Call [`SessionGateway::append_message`]
//! 3. On success replace the pending entry with the server's user message
//!    and reply, then refresh the conversation list
//! 4. On failure remove the pending entry, restoring the transcript exactly
//!
//! A second send into a conversation while one is in flight there is
//! rejected with [`DomainError::SendInFlight`]; it is never queued. Sends
//! into different conversations proceed independently, and re-opening a
//! conversation mid-send keeps its pending entry so the reply still lands.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::ports::session_gateway::SessionGateway;
use crate::ports::sync_journal::{NoSyncJournal, SyncEvent, SyncJournal};
use crate::use_cases::session_list::SessionListCache;
use polychat_domain::util::preview;
use polychat_domain::{
    Conversation, ConversationId, DomainError, LocalMessageId, MessageContent, MessagePair,
    PendingMessage, Transcript, ViewEffect,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Result of a [`MessageReconciler::send`] call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was blank after trimming; nothing happened
    Skipped,
    /// The server stored the message and replied
    Delivered(MessagePair),
}

pub struct MessageReconciler {
    gateway: Arc<dyn SessionGateway>,
    sessions: Arc<SessionListCache>,
    journal: Arc<dyn SyncJournal>,
    default_title: Option<String>,
    view: watch::Sender<Option<Transcript>>,
    /// Unsettled send per conversation
    in_flight: StdMutex<HashMap<ConversationId, PendingMessage>>,
    /// Held while a send creates the conversation it goes into
    creating: Mutex<()>,
}

/// Releases a conversation's in-flight slot when the send ends, including
/// when the send future is dropped early
struct InFlightGuard<'a> {
    reconciler: &'a MessageReconciler,
    id: ConversationId,
    local_id: LocalMessageId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.reconciler.release(&self.id, self.local_id);
    }
}

impl MessageReconciler {
    pub fn new(
        gateway: Arc<dyn SessionGateway>,
        sessions: Arc<SessionListCache>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            gateway,
            sessions,
            journal: Arc::new(NoSyncJournal),
            default_title: config.default_title.clone(),
            view: watch::Sender::new(None),
            in_flight: StdMutex::new(HashMap::new()),
            creating: Mutex::new(()),
        }
    }

    pub fn with_journal(mut self, journal: Arc<dyn SyncJournal>) -> Self {
        self.journal = journal;
        self
    }

    /// Watch the open transcript (`None` when nothing is open)
    pub fn subscribe(&self) -> watch::Receiver<Option<Transcript>> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> Option<Transcript> {
        self.view.borrow().clone()
    }

    pub fn open_conversation_id(&self) -> Option<ConversationId> {
        self.view.borrow().as_ref().map(|t| t.id().clone())
    }

    /// Fetch a conversation with its messages and make it the open one.
    ///
    /// On failure the open view is cleared rather than left pointing at a
    /// conversation that could not be loaded.
    pub async fn open(&self, id: &ConversationId) -> Result<(), SyncError> {
        match self.gateway.get_conversation(id).await {
            Ok(conversation) => {
                self.show(conversation);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to open conversation {}: {}", id, e);
                self.close();
                Err(e.into())
            }
        }
    }

    /// Show an already fetched conversation.
    ///
    /// A send still in flight for it is re-attached as the pending entry.
    pub fn show(&self, conversation: Conversation) {
        debug!("Opening conversation {}", conversation.id);
        self.view.send_modify(|view| {
            let mut transcript = Transcript::new(conversation);
            if let Some(pending) = self.pending_for(transcript.id()) {
                debug!("Re-attaching pending {} to {}", pending.local_id, transcript.id());
                let _ = transcript.begin_send(pending);
            }
            *view = Some(transcript);
        });
    }

    pub fn close(&self) {
        self.view.send_if_modified(|view| view.take().is_some());
    }

    /// Apply a list mutation's effect to the open view.
    ///
    /// Returns true if the view changed.
    pub fn apply(&self, effect: &ViewEffect) -> bool {
        match effect {
            ViewEffect::None => false,
            ViewEffect::Navigate(conversation) => {
                self.show(conversation.clone());
                true
            }
            ViewEffect::Refresh(conversation) => self.refresh_metadata(conversation.clone()),
            ViewEffect::Clear(id) => self.view.send_if_modified(|view| {
                if view.as_ref().is_some_and(|t| t.id() == id) {
                    *view = None;
                    true
                } else {
                    false
                }
            }),
        }
    }

    /// Send `text` into the open conversation, creating one first if none
    /// is open.
    ///
    /// Blank input returns [`SendOutcome::Skipped`] without any remote call.
    /// On failure the transcript is restored to its pre-send entries and the
    /// error is returned so the caller can offer the text again.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, SyncError> {
        let Some(content) = MessageContent::try_new(text) else {
            return Ok(SendOutcome::Skipped);
        };

        let (id, creating) = match self.open_conversation_id() {
            Some(id) => (id, None),
            None => {
                let creating = self
                    .creating
                    .try_lock()
                    .map_err(|_| DomainError::SendInFlight)?;
                (self.open_new().await?, Some(creating))
            }
        };

        let pending = PendingMessage::new(id.clone(), content.clone());
        let local_id = pending.local_id;
        let mut begun = Err(SyncError::NoConversationOpen);
        self.view.send_if_modified(|view| match view {
            Some(transcript) if transcript.id() == &id => {
                begun = self
                    .claim(&pending)
                    .and_then(|guard| {
                        transcript.begin_send(pending.clone())?;
                        Ok(guard)
                    })
                    .map_err(SyncError::from);
                begun.is_ok()
            }
            _ => false,
        });
        let _guard = begun?;
        drop(creating);

        debug!("Pending {} in {}: {}", local_id, id, preview(content.as_str(), 60));
        self.journal.record(SyncEvent::new(
            "send_pending",
            json!({
                "conversation_id": id.as_str(),
                "local_id": local_id.to_string(),
                "bytes": content.as_str().len(),
            }),
        ));

        match self.gateway.append_message(&id, &content).await {
            Ok(pair) => {
                let landed = self.view.send_if_modified(|view| {
                    self.release(&id, local_id);
                    match view {
                        Some(transcript) if transcript.id() == &id => {
                            transcript.confirm(local_id, pair.clone()).is_ok()
                        }
                        _ => false,
                    }
                });
                if !landed {
                    debug!("Conversation {} no longer open; reply not shown", id);
                }
                info!("Message delivered to {}", id);
                self.journal.record(SyncEvent::new(
                    "send_settled",
                    json!({
                        "conversation_id": id.as_str(),
                        "local_id": local_id.to_string(),
                        "user_message_id": pair.user.id.as_str(),
                        "assistant_message_id": pair.assistant.id.as_str(),
                    }),
                ));
                self.refresh_after_send(&id).await;
                Ok(SendOutcome::Delivered(pair))
            }
            Err(e) => {
                let reason = e.to_string();
                self.view.send_if_modified(|view| {
                    self.release(&id, local_id);
                    match view {
                        Some(transcript) if transcript.id() == &id => {
                            transcript.roll_back(local_id, reason.clone()).is_ok()
                        }
                        _ => false,
                    }
                });
                warn!("Send to {} failed, rolled back: {}", id, reason);
                self.journal.record(SyncEvent::new(
                    "send_rolled_back",
                    json!({
                        "conversation_id": id.as_str(),
                        "local_id": local_id.to_string(),
                        "reason": reason,
                    }),
                ));
                Err(e.into())
            }
        }
    }

    fn claim(&self, pending: &PendingMessage) -> Result<InFlightGuard<'_>, DomainError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.contains_key(&pending.conversation_id) {
            return Err(DomainError::SendInFlight);
        }
        in_flight.insert(pending.conversation_id.clone(), pending.clone());
        Ok(InFlightGuard {
            reconciler: self,
            id: pending.conversation_id.clone(),
            local_id: pending.local_id,
        })
    }

    /// Settled sends release inside the view update so that `show` never
    /// re-attaches a message that has already been confirmed or rolled back
    fn release(&self, id: &ConversationId, local_id: LocalMessageId) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.get(id).is_some_and(|p| p.local_id == local_id) {
            in_flight.remove(id);
        }
    }

    fn pending_for(&self, id: &ConversationId) -> Option<PendingMessage> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    async fn open_new(&self) -> Result<ConversationId, SyncError> {
        let effect = self
            .sessions
            .create(self.default_title.as_deref(), None)
            .await?;
        let id = effect
            .conversation()
            .map(|c| c.id.clone())
            .ok_or(SyncError::NoConversationOpen)?;
        self.apply(&effect);
        Ok(id)
    }

    /// Re-list so the summary reflects the new message count and
    /// `updated_at`. The send already succeeded, so failures only warn.
    async fn refresh_after_send(&self, id: &ConversationId) {
        if let Err(e) = self.sessions.list().await {
            warn!("Conversation list refresh after send failed: {}", e);
            return;
        }
        if let Some(summary) = self.sessions.snapshot().get(id).cloned() {
            self.refresh_metadata(summary);
        }
    }

    fn refresh_metadata(&self, conversation: Conversation) -> bool {
        self.view.send_if_modified(|view| {
            view.as_mut()
                .is_some_and(|t| t.replace_conversation(conversation))
        })
    }
}
