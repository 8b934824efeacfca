//! Chat client facade.
//!
//! Wires the [`SessionListCache`], [`MessageReconciler`] and
//! [`SearchDebouncer`] to one gateway and routes the [`ViewEffect`] of
//! every list mutation to the open view, so that renaming or deleting the
//! open conversation keeps the transcript consistent.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::ports::session_gateway::SessionGateway;
use crate::ports::sync_journal::SyncJournal;
use crate::use_cases::reconcile::{MessageReconciler, SendOutcome};
use crate::use_cases::search::SearchDebouncer;
use crate::use_cases::session_list::SessionListCache;
use polychat_domain::{ConversationId, ConversationPatch, Model, ViewEffect};
use std::sync::Arc;

pub struct ChatClient {
    sessions: Arc<SessionListCache>,
    reconciler: Arc<MessageReconciler>,
    search: SearchDebouncer,
}

impl ChatClient {
    pub fn new(
        gateway: Arc<dyn SessionGateway>,
        config: &SyncConfig,
        journal: Arc<dyn SyncJournal>,
    ) -> Self {
        let sessions = Arc::new(
            SessionListCache::new(gateway.clone(), config).with_journal(journal.clone()),
        );
        let reconciler = Arc::new(
            MessageReconciler::new(gateway.clone(), sessions.clone(), config)
                .with_journal(journal.clone()),
        );
        let search = SearchDebouncer::new(gateway, config).with_journal(journal);
        Self {
            sessions,
            reconciler,
            search,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionListCache> {
        &self.sessions
    }

    pub fn reconciler(&self) -> &Arc<MessageReconciler> {
        &self.reconciler
    }

    pub fn search(&self) -> &SearchDebouncer {
        &self.search
    }

    /// Reload the conversation list
    pub async fn refresh(&self) -> Result<usize, SyncError> {
        self.sessions.list().await
    }

    pub async fn open(&self, id: &ConversationId) -> Result<(), SyncError> {
        self.reconciler.open(id).await
    }

    pub fn close(&self) {
        self.reconciler.close();
    }

    /// Create a conversation and open it
    pub async fn new_conversation(
        &self,
        title: Option<&str>,
        model: Option<Model>,
    ) -> Result<ViewEffect, SyncError> {
        let effect = self.sessions.create(title, model).await?;
        self.reconciler.apply(&effect);
        Ok(effect)
    }

    pub async fn rename(&self, id: &ConversationId, title: &str) -> Result<ViewEffect, SyncError> {
        let effect = self.sessions.rename(id, title).await?;
        self.reconciler.apply(&effect);
        Ok(effect)
    }

    pub async fn set_model(
        &self,
        id: &ConversationId,
        model: Model,
    ) -> Result<ViewEffect, SyncError> {
        let effect = self.sessions.update_model(id, model).await?;
        self.reconciler.apply(&effect);
        Ok(effect)
    }

    pub async fn update(
        &self,
        id: &ConversationId,
        patch: ConversationPatch,
    ) -> Result<ViewEffect, SyncError> {
        let effect = self.sessions.update(id, patch).await?;
        self.reconciler.apply(&effect);
        Ok(effect)
    }

    /// Delete a conversation; clears the open view if it was showing it
    pub async fn delete(&self, id: &ConversationId) -> Result<ViewEffect, SyncError> {
        let effect = self.sessions.remove(id).await?;
        self.reconciler.apply(&effect);
        Ok(effect)
    }

    pub async fn send(&self, text: &str) -> Result<SendOutcome, SyncError> {
        self.reconciler.send(text).await
    }

    pub fn on_query_change(&self, text: &str) {
        self.search.on_query_change(text);
    }
}
