//! Session List Cache use case.
//!
//! Owns the newest-first conversation summaries shown to the user. Every
//! mutation is gateway-first: the cache only changes after the backend has
//! acknowledged the operation, and always adopts the server's canonical
//! record rather than a locally patched guess.
//!
//! Mutations return a [`ViewEffect`] describing what the open-conversation
//! view should do; the cache itself never touches the open view.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::ports::session_gateway::SessionGateway;
use crate::ports::sync_journal::{NoSyncJournal, SyncEvent, SyncJournal};
use polychat_domain::{
    Conversation, ConversationId, ConversationList, ConversationPatch, Model, NewConversation,
    ViewEffect,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

pub struct SessionListCache {
    gateway: Arc<dyn SessionGateway>,
    journal: Arc<dyn SyncJournal>,
    default_model: Model,
    state: watch::Sender<ConversationList>,
}

impl SessionListCache {
    pub fn new(gateway: Arc<dyn SessionGateway>, config: &SyncConfig) -> Self {
        Self {
            gateway,
            journal: Arc::new(NoSyncJournal),
            default_model: config.default_model.clone(),
            state: watch::Sender::new(ConversationList::new()),
        }
    }

    pub fn with_journal(mut self, journal: Arc<dyn SyncJournal>) -> Self {
        self.journal = journal;
        self
    }

    /// Watch the summary list
    pub fn subscribe(&self) -> watch::Receiver<ConversationList> {
        self.state.subscribe()
    }

    /// Current summaries
    pub fn snapshot(&self) -> ConversationList {
        self.state.borrow().clone()
    }

    /// Fetch all summaries and replace the cache wholesale.
    ///
    /// Returns the number of conversations now cached.
    pub async fn list(&self) -> Result<usize, SyncError> {
        let conversations = self.gateway.list_conversations().await?;
        let mut count = 0;
        self.state.send_modify(|list| {
            list.replace_all(conversations);
            count = list.len();
        });
        debug!("Conversation list refreshed: {} entries", count);
        Ok(count)
    }

    /// Create a conversation and put it at the front of the list.
    ///
    /// A blank `title` lets the server choose its placeholder; a missing
    /// `model` falls back to the configured default.
    pub async fn create(
        &self,
        title: Option<&str>,
        model: Option<Model>,
    ) -> Result<ViewEffect, SyncError> {
        let request = NewConversation::new(
            title,
            model.unwrap_or_else(|| self.default_model.clone()),
        );
        let created = self.gateway.create_conversation(&request).await?.into_summary();

        info!(
            "Created conversation {} ({}, {})",
            created.id, created.title, created.model
        );
        self.journal.record(SyncEvent::new(
            "conversation_created",
            json!({
                "id": created.id.as_str(),
                "title": created.title,
                "model": created.model.as_str(),
            }),
        ));
        self.state.send_modify(|list| list.prepend(created.clone()));
        Ok(ViewEffect::Navigate(created))
    }

    /// Rename a conversation. A blank title is a no-op with no remote call.
    pub async fn rename(&self, id: &ConversationId, title: &str) -> Result<ViewEffect, SyncError> {
        let patch = ConversationPatch::title(title);
        if patch.is_empty() {
            debug!("Ignoring blank rename of {}", id);
            return Ok(ViewEffect::None);
        }
        self.update(id, patch).await
    }

    /// Switch the model that answers in a conversation
    pub async fn update_model(
        &self,
        id: &ConversationId,
        model: Model,
    ) -> Result<ViewEffect, SyncError> {
        self.update(id, ConversationPatch::model(model)).await
    }

    /// Persist a partial update and adopt the server's canonical record
    pub async fn update(
        &self,
        id: &ConversationId,
        patch: ConversationPatch,
    ) -> Result<ViewEffect, SyncError> {
        let patch = patch.normalized();
        if patch.is_empty() {
            return Ok(ViewEffect::None);
        }
        let updated = self
            .gateway
            .update_conversation(id, &patch)
            .await?
            .into_summary();

        info!("Updated conversation {}", updated.id);
        self.journal.record(SyncEvent::new(
            "conversation_updated",
            json!({
                "id": updated.id.as_str(),
                "title": updated.title,
                "model": updated.model.as_str(),
            }),
        ));
        self.adopt(updated.clone());
        Ok(ViewEffect::Refresh(updated))
    }

    /// Delete a conversation and drop it from the list
    pub async fn remove(&self, id: &ConversationId) -> Result<ViewEffect, SyncError> {
        self.gateway.delete_conversation(id).await?;

        info!("Removed conversation {}", id);
        self.journal.record(SyncEvent::new(
            "conversation_removed",
            json!({ "id": id.as_str() }),
        ));
        self.state.send_if_modified(|list| list.remove(id).is_some());
        Ok(ViewEffect::Clear(id.clone()))
    }

    /// Replace the cached entry with `conversation` if it is listed
    pub(crate) fn adopt(&self, conversation: Conversation) -> bool {
        self.state.send_if_modified(|list| list.replace(conversation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::session_gateway::GatewayError;
    use crate::use_cases::testing::{FakeGateway, RecordingJournal};

    fn cache(gateway: &Arc<FakeGateway>) -> SessionListCache {
        SessionListCache::new(gateway.clone(), &SyncConfig::default())
    }

    fn ids(cache: &SessionListCache) -> Vec<String> {
        cache
            .snapshot()
            .iter()
            .map(|c| c.id.to_string())
            .collect()
    }

    // ==================== list ====================

    #[tokio::test]
    async fn test_list_replaces_wholesale() {
        let gateway = Arc::new(FakeGateway::new());
        let first = gateway.seed("first", &[]);
        let cache = cache(&gateway);

        assert_eq!(cache.list().await.unwrap(), 1);
        let second = gateway.seed("second", &[]);
        assert_eq!(cache.list().await.unwrap(), 2);

        assert_eq!(ids(&cache), vec![second.to_string(), first.to_string()]);
    }

    #[tokio::test]
    async fn test_list_failure_keeps_cache() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.seed("kept", &[]);
        let cache = cache(&gateway);
        cache.list().await.unwrap();

        gateway.fail_next("list", GatewayError::Transport("down".to_string()));
        assert!(cache.list().await.is_err());
        assert_eq!(cache.snapshot().len(), 1);
    }

    // ==================== create ====================

    #[tokio::test]
    async fn test_create_prepends_and_navigates() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.seed("older", &[]);
        let cache = cache(&gateway);
        cache.list().await.unwrap();

        let effect = cache.create(Some("  Fresh  "), None).await.unwrap();

        let ViewEffect::Navigate(created) = effect else {
            panic!("expected navigation, got {:?}", effect);
        };
        assert_eq!(created.title, "Fresh");
        assert_eq!(created.model, Model::Gpt4);
        assert_eq!(cache.snapshot().as_slice()[0], created);
        assert_eq!(cache.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_create_blank_title_uses_server_placeholder() {
        let gateway = Arc::new(FakeGateway::new());
        let cache = cache(&gateway);

        let effect = cache
            .create(Some("   "), Some(Model::Claude3Haiku))
            .await
            .unwrap();

        let created = effect.conversation().unwrap();
        assert_eq!(created.title, "New Chat");
        assert_eq!(created.model, Model::Claude3Haiku);
        assert_eq!(gateway.calls(), vec!["create".to_string()]);
    }

    #[tokio::test]
    async fn test_create_failure_leaves_cache_unmodified() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.seed("only", &[]);
        let cache = cache(&gateway);
        cache.list().await.unwrap();
        let before = cache.snapshot();

        gateway.fail_next("create", GatewayError::Validation("bad model".to_string()));
        let err = cache.create(None, None).await.unwrap_err();

        assert_eq!(
            err,
            SyncError::Gateway(GatewayError::Validation("bad model".to_string()))
        );
        assert_eq!(cache.snapshot(), before);
    }

    // ==================== rename / update ====================

    #[tokio::test]
    async fn test_rename_adopts_canonical_record() {
        let gateway = Arc::new(FakeGateway::new());
        let target = gateway.seed("target", &["hi", "hello"]);
        let other = gateway.seed("other", &[]);
        let cache = cache(&gateway);
        cache.list().await.unwrap();
        let other_before = cache.snapshot().get(&other).cloned().unwrap();
        let target_before = cache.snapshot().get(&target).cloned().unwrap();

        let effect = cache.rename(&target, "Renamed").await.unwrap();

        let list = cache.snapshot();
        let renamed = list.get(&target).unwrap();
        assert_eq!(renamed.title, "Renamed");
        assert_eq!(renamed.created_at, target_before.created_at);
        assert!(renamed.updated_at > target_before.updated_at);
        assert_eq!(renamed, &gateway.stored(&target).unwrap());
        assert_eq!(list.get(&other).unwrap(), &other_before);
        // Position is unchanged: rename replaces in place
        assert_eq!(ids(&cache), vec![other.to_string(), target.to_string()]);
        assert_eq!(effect, ViewEffect::Refresh(renamed.clone()));
    }

    #[tokio::test]
    async fn test_blank_rename_is_noop() {
        let gateway = Arc::new(FakeGateway::new());
        let id = gateway.seed("keep", &[]);
        let cache = cache(&gateway);

        assert_eq!(cache.rename(&id, "  \t").await.unwrap(), ViewEffect::None);
        assert!(gateway.calls_to("update").is_empty());
    }

    #[tokio::test]
    async fn test_update_model() {
        let gateway = Arc::new(FakeGateway::new());
        let id = gateway.seed("chat", &[]);
        let cache = cache(&gateway);
        cache.list().await.unwrap();

        cache
            .update_model(&id, Model::Claude35Sonnet)
            .await
            .unwrap();

        assert_eq!(
            cache.snapshot().get(&id).unwrap().model,
            Model::Claude35Sonnet
        );
    }

    #[tokio::test]
    async fn test_update_failure_leaves_cache_unmodified() {
        let gateway = Arc::new(FakeGateway::new());
        let id = gateway.seed("chat", &[]);
        let cache = cache(&gateway);
        cache.list().await.unwrap();
        let before = cache.snapshot();

        gateway.fail_next("update", GatewayError::NotFound(id.to_string()));
        assert!(cache.rename(&id, "New").await.is_err());
        assert_eq!(cache.snapshot(), before);
    }

    // ==================== remove ====================

    #[tokio::test]
    async fn test_remove_filters_and_signals_clear() {
        let gateway = Arc::new(FakeGateway::new());
        let keep = gateway.seed("keep", &[]);
        let drop = gateway.seed("drop", &[]);
        let cache = cache(&gateway);
        cache.list().await.unwrap();

        let effect = cache.remove(&drop).await.unwrap();

        assert_eq!(effect, ViewEffect::Clear(drop.clone()));
        assert_eq!(ids(&cache), vec![keep.to_string()]);
    }

    #[tokio::test]
    async fn test_remove_failure_leaves_cache_unmodified() {
        let gateway = Arc::new(FakeGateway::new());
        let id = gateway.seed("chat", &[]);
        let cache = cache(&gateway);
        cache.list().await.unwrap();

        gateway.fail_next("delete", GatewayError::Timeout);
        assert!(cache.remove(&id).await.is_err());
        assert_eq!(cache.snapshot().len(), 1);
    }

    // ==================== journal ====================

    #[tokio::test]
    async fn test_mutations_are_journaled() {
        let gateway = Arc::new(FakeGateway::new());
        let journal = Arc::new(RecordingJournal::default());
        let cache = cache(&gateway).with_journal(journal.clone());

        let effect = cache.create(None, None).await.unwrap();
        let id = effect.conversation().unwrap().id.clone();
        cache.rename(&id, "Named").await.unwrap();
        cache.remove(&id).await.unwrap();

        assert_eq!(
            journal.events(),
            vec![
                "conversation_created",
                "conversation_updated",
                "conversation_removed"
            ]
        );
    }
}
