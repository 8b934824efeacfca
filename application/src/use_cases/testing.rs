//! In-memory gateway shared by the use case tests.

use crate::ports::session_gateway::{GatewayError, SessionGateway};
use crate::ports::sync_journal::{SyncEvent, SyncJournal};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use polychat_domain::{
    Conversation, ConversationId, ConversationPatch, Message, MessageContent, MessageId,
    MessagePair, Model, NewConversation, Role,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

struct Store {
    conversations: Vec<Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
    next_id: u64,
    clock: DateTime<Utc>,
}

impl Store {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += ChronoDuration::seconds(1);
        self.clock
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_mut(&mut self, id: &ConversationId) -> Result<&mut Conversation, GatewayError> {
        self.conversations
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }
}

/// Behaves like the backend: assigns ids, bumps `updated_at`, orders the
/// list by recency. Failures and in-flight holds are scripted per call.
pub(crate) struct FakeGateway {
    store: Mutex<Store>,
    failures: Mutex<HashMap<&'static str, VecDeque<GatewayError>>>,
    append_gate: Mutex<Option<Arc<Notify>>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self {
            store: Mutex::new(Store {
                conversations: Vec::new(),
                messages: HashMap::new(),
                next_id: 0,
                clock: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            }),
            failures: Mutex::new(HashMap::new()),
            append_gate: Mutex::new(None),
            search_delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Seed a conversation with alternating user/assistant messages
    pub(crate) fn seed(&self, title: &str, turns: &[&str]) -> ConversationId {
        let mut store = self.store.lock().unwrap();
        let id = ConversationId::new(store.next_id().to_string());
        let created = store.tick();
        let mut messages = Vec::new();
        for (i, text) in turns.iter().enumerate() {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            let message_id = store.next_id();
            let timestamp = store.tick();
            messages.push(Message {
                id: MessageId::new(format!("m{}", message_id)),
                content: text.to_string(),
                role,
                timestamp,
                conversation_id: id.clone(),
            });
        }
        let conversation = Conversation {
            id: id.clone(),
            title: title.to_string(),
            model: Model::Gpt4,
            created_at: created,
            updated_at: store.clock,
            message_count: messages.len() as u32,
            messages: None,
        };
        store.conversations.insert(0, conversation);
        store.messages.insert(id.clone(), messages);
        id
    }

    /// Fail the next call of `op` with `error`
    pub(crate) fn fail_next(&self, op: &'static str, error: GatewayError) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Hold append calls until the returned gate is notified
    pub(crate) fn hold_appends(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.append_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Delay the search for `query` by `delay`
    pub(crate) fn delay_search(&self, query: &str, delay: Duration) {
        self.search_delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, op: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .collect()
    }

    pub(crate) fn stored(&self, id: &ConversationId) -> Option<Conversation> {
        let store = self.store.lock().unwrap();
        store.conversations.iter().find(|c| &c.id == id).cloned()
    }

    fn enter(&self, op: &'static str, arg: &str) -> Result<(), GatewayError> {
        let call = if arg.is_empty() {
            op.to_string()
        } else {
            format!("{} {}", op, arg)
        };
        self.calls.lock().unwrap().push(call);
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionGateway for FakeGateway {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, GatewayError> {
        self.enter("list", "")?;
        let store = self.store.lock().unwrap();
        let mut conversations = store.conversations.clone();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn create_conversation(
        &self,
        request: &NewConversation,
    ) -> Result<Conversation, GatewayError> {
        self.enter("create", request.title.as_deref().unwrap_or(""))?;
        let mut store = self.store.lock().unwrap();
        let id = ConversationId::new(store.next_id().to_string());
        let now = store.tick();
        let conversation = Conversation {
            id: id.clone(),
            title: request
                .title
                .clone()
                .unwrap_or_else(|| "New Chat".to_string()),
            model: request.model.clone(),
            created_at: now,
            updated_at: now,
            message_count: 0,
            messages: None,
        };
        store.conversations.insert(0, conversation.clone());
        store.messages.insert(id, Vec::new());
        Ok(conversation)
    }

    async fn get_conversation(&self, id: &ConversationId) -> Result<Conversation, GatewayError> {
        self.enter("get", id.as_str())?;
        let mut store = self.store.lock().unwrap();
        let mut conversation = store.find_mut(id)?.clone();
        conversation.messages = Some(store.messages.get(id).cloned().unwrap_or_default());
        Ok(conversation)
    }

    async fn update_conversation(
        &self,
        id: &ConversationId,
        patch: &ConversationPatch,
    ) -> Result<Conversation, GatewayError> {
        self.enter("update", id.as_str())?;
        let mut store = self.store.lock().unwrap();
        let now = store.tick();
        let conversation = store.find_mut(id)?;
        if let Some(title) = &patch.title {
            conversation.title = title.clone();
        }
        if let Some(model) = &patch.model {
            conversation.model = model.clone();
        }
        conversation.updated_at = now;
        Ok(conversation.clone())
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), GatewayError> {
        self.enter("delete", id.as_str())?;
        let mut store = self.store.lock().unwrap();
        let before = store.conversations.len();
        store.conversations.retain(|c| &c.id != id);
        if store.conversations.len() == before {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        store.messages.remove(id);
        Ok(())
    }

    async fn search_conversations(&self, query: &str) -> Result<Vec<Conversation>, GatewayError> {
        let delay = self.search_delays.lock().unwrap().get(query).copied();
        self.enter("search", query)?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let needle = query.to_lowercase();
        let store = self.store.lock().unwrap();
        Ok(store
            .conversations
            .iter()
            .filter(|c| c.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn append_message(
        &self,
        id: &ConversationId,
        content: &MessageContent,
    ) -> Result<MessagePair, GatewayError> {
        self.enter("append", content.as_str())?;
        let gate = self.append_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self
            .failures
            .lock()
            .unwrap()
            .get_mut("append_reply")
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }

        let mut store = self.store.lock().unwrap();
        let user_id = store.next_id();
        let user_at = store.tick();
        let reply_id = store.next_id();
        let reply_at = store.tick();
        let user = Message {
            id: MessageId::new(format!("m{}", user_id)),
            content: content.as_str().to_string(),
            role: Role::User,
            timestamp: user_at,
            conversation_id: id.clone(),
        };
        let assistant = Message {
            id: MessageId::new(format!("m{}", reply_id)),
            content: format!("echo: {}", content),
            role: Role::Assistant,
            timestamp: reply_at,
            conversation_id: id.clone(),
        };
        let conversation = store.find_mut(id)?;
        conversation.message_count += 2;
        conversation.updated_at = reply_at;
        let messages = store.messages.entry(id.clone()).or_default();
        messages.push(user.clone());
        messages.push(assistant.clone());
        Ok(MessagePair { user, assistant })
    }
}

/// Journal that keeps event types in memory
#[derive(Default)]
pub(crate) struct RecordingJournal {
    events: Mutex<Vec<String>>,
}

impl RecordingJournal {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl SyncJournal for RecordingJournal {
    fn record(&self, event: SyncEvent) {
        self.events
            .lock()
            .unwrap()
            .push(event.event_type.to_string());
    }
}
