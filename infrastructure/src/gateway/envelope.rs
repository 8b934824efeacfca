//! Response bodies of the chat backend.
//!
//! The backend wraps most payloads (`{"chats": [...]}`, `{"chat": {...}}`)
//! while some deployments return them bare; both shapes are accepted.

use polychat_domain::{Conversation, Message, MessagePair};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum ChatsBody {
    Wrapped { chats: Vec<Conversation> },
    Bare(Vec<Conversation>),
}

impl ChatsBody {
    pub(super) fn into_summaries(self) -> Vec<Conversation> {
        let chats = match self {
            ChatsBody::Wrapped { chats } => chats,
            ChatsBody::Bare(chats) => chats,
        };
        chats.into_iter().map(Conversation::into_summary).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum ChatBody {
    WithMessages {
        chat: Conversation,
        messages: Vec<Message>,
    },
    Wrapped {
        chat: Conversation,
    },
    Bare(Conversation),
}

impl ChatBody {
    pub(super) fn into_conversation(self) -> Conversation {
        match self {
            ChatBody::WithMessages { mut chat, messages } => {
                chat.messages = Some(messages);
                chat
            }
            ChatBody::Wrapped { chat } | ChatBody::Bare(chat) => chat,
        }
    }
}

/// Reply to an append-message call. Field names fix which message is
/// which, independent of their order in the body.
#[derive(Deserialize)]
pub(super) struct AppendBody {
    user_message: Message,
    ai_message: Message,
}

impl From<AppendBody> for MessagePair {
    fn from(body: AppendBody) -> Self {
        MessagePair {
            user: body.user_message,
            assistant: body.ai_message,
        }
    }
}

#[derive(Deserialize)]
pub(super) struct ErrorBody {
    pub(super) error: String,
}
