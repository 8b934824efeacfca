//! Effects a list mutation has on the open-conversation view

use super::entities::{Conversation, ConversationId};

/// What the open view should do after a successful list mutation.
///
/// The list cache produces these; the owner of the open view applies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEffect {
    /// Nothing to do (e.g. the mutation was a validation no-op)
    None,
    /// Open the newly created conversation
    Navigate(Conversation),
    /// Replace the open view's metadata if it shows this conversation
    Refresh(Conversation),
    /// Clear the open view if it shows this conversation
    Clear(ConversationId),
}

impl ViewEffect {
    /// The conversation record carried by the effect, if any
    pub fn conversation(&self) -> Option<&Conversation> {
        match self {
            ViewEffect::Navigate(c) | ViewEffect::Refresh(c) => Some(c),
            ViewEffect::None | ViewEffect::Clear(_) => None,
        }
    }
}
