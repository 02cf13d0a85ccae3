use std::collections::HashSet;

use pocketchat_types::{ChatConfig, Conversation, ConversationId, Message, MessageKind};

use crate::error::ModelError;

/// Result of committing the active sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Created(ConversationId),
    Updated(ConversationId),
}

impl CommitOutcome {
    pub fn id(&self) -> ConversationId {
        match self {
            CommitOutcome::Created(id) | CommitOutcome::Updated(id) => *id,
        }
    }
}

/// All saved conversations plus the one being edited.
///
/// The active sequence is a working copy: it only reaches the collection
/// through [`ConversationModel::commit_active`].
#[derive(Debug, Clone)]
pub struct ConversationModel {
    conversations: Vec<Conversation>,
    active: Vec<Message>,
    active_id: Option<ConversationId>,
    title_max_chars: usize,
    title_suffix: String,
}

impl ConversationModel {
    pub fn new(config: &ChatConfig) -> Self {
        Self::with_conversations(config, Vec::new())
    }

    pub fn with_conversations(config: &ChatConfig, conversations: Vec<Conversation>) -> Self {
        Self {
            conversations,
            active: Vec::new(),
            active_id: None,
            title_max_chars: config.title_max_chars,
            title_suffix: config.title_suffix.clone(),
        }
    }

    /// Add a message to the active sequence
    pub fn append_message(&mut self, message: Message) -> Result<(), ModelError> {
        if message.kind == MessageKind::Text && message.content.trim().is_empty() {
            return Err(ModelError::EmptyContent);
        }
        self.active.push(message);
        Ok(())
    }

    /// Flush the active sequence into the collection.
    ///
    /// Updates the conversation the active sequence was loaded from, or creates
    /// a new one whose id is derived from `now_millis`. Returns `None` when the
    /// active sequence is empty.
    pub fn commit_active(&mut self, now_millis: i64) -> Option<CommitOutcome> {
        let first = self.active.first()?;

        if let Some(id) = self.active_id {
            if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
                conversation.messages = self.active.clone();
                return Some(CommitOutcome::Updated(id));
            }
        }

        let id = self.next_id(now_millis);
        let title = pocketchat_types::derive_title(&first.content, self.title_max_chars, &self.title_suffix);
        self.conversations
            .push(Conversation::new(id, title, self.active.clone()));
        self.active_id = Some(id);
        log::debug!("Created conversation {}", id);

        Some(CommitOutcome::Created(id))
    }

    /// Commit the active sequence, then load `id` as the new active sequence.
    ///
    /// Returns false and leaves an empty active sequence with no active
    /// conversation when `id` is unknown.
    pub fn switch_to(&mut self, id: ConversationId, now_millis: i64) -> bool {
        self.commit_active(now_millis);
        self.reset_active();

        match self.conversations.iter().find(|c| c.id == id) {
            Some(conversation) => {
                self.active = conversation.messages.clone();
                self.active_id = Some(id);
                true
            }
            None => {
                log::debug!("Conversation {} not found", id);
                false
            }
        }
    }

    /// Forget the active sequence and the active conversation reference
    pub fn reset_active(&mut self) {
        self.active.clear();
        self.active_id = None;
    }

    /// Empty the collection and the active sequence
    pub fn clear_all(&mut self) {
        self.conversations.clear();
        self.reset_active();
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn active_messages(&self) -> &[Message] {
        &self.active
    }

    pub fn active_id(&self) -> Option<ConversationId> {
        self.active_id
    }

    // Creation timestamp, bumped past every existing id so ids stay unique
    fn next_id(&self, now_millis: i64) -> ConversationId {
        match self.conversations.iter().map(|c| c.id).max() {
            Some(max) if max >= now_millis => {
                max.checked_add(1).unwrap_or_else(|| self.first_free_id(now_millis))
            }
            _ => now_millis,
        }
    }

    // Stored ids already reach i64::MAX; walk forward (wrapping) to the first gap
    fn first_free_id(&self, from: i64) -> ConversationId {
        let taken: HashSet<ConversationId> = self.conversations.iter().map(|c| c.id).collect();
        let mut id = from;
        while taken.contains(&id) {
            id = id.wrapping_add(1);
        }
        id
    }
}
