use pocketchat_types::{Conversation, ConversationId};

/// One row of the history panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: ConversationId,
    pub title: String,
}

/// Derive the history list, most recently added conversation first
pub fn render(conversations: &[Conversation]) -> Vec<HistoryEntry> {
    conversations
        .iter()
        .rev()
        .map(|c| HistoryEntry {
            id: c.id,
            title: c.title.clone(),
        })
        .collect()
}

/// Parse the identifier carried by a selected history row
pub fn parse_selection(raw: &str) -> Option<ConversationId> {
    raw.trim().parse().ok()
}
