use pocketchat_types::{ChatConfig, Conversation, Theme};

use crate::error::StoreResult;
use crate::store::KeyValueStore;

/// Persistence manager for the conversation collection and the theme preference.
///
/// The whole collection is the unit of durability: every save overwrites the
/// single record with a full serialization.
pub struct ConversationStore<S> {
    store: S,
    conversations_key: String,
    theme_key: String,
}

impl<S: KeyValueStore> ConversationStore<S> {
    pub fn new(store: S, config: &ChatConfig) -> Self {
        Self {
            store,
            conversations_key: config.conversations_key.clone(),
            theme_key: config.theme_key.clone(),
        }
    }

    /// Read the stored collection.
    /// A missing, unreadable or malformed record reads as an empty collection.
    pub fn load(&self) -> Vec<Conversation> {
        let raw = match self.store.get(&self.conversations_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read '{}': {}", self.conversations_key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Conversation>>(&raw) {
            Ok(conversations) => {
                log::debug!("Loaded {} conversations", conversations.len());
                conversations
            }
            Err(e) => {
                log::warn!("Ignoring malformed '{}' record: {}", self.conversations_key, e);
                Vec::new()
            }
        }
    }

    /// Overwrite the stored record with the full collection
    pub fn save(&self, conversations: &[Conversation]) -> StoreResult<()> {
        let json = serde_json::to_string(conversations)?;
        self.store.set(&self.conversations_key, &json)?;
        log::debug!("Saved {} conversations", conversations.len());
        Ok(())
    }

    /// Delete the stored record entirely
    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove(&self.conversations_key)
    }

    pub fn load_theme(&self) -> Theme {
        match self.store.get(&self.theme_key) {
            Ok(Some(value)) => Theme::from_stored(&value),
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("Failed to read '{}': {}", self.theme_key, e);
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> StoreResult<()> {
        self.store.set(&self.theme_key, theme.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pocketchat_types::{Message, DEFAULT_CONVERSATIONS_KEY};
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Conversation> {
        vec![
            Conversation::new(
                1000,
                "hi...".to_string(),
                vec![
                    Message::user_text("hi"),
                    Message::assistant_text("Hello there!"),
                ],
            ),
            Conversation::new(
                2000,
                "data:image/png;base6...".to_string(),
                vec![Message::user_image("data:image/png;base64,AAAA")],
            ),
        ]
    }

    #[test]
    fn test_load_missing_record_is_empty() {
        let store = ConversationStore::new(MemoryStore::new(), &ChatConfig::default());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let store = ConversationStore::new(MemoryStore::new(), &ChatConfig::default());
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn test_malformed_record_reads_as_empty() {
        for raw in ["not json", "{\"id\": 1}", "[{\"id\": \"abc\"}]", ""] {
            let kv = MemoryStore::with_entry(DEFAULT_CONVERSATIONS_KEY, raw);
            let store = ConversationStore::new(kv, &ChatConfig::default());
            assert!(store.load().is_empty(), "expected empty for {:?}", raw);
        }
    }

    #[test]
    fn test_reads_records_written_by_the_browser_widget() {
        let raw = r#"[{"id":1718000000000,"title":"hello...","messages":[
            {"content":"hello","sender":"user","type":"text"},
            {"content":"Hello there!","sender":"assistant","type":"text"}]}]"#;
        let kv = MemoryStore::with_entry(DEFAULT_CONVERSATIONS_KEY, raw);
        let store = ConversationStore::new(kv, &ChatConfig::default());

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 1_718_000_000_000);
        assert_eq!(loaded[0].messages[1], Message::assistant_text("Hello there!"));
    }

    #[test]
    fn test_clear_removes_record() {
        let kv = MemoryStore::new();
        let store = ConversationStore::new(kv.clone(), &ChatConfig::default());
        store.save(&sample()).unwrap();
        store.clear().unwrap();
        assert_eq!(kv.get(DEFAULT_CONVERSATIONS_KEY).unwrap(), None);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_theme_round_trip_and_default() {
        let kv = MemoryStore::new();
        let store = ConversationStore::new(kv.clone(), &ChatConfig::default());
        assert_eq!(store.load_theme(), Theme::Dark);
        store.save_theme(Theme::Light).unwrap();
        assert_eq!(store.load_theme(), Theme::Light);
        assert_eq!(kv.get("theme").unwrap().as_deref(), Some("light"));
    }
}
