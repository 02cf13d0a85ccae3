//! Browser tests, run with `wasm-pack test --headless --firefox`

use wasm_bindgen_test::*;

use pocketchat_chat::{ChatConfig, Clock, ConversationStore, KeyValueStore, Message, Theme};
use pocketchat_types::Conversation;
use pocketchat_wasm::{start_chat_with_config, BrowserClock, LocalStore};

wasm_bindgen_test_configure!(run_in_browser);

fn fresh_store() -> LocalStore {
    let store = LocalStore::from_window().unwrap();
    store.remove("chat-conversations").unwrap();
    store.remove("theme").unwrap();
    store
}

#[wasm_bindgen_test]
fn local_store_round_trip() {
    let store = fresh_store();
    assert_eq!(store.get("theme").unwrap(), None);
    store.set("theme", "light").unwrap();
    assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
    store.remove("theme").unwrap();
    assert_eq!(store.get("theme").unwrap(), None);
}

#[wasm_bindgen_test]
fn conversations_persist_in_local_storage() {
    let store = fresh_store();
    let conversations = ConversationStore::new(store.clone(), &ChatConfig::default());
    let saved = vec![Conversation::new(
        1,
        "hi...".to_string(),
        vec![Message::user_text("hi")],
    )];
    conversations.save(&saved).unwrap();
    conversations.save_theme(Theme::Light).unwrap();

    let reread = ConversationStore::new(store, &ChatConfig::default());
    assert_eq!(reread.load(), saved);
    assert_eq!(reread.load_theme(), Theme::Light);
}

#[wasm_bindgen_test]
fn browser_clock_is_wall_time() {
    assert!(BrowserClock.now_millis() > 1_577_836_800_000);
}

#[wasm_bindgen_test]
fn start_rejects_malformed_config() {
    assert!(start_chat_with_config("{ not json").is_err());
}
