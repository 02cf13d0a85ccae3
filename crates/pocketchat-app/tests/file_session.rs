use std::fs;

use pocketchat::{FileStore, TerminalView};
use pocketchat_chat::reply::{FILE_REPLY, GREETING_REPLY};
use pocketchat_chat::{ChatConfig, ManualClock, Message, SessionController, Theme};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn open_session(
    dir: &TempDir,
) -> SessionController<FileStore, TerminalView<Vec<u8>>, ManualClock> {
    SessionController::new(
        ChatConfig::default(),
        FileStore::open(dir.path()).unwrap(),
        TerminalView::new(Vec::new()),
        ManualClock::starting_at(1_700_000_000_000),
    )
}

#[test]
fn conversations_survive_restart() {
    let dir = TempDir::new().unwrap();

    let mut chat = open_session(&dir);
    let pending = chat.send_text("hi").unwrap();
    chat.complete_reply(pending.ticket).unwrap();
    chat.toggle_theme();
    drop(chat);

    let restarted = open_session(&dir);
    assert_eq!(restarted.theme(), Theme::Light);
    assert_eq!(restarted.view().theme(), Theme::Light);
    assert_eq!(restarted.view().history().len(), 1);

    let conversation = &restarted.conversations()[0];
    assert_eq!(conversation.title, "hi...");
    assert_eq!(
        conversation.messages,
        vec![Message::user_text("hi"), Message::assistant_text(GREETING_REPLY)]
    );
}

#[test]
fn storage_file_uses_browser_record_layout() {
    let dir = TempDir::new().unwrap();
    let mut chat = open_session(&dir);
    let pending = chat.send_file("notes.txt").unwrap();
    chat.complete_reply(pending.ticket).unwrap();

    let raw = fs::read_to_string(dir.path().join("storage.json")).unwrap();
    let map: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record: serde_json::Value =
        serde_json::from_str(map["chat-conversations"].as_str().unwrap()).unwrap();

    assert_eq!(record[0]["id"], 1_700_000_000_000_i64);
    assert_eq!(record[0]["title"], "File uploaded: notes...");
    assert_eq!(record[0]["messages"][0]["type"], "text");
    assert_eq!(record[0]["messages"][1]["content"], FILE_REPLY);
}

#[test]
fn confirmed_clear_removes_record_from_file() {
    let dir = TempDir::new().unwrap();
    let mut chat = open_session(&dir);
    let pending = chat.send_text("hello").unwrap();
    chat.complete_reply(pending.ticket).unwrap();

    let request = chat.request_clear();
    chat.confirm_clear(request.token).unwrap();
    drop(chat);

    let restarted = open_session(&dir);
    assert!(restarted.conversations().is_empty());
    let raw = fs::read_to_string(dir.path().join("storage.json")).unwrap();
    assert!(!raw.contains("chat-conversations"));
}
