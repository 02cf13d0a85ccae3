use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use pocketchat_types::ChatConfig;

mod chat_ui;
mod dom;
mod storage;
mod utils;

pub use storage::{BrowserClock, LocalStore};

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("PocketChat WASM initialized");
}

/// Wire the chat page with the default configuration
#[wasm_bindgen]
pub fn start_chat() -> Result<(), JsValue> {
    chat_ui::ChatApp::new(ChatConfig::default())?.start()
}

/// Wire the chat page with a JSON `ChatConfig`; missing fields take their defaults
#[wasm_bindgen]
pub fn start_chat_with_config(config_json: &str) -> Result<(), JsValue> {
    let config = utils::parse_config(config_json)?;
    log::info!("Starting chat with reply delay {}ms", config.reply_delay_ms);
    chat_ui::ChatApp::new(config)?.start()
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
