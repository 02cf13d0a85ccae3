use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, FileReader, HtmlButtonElement, HtmlElement, HtmlImageElement,
    HtmlInputElement, KeyboardEvent, Node,
};

use pocketchat_chat::{
    parse_selection, ChatConfig, ChatView, HistoryEntry, InputKind, Message, PendingReply,
    SessionController, Theme,
};

use crate::dom;
use crate::storage::{BrowserClock, LocalStore};
use crate::utils;

const TYPING_INDICATOR_HTML: &str = r#"<span class="typing-indicator"></span><span class="typing-indicator"></span><span class="typing-indicator"></span>"#;

type Controller = SessionController<LocalStore, DomView, BrowserClock>;

// ============================================================================
// DOM rendering surface
// ============================================================================

/// Renders controller output into the chat page
pub struct DomView {
    document: Document,
    chatbox: Element,
    input: HtmlInputElement,
    send_button: HtmlButtonElement,
    upload_toggle: HtmlButtonElement,
    history_list: Element,
    theme_toggle: Element,
    status_indicator: Option<HtmlElement>,
}

impl DomView {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        let status_indicator = document
            .query_selector(".status-indicator")?
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        Ok(Self {
            document: document.clone(),
            chatbox: dom::get_element_by_id(document, "chatbox")?,
            input: dom::get_input_by_id(document, "message-input")?,
            send_button: dom::get_button_by_id(document, "send-button")?,
            upload_toggle: dom::get_button_by_id(document, "upload-toggle")?,
            history_list: dom::get_element_by_id(document, "history-list")?,
            theme_toggle: dom::get_element_by_id(document, "theme-toggle")?,
            status_indicator,
        })
    }

    fn render_message(&self, message: &Message) -> Result<(), JsValue> {
        let element = dom::create_element_with_class(
            &self.document,
            "div",
            &utils::message_class(message.sender.as_str()),
        )?;

        if message.is_image() {
            let img = self
                .document
                .create_element("img")?
                .dyn_into::<HtmlImageElement>()
                .map_err(|_| JsValue::from_str("Failed to create image element"))?;
            img.set_src(&message.content);
            img.set_class_name("chat-image");
            element.append_child(&img)?;
        } else {
            // Plain text only; content is never interpreted as markup
            element.set_text_content(Some(&message.content));
        }

        // Keep the typing indicator below the newest message
        let typing = self.chatbox.query_selector(".typing")?;
        self.chatbox.insert_before(&element, typing.as_deref())?;
        dom::scroll_to_bottom(&self.chatbox);
        Ok(())
    }

    fn render_history_entries(&self, entries: &[HistoryEntry]) -> Result<(), JsValue> {
        dom::clear_element(&self.history_list);
        for entry in entries {
            let item = dom::create_element_with_class(&self.document, "li", "history-item")?;
            item.set_text_content(Some(&entry.title));
            item.set_attribute("data-chat-id", &entry.id.to_string())?;
            self.history_list.append_child(&item)?;
        }
        Ok(())
    }

    fn show_typing_indicator(&self) -> Result<(), JsValue> {
        let typing = dom::create_element_with_class(&self.document, "div", "message assistant typing")?;
        typing.set_inner_html(TYPING_INDICATOR_HTML);
        self.chatbox.append_child(&typing)?;
        dom::scroll_to_bottom(&self.chatbox);
        Ok(())
    }

    fn hide_typing_indicator(&self) -> Result<(), JsValue> {
        if let Some(typing) = self.chatbox.query_selector(".typing")? {
            typing.remove();
        }
        Ok(())
    }

    fn update_busy(&self, busy: bool) -> Result<(), JsValue> {
        self.input.set_disabled(busy);
        self.send_button.set_disabled(busy);
        self.upload_toggle.set_disabled(busy);

        if let Some(indicator) = &self.status_indicator {
            let state = if busy { "running" } else { "paused" };
            indicator.style().set_property("animation-play-state", state)?;
        }

        if busy {
            self.show_typing_indicator()
        } else {
            self.hide_typing_indicator()?;
            self.input.focus()
        }
    }

    fn update_theme(&self, theme: Theme) -> Result<(), JsValue> {
        let light = theme == Theme::Light;
        if let Some(body) = self.document.body() {
            body.class_list().toggle_with_force("light-mode", light)?;
        }
        self.theme_toggle
            .set_text_content(Some(if light { "☀️" } else { "🌙" }));
        Ok(())
    }
}

impl ChatView for DomView {
    fn append_message(&mut self, message: &Message) {
        if let Err(e) = self.render_message(message) {
            log::error!("Failed to render message: {:?}", e);
        }
    }

    fn clear_thread(&mut self) {
        dom::clear_element(&self.chatbox);
    }

    fn render_history(&mut self, entries: &[HistoryEntry]) {
        if let Err(e) = self.render_history_entries(entries) {
            log::error!("Failed to render history: {:?}", e);
        }
    }

    fn set_busy(&mut self, busy: bool) {
        if let Err(e) = self.update_busy(busy) {
            log::error!("Failed to update input state: {:?}", e);
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        if let Err(e) = self.update_theme(theme) {
            log::error!("Failed to apply theme: {:?}", e);
        }
    }
}

// ============================================================================
// Event wiring
// ============================================================================

pub struct ChatApp {
    document: Document,
    controller: Rc<RefCell<Controller>>,
}

impl ChatApp {
    pub fn new(config: ChatConfig) -> Result<Self, JsValue> {
        let document = crate::document()?;
        let store = LocalStore::from_window().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let view = DomView::new(&document)?;
        let controller = SessionController::new(config, store, view, BrowserClock);

        Ok(Self {
            document,
            controller: Rc::new(RefCell::new(controller)),
        })
    }

    pub fn start(self) -> Result<(), JsValue> {
        self.setup_message_input()?;
        self.setup_new_chat()?;
        self.setup_clear_history()?;
        self.setup_history_list()?;
        self.setup_theme_toggle()?;
        self.setup_upload_menu()?;
        self.setup_image_upload()?;
        self.setup_file_upload()?;

        log::info!(
            "Chat ready with {} saved conversations",
            self.controller.borrow().conversations().len()
        );
        Ok(())
    }

    fn setup_message_input(&self) -> Result<(), JsValue> {
        let input = dom::get_input_by_id(&self.document, "message-input")?;
        let send_btn = dom::get_element_by_id(&self.document, "send-button")?;

        let controller = self.controller.clone();
        let input_clone = input.clone();
        dom::add_click_listener(&send_btn, move || {
            submit_text(&controller, &input_clone);
        })?;

        let controller = self.controller.clone();
        let input_clone = input.clone();
        dom::add_event_listener(&input, "keydown", move |event: KeyboardEvent| {
            if event.key() == "Enter" && !event.shift_key() && !input_clone.disabled() {
                event.prevent_default();
                submit_text(&controller, &input_clone);
            }
        })?;

        Ok(())
    }

    fn setup_new_chat(&self) -> Result<(), JsValue> {
        let button = dom::get_element_by_id(&self.document, "new-chat-button")?;
        let controller = self.controller.clone();
        dom::add_click_listener(&button, move || {
            controller.borrow_mut().start_new_conversation();
        })
    }

    fn setup_clear_history(&self) -> Result<(), JsValue> {
        let button = dom::get_element_by_id(&self.document, "clear-history-button")?;
        let controller = self.controller.clone();
        dom::add_click_listener(&button, move || {
            let request = controller.borrow_mut().request_clear();

            // The borrow is released while the modal dialog is up
            let confirmed = crate::window()
                .and_then(|w| w.confirm_with_message(request.prompt))
                .unwrap_or(false);

            let result = if confirmed {
                controller.borrow_mut().confirm_clear(request.token)
            } else {
                controller.borrow_mut().decline_clear(request.token)
            };
            if let Err(e) = result {
                log::warn!("Clear request dropped: {}", e);
            }
        })
    }

    fn setup_history_list(&self) -> Result<(), JsValue> {
        let list = dom::get_element_by_id(&self.document, "history-list")?;
        let controller = self.controller.clone();
        dom::add_event_listener(&list, "click", move |event: Event| {
            let Some(item) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(".history-item").ok().flatten())
            else {
                return;
            };

            let raw = item.get_attribute("data-chat-id").unwrap_or_default();
            match parse_selection(&raw) {
                Some(id) => {
                    if !controller.borrow_mut().select_conversation(id) {
                        log::warn!("History entry {} has no saved conversation", id);
                    }
                }
                None => log::warn!("Ignoring history entry with id '{}'", raw),
            }
        })
    }

    fn setup_theme_toggle(&self) -> Result<(), JsValue> {
        let toggle = dom::get_element_by_id(&self.document, "theme-toggle")?;
        let controller = self.controller.clone();
        dom::add_click_listener(&toggle, move || {
            let theme = controller.borrow_mut().toggle_theme();
            log::debug!("Theme switched to {}", theme.as_str());
        })
    }

    fn setup_upload_menu(&self) -> Result<(), JsValue> {
        let toggle = dom::get_element_by_id(&self.document, "upload-toggle")?;
        let dropdown = dom::get_element_by_id(&self.document, "upload-dropdown")?;

        let dropdown_clone = dropdown.clone();
        dom::add_click_listener(&toggle, move || {
            let _ = dropdown_clone.class_list().toggle("show");
        })?;

        // Clicking anywhere else closes the menu
        dom::add_event_listener(&self.document, "click", move |event: Event| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            let inside = toggle.contains(target.as_ref()) || dropdown.contains(target.as_ref());
            if !inside {
                let _ = dropdown.class_list().remove_1("show");
            }
        })
    }

    fn setup_image_upload(&self) -> Result<(), JsValue> {
        let picker = dom::get_input_by_id(&self.document, "image-upload")?;
        let dropdown = dom::get_element_by_id(&self.document, "upload-dropdown")?;
        let controller = self.controller.clone();

        let picker_clone = picker.clone();
        dom::add_event_listener(&picker, "change", move |_: Event| {
            let Some(file) = picker_clone.files().and_then(|files| files.get(0)) else {
                return;
            };
            if let Err(e) = read_image(&controller, &file) {
                log::error!("Failed to read image {}: {:?}", file.name(), e);
            }
            picker_clone.set_value("");
            let _ = dropdown.class_list().remove_1("show");
        })
    }

    fn setup_file_upload(&self) -> Result<(), JsValue> {
        let picker = dom::get_input_by_id(&self.document, "file-upload")?;
        let dropdown = dom::get_element_by_id(&self.document, "upload-dropdown")?;
        let controller = self.controller.clone();

        let picker_clone = picker.clone();
        dom::add_event_listener(&picker, "change", move |_: Event| {
            let Some(file) = picker_clone.files().and_then(|files| files.get(0)) else {
                return;
            };
            let _ = dropdown.class_list().remove_1("show");
            dispatch(&controller, &file.name(), InputKind::File);
            picker_clone.set_value("");
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn submit_text(controller: &Rc<RefCell<Controller>>, input: &HtmlInputElement) {
    if input.disabled() {
        return;
    }
    if dispatch(controller, &input.value(), InputKind::Text) {
        input.set_value("");
    }
}

/// Hand one user input to the controller and arm the reply timer.
/// Returns whether the input was accepted.
fn dispatch(controller: &Rc<RefCell<Controller>>, content: &str, kind: InputKind) -> bool {
    let sent = controller.borrow_mut().send_user_message(content, kind);
    match sent {
        Ok(pending) => {
            schedule_reply(controller.clone(), pending);
            true
        }
        Err(e) => {
            log::debug!("Send dropped: {}", e);
            false
        }
    }
}

fn schedule_reply(controller: Rc<RefCell<Controller>>, pending: PendingReply) {
    let delay_ms = u32::try_from(pending.delay.as_millis()).unwrap_or(u32::MAX);
    wasm_bindgen_futures::spawn_local(async move {
        gloo_timers::future::TimeoutFuture::new(delay_ms).await;
        // A cancelled or superseded ticket is ignored by the controller
        if controller.borrow_mut().complete_reply(pending.ticket).is_none() {
            log::debug!("{} was no longer pending", pending.ticket);
        }
    });
}

fn read_image(controller: &Rc<RefCell<Controller>>, file: &web_sys::File) -> Result<(), JsValue> {
    let reader = FileReader::new()?;
    let reader_clone = reader.clone();
    let controller = controller.clone();

    let onload = Closure::once_into_js(move || match reader_clone.result() {
        Ok(result) => match result.as_string() {
            Some(data_url) => {
                dispatch(&controller, &data_url, InputKind::Image);
            }
            None => log::error!("Image reader produced no data URL"),
        },
        Err(e) => log::error!("Image reader failed: {}", utils::describe_js_error(&e)),
    });

    reader.set_onload(Some(onload.unchecked_ref()));
    reader.read_as_data_url(file)
}
