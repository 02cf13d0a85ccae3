use pocketchat_types::{Message, Theme};

use crate::history::HistoryEntry;

/// Rendering surface driven by the session controller.
///
/// Implemented over the DOM in the browser, over stdout in the terminal,
/// and by recording fakes in tests.
pub trait ChatView {
    /// Append one message to the rendered thread
    fn append_message(&mut self, message: &Message);

    /// Remove every rendered message
    fn clear_thread(&mut self);

    /// Replace the history panel contents
    fn render_history(&mut self, entries: &[HistoryEntry]);

    /// Lock or unlock the input surface while a reply is pending
    fn set_busy(&mut self, busy: bool);

    fn apply_theme(&mut self, theme: Theme);
}
