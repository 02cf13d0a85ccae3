use colored::{ColoredString, Colorize};
use std::io::{self, Write};

use pocketchat_chat::{ChatView, HistoryEntry, Message, Sender, Theme};

/// Prints the conversation thread to a terminal.
///
/// The history panel is kept in memory and shown on demand, since reprinting
/// it after every commit would bury the thread.
pub struct TerminalView<W = io::Stdout> {
    out: W,
    theme: Theme,
    history: Vec<HistoryEntry>,
    busy: bool,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            theme: Theme::default(),
            history: Vec::new(),
            busy: false,
        }
    }

    /// Entries last rendered into the history panel, newest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print the history panel with 1-based positions for `/open`
    pub fn print_history(&mut self) {
        if self.history.is_empty() {
            self.emit(&format!("{}", "No saved conversations".bright_black()));
            return;
        }
        let lines: Vec<String> = self
            .history
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{:>3}. {} {}", i + 1, entry.title, format!("[{}]", entry.id).bright_black()))
            .collect();
        for line in lines {
            self.emit(&line);
        }
    }

    fn label(&self, sender: Sender) -> ColoredString {
        match (sender, self.theme) {
            (Sender::User, Theme::Dark) => "You:".bright_green().bold(),
            (Sender::User, Theme::Light) => "You:".green().bold(),
            (Sender::Assistant, Theme::Dark) => "Assistant:".bright_cyan().bold(),
            (Sender::Assistant, Theme::Light) => "Assistant:".blue().bold(),
        }
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            log::error!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn append_message(&mut self, message: &Message) {
        let body = if message.is_image() {
            format!("🖼️  {}", message.content)
        } else {
            message.content.clone()
        };
        let line = format!("{} {}", self.label(message.sender), body);
        self.emit(&line);
    }

    fn clear_thread(&mut self) {
        let rule = format!("{}", "─".repeat(40).bright_black());
        self.emit(&rule);
    }

    fn render_history(&mut self, entries: &[HistoryEntry]) {
        self.history = entries.to_vec();
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        if busy {
            let line = format!("{}", "Assistant is typing... (Ctrl-C to cancel)".bright_black());
            self.emit(&line);
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn output(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn test_messages_are_printed_with_sender() {
        let mut view = TerminalView::new(Vec::new());
        view.append_message(&Message::user_text("hi"));
        view.append_message(&Message::assistant_text("Hello there!"));
        view.append_message(&Message::user_image("/tmp/cat.png"));

        let text = output(view);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("You:") && lines[0].ends_with("hi"));
        assert!(lines[1].contains("Assistant:") && lines[1].ends_with("Hello there!"));
        assert!(lines[2].ends_with("/tmp/cat.png"));
    }

    #[test]
    fn test_history_is_kept_until_printed() {
        let mut view = TerminalView::new(Vec::new());
        view.render_history(&[
            HistoryEntry { id: 2, title: "second...".to_string() },
            HistoryEntry { id: 1, title: "first...".to_string() },
        ]);
        assert_eq!(view.history().len(), 2);

        view.print_history();
        let text = output(view);
        assert!(text.lines().next().unwrap().contains("1. second..."));
        assert!(text.lines().nth(1).unwrap().contains("2. first..."));
    }

    #[test]
    fn test_busy_and_theme_state() {
        let mut view = TerminalView::new(Vec::new());
        view.set_busy(true);
        assert!(view.is_busy());
        view.set_busy(false);
        view.apply_theme(Theme::Light);
        assert_eq!(view.theme(), Theme::Light);
        assert!(output(view).contains("typing"));
    }
}
