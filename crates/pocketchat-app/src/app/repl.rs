use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

use pocketchat_chat::{
    parse_selection, ChatView, Clock, ConversationId, HistoryEntry, InputKind, KeyValueStore,
    Message, PendingReply, SessionController, SystemClock,
};

use crate::app::setup::AppConfig;
use crate::cli::is_yes;
use crate::storage::FileStore;
use crate::view::TerminalView;

/// One line of REPL input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Send(&'a str),
    New,
    History,
    Open(&'a str),
    Clear,
    Image(&'a str),
    File(&'a str),
    Theme,
    Help,
    Exit,
    Usage(&'static str),
    Unknown(&'a str),
}

/// Classify a trimmed, non-empty input line
pub fn parse_command(line: &str) -> ReplCommand<'_> {
    if line == "exit" || line == "quit" {
        return ReplCommand::Exit;
    }
    if !line.starts_with('/') {
        return ReplCommand::Send(line);
    }

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match (command, arg.is_empty()) {
        ("/new", _) => ReplCommand::New,
        ("/history", _) => ReplCommand::History,
        ("/clear", _) => ReplCommand::Clear,
        ("/theme", _) => ReplCommand::Theme,
        ("/help", _) => ReplCommand::Help,
        ("/open", true) => ReplCommand::Usage("/open <n|id>"),
        ("/open", false) => ReplCommand::Open(arg),
        ("/image", true) => ReplCommand::Usage("/image <path>"),
        ("/image", false) => ReplCommand::Image(arg),
        ("/file", true) => ReplCommand::Usage("/file <path>"),
        ("/file", false) => ReplCommand::File(arg),
        _ => ReplCommand::Unknown(command),
    }
}

/// Resolve an `/open` argument: a 1-based position in the history list, or a raw id
pub fn resolve_selection(arg: &str, entries: &[HistoryEntry]) -> Option<ConversationId> {
    let value = parse_selection(arg)?;
    if let Ok(position) = usize::try_from(value) {
        if let Some(entry) = position.checked_sub(1).and_then(|i| entries.get(i)) {
            return Some(entry.id);
        }
    }
    Some(value)
}

/// Send one input and wait out the reply delay. Ctrl-C cancels the pending reply.
pub async fn send_and_wait<S, V, C>(
    chat: &mut SessionController<S, V, C>,
    content: &str,
    kind: InputKind,
) -> Option<Message>
where
    S: KeyValueStore,
    V: ChatView,
    C: Clock,
{
    match chat.send_user_message(content, kind) {
        Ok(pending) => wait_for_reply(chat, pending).await,
        Err(e) => {
            log::debug!("Send dropped: {}", e);
            None
        }
    }
}

async fn wait_for_reply<S, V, C>(
    chat: &mut SessionController<S, V, C>,
    pending: PendingReply,
) -> Option<Message>
where
    S: KeyValueStore,
    V: ChatView,
    C: Clock,
{
    tokio::select! {
        _ = tokio::time::sleep(pending.delay) => chat.complete_reply(pending.ticket),
        _ = tokio::signal::ctrl_c() => {
            if let Some(ticket) = chat.cancel_reply() {
                println!("\n{}", "^C - reply cancelled".bright_yellow());
                log::debug!("Cancelled {} from the keyboard", ticket);
            }
            None
        }
    }
}

/// Record a line in the editor history. Returns whether it was added.
fn remember_line(rl: &mut DefaultEditor, line: &str) -> bool {
    match rl.add_history_entry(line) {
        Ok(added) => added,
        Err(e) => {
            log::warn!("Failed to record history entry: {}", e);
            false
        }
    }
}

fn print_help() {
    println!("{} Commands:", "💡".bright_cyan());
    println!("  <text>           - Send a message");
    println!("  /new             - Start a new conversation");
    println!("  /history         - List saved conversations");
    println!("  /open <n|id>     - Open a conversation by list position or id");
    println!("  /image <path>    - Send an image");
    println!("  /file <path>     - Upload a file");
    println!("  /theme           - Toggle light/dark theme");
    println!("  /clear           - Delete all saved conversations");
    println!("  exit, quit       - Leave");
}

/// Run interactive REPL mode
pub async fn run_repl_mode(app: AppConfig) -> Result<()> {
    println!("{}", "💬 PocketChat".bright_cyan().bold());
    println!("{}", format!("Data directory: {}", app.data_dir.display()).bright_black());
    println!("{}", "Type 'exit' or 'quit' to exit, or '/help' to see commands\n".bright_black());

    let store = FileStore::open(&app.data_dir)
        .with_context(|| format!("Failed to open data directory {}", app.data_dir.display()))?;
    let mut chat = SessionController::new(app.chat, store, TerminalView::stdout(), SystemClock);

    let saved = chat.conversations().len();
    if saved > 0 {
        println!("{}", format!("{} saved conversations - /history to list them", saved).bright_black());
    }

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline(&format!("{} ", "›".bright_green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                remember_line(&mut rl, line);

                match parse_command(line) {
                    ReplCommand::Exit => {
                        println!("{}", "Goodbye!".bright_cyan());
                        break;
                    }
                    ReplCommand::Send(text) => {
                        send_and_wait(&mut chat, text, InputKind::Text).await;
                    }
                    ReplCommand::New => {
                        chat.start_new_conversation();
                        println!("{} New conversation", "✨".bright_green());
                    }
                    ReplCommand::History => chat.view_mut().print_history(),
                    ReplCommand::Open(arg) => match resolve_selection(arg, chat.view().history()) {
                        Some(id) => {
                            if !chat.select_conversation(id) {
                                eprintln!("{} No saved conversation {}", "❌".bright_red(), id);
                            }
                        }
                        None => eprintln!("{} '{}' is not a list position or id", "❌".bright_red(), arg),
                    },
                    ReplCommand::Clear => {
                        let request = chat.request_clear();
                        let answer = rl.readline(&format!("{} [y/N] ", request.prompt));
                        let confirmed = matches!(&answer, Ok(a) if is_yes(a));

                        let result = if confirmed {
                            chat.confirm_clear(request.token)
                        } else {
                            chat.decline_clear(request.token)
                        };
                        match result {
                            Ok(()) if confirmed => println!("{} History cleared", "🗑️".bright_green()),
                            Ok(()) => println!("{}", "Nothing deleted".bright_black()),
                            Err(e) => eprintln!("{} {}", "❌".bright_red(), e),
                        }
                    }
                    ReplCommand::Image(path) => {
                        if Path::new(path).is_file() {
                            send_and_wait(&mut chat, path, InputKind::Image).await;
                        } else {
                            eprintln!("{} No such image: {}", "❌".bright_red(), path);
                        }
                    }
                    ReplCommand::File(path) => {
                        let path = Path::new(path);
                        match path.file_name() {
                            Some(name) if path.is_file() => {
                                send_and_wait(&mut chat, &name.to_string_lossy(), InputKind::File).await;
                            }
                            _ => eprintln!("{} No such file: {}", "❌".bright_red(), path.display()),
                        }
                    }
                    ReplCommand::Theme => {
                        let theme = chat.toggle_theme();
                        println!("{} Theme: {}", "🎨".bright_cyan(), theme.as_str());
                    }
                    ReplCommand::Help => print_help(),
                    ReplCommand::Usage(usage) => eprintln!("{} Usage: {}", "❌".bright_red(), usage),
                    ReplCommand::Unknown(command) => {
                        eprintln!(
                            "{} Unknown command '{}'. Type /help for commands.",
                            "❌".bright_red(),
                            command
                        );
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C (type 'exit' to quit)".bright_yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} Error: {}", "❌".bright_red(), err);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketchat_chat::reply::{FALLBACK_REPLY, GREETING_REPLY};
    use pocketchat_chat::{ChatConfig, ManualClock, MemoryStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_text_and_exit() {
        assert_eq!(parse_command("hello there"), ReplCommand::Send("hello there"));
        assert_eq!(parse_command("exit"), ReplCommand::Exit);
        assert_eq!(parse_command("quit"), ReplCommand::Exit);
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(parse_command("/open 2"), ReplCommand::Open("2"));
        assert_eq!(parse_command("/image   ~/cat.png "), ReplCommand::Image("~/cat.png"));
        assert_eq!(parse_command("/file notes.txt"), ReplCommand::File("notes.txt"));
        assert_eq!(parse_command("/open"), ReplCommand::Usage("/open <n|id>"));
        assert_eq!(parse_command("/teleport now"), ReplCommand::Unknown("/teleport"));
        assert_eq!(parse_command("/new"), ReplCommand::New);
    }

    #[test]
    fn test_resolve_selection_prefers_list_position() {
        let entries = vec![
            HistoryEntry { id: 1_700_000_000_002, title: "newer...".to_string() },
            HistoryEntry { id: 1_700_000_000_001, title: "older...".to_string() },
        ];
        assert_eq!(resolve_selection("2", &entries), Some(1_700_000_000_001));
        assert_eq!(resolve_selection(" 1_700 ", &entries), None);
        assert_eq!(resolve_selection("1700000000002", &entries), Some(1_700_000_000_002));
        assert_eq!(resolve_selection("9", &entries), Some(9));
        assert_eq!(resolve_selection("abc", &entries), None);
    }

    #[test]
    fn test_remember_line_records_history() {
        use rustyline::history::History;

        let mut rl = DefaultEditor::new().unwrap();
        assert!(remember_line(&mut rl, "hello"));
        // Consecutive duplicates are skipped by the editor
        assert!(!remember_line(&mut rl, "hello"));
        assert!(remember_line(&mut rl, "/history"));
        assert_eq!(rl.history().len(), 2);
    }

    #[tokio::test]
    async fn test_send_and_wait_delivers_reply() {
        let config = ChatConfig::default().with_reply_delay_ms(5);
        let mut chat = SessionController::new(
            config,
            MemoryStore::new(),
            TerminalView::new(Vec::new()),
            ManualClock::starting_at(0),
        );

        let reply = send_and_wait(&mut chat, "hi", InputKind::Text).await;
        assert_eq!(reply, Some(Message::assistant_text(GREETING_REPLY)));
        assert!(!chat.is_awaiting_reply());

        let reply = send_and_wait(&mut chat, "tell me a story", InputKind::Text).await;
        assert_eq!(reply, Some(Message::assistant_text(FALLBACK_REPLY)));
        assert_eq!(chat.active_messages().len(), 4);
        assert_eq!(chat.conversations().len(), 1);
    }

    #[tokio::test]
    async fn test_send_and_wait_drops_empty_input() {
        let mut chat = SessionController::new(
            ChatConfig::default(),
            MemoryStore::new(),
            TerminalView::new(Vec::new()),
            ManualClock::starting_at(0),
        );
        assert_eq!(send_and_wait(&mut chat, "   ", InputKind::Text).await, None);
        assert!(chat.conversations().is_empty());
    }
}
