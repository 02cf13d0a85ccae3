//! Canned assistant replies.
//!
//! A deterministic keyword responder standing in for a real backend.

pub const GREETING_REPLY: &str = "Hello there! How can I help you today?";
pub const STATUS_REPLY: &str = "I am a Rust-based assistant, running perfectly right here on your machine!";
pub const IDENTITY_REPLY: &str = "I am a simple AI assistant, built with Rust and WebAssembly.";
pub const FALLBACK_REPLY: &str =
    "This is a simple response from my client-side agent. I am not connected to a server.";
pub const IMAGE_REPLY: &str = "Thank you for the image! Since I am a client-side agent, I cannot \"see\" it, but I can display it for you.";
pub const FILE_REPLY: &str =
    "Thanks for the file! I can't open attachments, but I've noted that you uploaded it.";

/// Kind of user input a reply is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Image,
    File,
}

/// Map user input to a canned reply
pub fn reply(input: &str, kind: InputKind) -> &'static str {
    match kind {
        InputKind::Text => text_reply(input),
        InputKind::Image => IMAGE_REPLY,
        InputKind::File => FILE_REPLY,
    }
}

// Checked in priority order; plain substring matches, so "this" counts as "hi".
fn text_reply(input: &str) -> &'static str {
    let lower = input.to_lowercase();
    if lower.contains("hello") || lower.contains("hi") {
        GREETING_REPLY
    } else if lower.contains("how are you") {
        STATUS_REPLY
    } else if lower.contains("what is your name") {
        IDENTITY_REPLY
    } else {
        FALLBACK_REPLY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        assert_eq!(reply("Hello there", InputKind::Text), GREETING_REPLY);
        assert_eq!(reply("HI", InputKind::Text), GREETING_REPLY);
    }

    #[test]
    fn test_priority_order() {
        // "hi" wins over "how are you" when both appear
        assert_eq!(reply("hi, how are you?", InputKind::Text), GREETING_REPLY);
        assert_eq!(reply("How are you?", InputKind::Text), STATUS_REPLY);
        assert_eq!(reply("So, what is your name?", InputKind::Text), IDENTITY_REPLY);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(reply("random text", InputKind::Text), FALLBACK_REPLY);
        assert_eq!(reply("", InputKind::Text), FALLBACK_REPLY);
    }

    #[test]
    fn test_attachments_ignore_content() {
        assert_eq!(reply("data:image/png;base64,hello", InputKind::Image), IMAGE_REPLY);
        assert_eq!(reply("", InputKind::Image), IMAGE_REPLY);
        assert_eq!(reply("hi.txt", InputKind::File), FILE_REPLY);
    }
}
