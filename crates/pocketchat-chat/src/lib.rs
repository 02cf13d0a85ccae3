//! Conversation management for pocketchat
//!
//! This crate holds everything that does not depend on a rendering surface:
//! the persisted conversation collection, the in-memory conversation model,
//! the history list, the canned reply simulator and the session controller
//! that ties them together.

pub mod clock;
pub mod error;
pub mod history;
pub mod model;
pub mod persistence;
pub mod reply;
pub mod session;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ClearError, ModelError, SendError, StoreError, StoreResult};
pub use history::{parse_selection, HistoryEntry};
pub use model::{CommitOutcome, ConversationModel};
pub use persistence::ConversationStore;
pub use reply::{reply, InputKind};
pub use session::{ClearRequest, ClearToken, PendingReply, ReplyTicket, SessionController, SessionState};
pub use store::{KeyValueStore, MemoryStore};
pub use view::ChatView;

pub use pocketchat_types::{
    ChatConfig, Conversation, ConversationId, Message, MessageKind, Sender, Theme,
};
