use std::fmt;
use std::time::Duration;

use pocketchat_types::{ChatConfig, Conversation, ConversationId, Message, Theme};

use crate::clock::{Clock, SystemClock};
use crate::error::{ClearError, SendError};
use crate::history::{self, HistoryEntry};
use crate::model::{CommitOutcome, ConversationModel};
use crate::persistence::ConversationStore;
use crate::reply::{self, InputKind};
use crate::store::KeyValueStore;
use crate::view::ChatView;

/// Prompt shown before the collection is wiped
pub const CLEAR_PROMPT: &str =
    "Are you sure you want to delete all recent history? This action cannot be undone.";

/// Identifies one scheduled assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTicket(u64);

impl fmt::Display for ReplyTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reply#{}", self.0)
    }
}

/// Returned by an accepted send: the front end arms a timer for `delay`
/// and then hands `ticket` back to [`SessionController::complete_reply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReply {
    pub ticket: ReplyTicket,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingReply(ReplyTicket),
}

/// Confirmation token for a destructive clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearRequest {
    pub token: ClearToken,
    pub prompt: &'static str,
}

struct InFlight {
    ticket: ReplyTicket,
    due_at: i64,
    reply: &'static str,
}

/// Orchestrates user actions against the model, the store and the view.
///
/// Owns all session state; front ends hold the controller and forward
/// events to it.
pub struct SessionController<S, V, C = SystemClock> {
    config: ChatConfig,
    store: ConversationStore<S>,
    model: ConversationModel,
    view: V,
    clock: C,
    theme: Theme,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    pending_clear: Option<ClearToken>,
    next_clear_token: u64,
}

impl<S: KeyValueStore, V: ChatView, C: Clock> SessionController<S, V, C> {
    /// Load the stored collection and theme, then render the history panel
    pub fn new(config: ChatConfig, store: S, view: V, clock: C) -> Self {
        let store = ConversationStore::new(store, &config);
        let conversations = store.load();
        let theme = store.load_theme();
        let model = ConversationModel::with_conversations(&config, conversations);

        let mut controller = Self {
            config,
            store,
            model,
            view,
            clock,
            theme,
            in_flight: None,
            next_ticket: 1,
            pending_clear: None,
            next_clear_token: 1,
        };

        controller.view.apply_theme(theme);
        controller.refresh_history();
        controller
    }

    // ------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------

    /// Append a user message and schedule the canned reply.
    ///
    /// For `InputKind::Image` the content is the image reference; for
    /// `InputKind::File` it is the file name.
    pub fn send_user_message(
        &mut self,
        content: &str,
        kind: InputKind,
    ) -> Result<PendingReply, SendError> {
        if let Some(in_flight) = &self.in_flight {
            log::debug!("Dropping send while {} is pending", in_flight.ticket);
            return Err(SendError::Busy);
        }

        let message = match kind {
            InputKind::Text => Message::user_text(content.trim()),
            InputKind::Image if content.is_empty() => return Err(SendError::EmptyInput),
            InputKind::Image => Message::user_image(content),
            InputKind::File if content.trim().is_empty() => return Err(SendError::EmptyInput),
            InputKind::File => Message::user_text(format!("File uploaded: {}", content.trim())),
        };

        self.model.append_message(message.clone())?;
        self.view.append_message(&message);
        self.commit_and_persist();

        let ticket = ReplyTicket(self.next_ticket);
        self.next_ticket += 1;
        let delay = self.config.reply_delay();
        let delay_ms = i64::try_from(self.config.reply_delay_ms).unwrap_or(i64::MAX);
        self.in_flight = Some(InFlight {
            ticket,
            due_at: self.clock.now_millis().saturating_add(delay_ms),
            reply: reply::reply(content, kind),
        });
        self.view.set_busy(true);
        log::debug!("Scheduled {} in {:?}", ticket, delay);

        Ok(PendingReply { ticket, delay })
    }

    pub fn send_text(&mut self, input: &str) -> Result<PendingReply, SendError> {
        self.send_user_message(input, InputKind::Text)
    }

    pub fn send_image(&mut self, reference: &str) -> Result<PendingReply, SendError> {
        self.send_user_message(reference, InputKind::Image)
    }

    pub fn send_file(&mut self, file_name: &str) -> Result<PendingReply, SendError> {
        self.send_user_message(file_name, InputKind::File)
    }

    /// Deliver the reply for `ticket`. Stale or cancelled tickets are ignored.
    pub fn complete_reply(&mut self, ticket: ReplyTicket) -> Option<Message> {
        match &self.in_flight {
            Some(in_flight) if in_flight.ticket == ticket => {}
            _ => {
                log::debug!("Ignoring stale {}", ticket);
                return None;
            }
        }
        let in_flight = self.in_flight.take()?;

        let message = Message::assistant_text(in_flight.reply);
        if let Err(e) = self.model.append_message(message.clone()) {
            log::error!("Dropping reply {}: {}", ticket, e);
            self.view.set_busy(false);
            return None;
        }
        self.view.append_message(&message);
        self.commit_and_persist();
        self.view.set_busy(false);

        Some(message)
    }

    /// Deliver the pending reply if its delay has elapsed on the controller's clock
    pub fn poll_reply(&mut self) -> Option<Message> {
        let now = self.clock.now_millis();
        let ticket = self
            .in_flight
            .as_ref()
            .filter(|in_flight| now >= in_flight.due_at)
            .map(|in_flight| in_flight.ticket)?;
        self.complete_reply(ticket)
    }

    /// Drop the pending reply and release the input lock
    pub fn cancel_reply(&mut self) -> Option<ReplyTicket> {
        let in_flight = self.in_flight.take()?;
        log::debug!("Cancelled {}", in_flight.ticket);
        self.view.set_busy(false);
        Some(in_flight.ticket)
    }

    // ------------------------------------------------------------------
    // Conversation switching
    // ------------------------------------------------------------------

    pub fn start_new_conversation(&mut self) {
        self.cancel_reply();
        self.commit_and_persist();
        self.model.reset_active();
        self.view.clear_thread();
    }

    /// Switch to a saved conversation and re-render its thread.
    /// An unknown id leaves an empty thread and returns false.
    pub fn select_conversation(&mut self, id: ConversationId) -> bool {
        self.cancel_reply();

        let had_unsaved = !self.model.active_messages().is_empty();
        let found = self.model.switch_to(id, self.clock.now_millis());
        if had_unsaved {
            self.persist();
            self.refresh_history();
        }

        self.view.clear_thread();
        for message in self.model.active_messages() {
            self.view.append_message(message);
        }
        found
    }

    // ------------------------------------------------------------------
    // Clearing
    // ------------------------------------------------------------------

    /// First step of a clear: nothing changes until the token is confirmed
    pub fn request_clear(&mut self) -> ClearRequest {
        let token = ClearToken(self.next_clear_token);
        self.next_clear_token += 1;
        self.pending_clear = Some(token);
        ClearRequest {
            token,
            prompt: CLEAR_PROMPT,
        }
    }

    pub fn confirm_clear(&mut self, token: ClearToken) -> Result<(), ClearError> {
        self.take_clear_token(token)?;

        self.cancel_reply();
        self.model.clear_all();
        if let Err(e) = self.store.clear() {
            log::error!("Failed to delete stored conversations: {}", e);
        }
        self.view.clear_thread();
        self.refresh_history();
        log::info!("Cleared conversation history");
        Ok(())
    }

    pub fn decline_clear(&mut self, token: ClearToken) -> Result<(), ClearError> {
        self.take_clear_token(token)
    }

    fn take_clear_token(&mut self, token: ClearToken) -> Result<(), ClearError> {
        if self.pending_clear != Some(token) {
            return Err(ClearError::UnknownToken(token.0));
        }
        self.pending_clear = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = self.store.save_theme(self.theme) {
            log::error!("Failed to save theme preference: {}", e);
        }
        self.view.apply_theme(self.theme);
        self.theme
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        match &self.in_flight {
            Some(in_flight) => SessionState::AwaitingReply(in_flight.ticket),
            None => SessionState::Idle,
        }
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn active_messages(&self) -> &[Message] {
        self.model.active_messages()
    }

    pub fn active_conversation_id(&self) -> Option<ConversationId> {
        self.model.active_id()
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.model.conversations()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        history::render(self.model.conversations())
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit_and_persist(&mut self) {
        let Some(outcome) = self.model.commit_active(self.clock.now_millis()) else {
            return;
        };
        self.persist();
        if let CommitOutcome::Created(_) = outcome {
            self.refresh_history();
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.model.conversations()) {
            log::error!("Failed to persist conversations: {}", e);
        }
    }

    fn refresh_history(&mut self) {
        let entries = history::render(self.model.conversations());
        self.view.render_history(&entries);
    }
}
