use super::message::{Message, MessageKind, Sender};

pub const PLACEHOLDER_TEXT: &str = "⏳ Procesando...";

/// Handle for the placeholder created by one optimistic append.
///
/// Not `Clone`: resolving consumes it, so a placeholder is resolved at most once.
#[derive(Debug)]
#[must_use = "an unresolved ticket leaves its placeholder pending"]
pub struct PendingTicket {
    placeholder: u64,
}

impl PendingTicket {
    pub fn placeholder_id(&self) -> u64 {
        self.placeholder
    }
}

/// Ordered, in-memory chat log. Entries are appended and removed, never reordered.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<Message>,
    next_id: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, sender: Sender, kind: MessageKind, content: String, pending: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            sender,
            kind,
            content,
            pending,
        });
        id
    }

    /// Append the user's message followed by a pending bot placeholder.
    pub fn begin(&mut self, kind: MessageKind, content: impl Into<String>) -> PendingTicket {
        self.push(Sender::User, kind, content.into(), false);
        let placeholder = self.push(
            Sender::Bot,
            MessageKind::Text,
            PLACEHOLDER_TEXT.to_string(),
            true,
        );
        PendingTicket { placeholder }
    }

    /// Delete the ticket's placeholder, then append the terminal bot message.
    pub fn resolve(
        &mut self,
        ticket: PendingTicket,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> &Message {
        self.messages
            .retain(|m| !(m.pending && m.id == ticket.placeholder));
        self.push(Sender::Bot, kind, content.into(), false);
        // push always leaves the new entry last
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_placeholder()).count()
    }

    pub fn is_bot_typing(&self) -> bool {
        self.pending_count() > 0
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
