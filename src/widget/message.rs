use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
}

/// One entry of the chat log. `content` is plain text, a data URL, or a remote URL
/// depending on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub kind: MessageKind,
    pub content: String,
    pub pending: bool,
}

impl Message {
    pub fn is_placeholder(&self) -> bool {
        self.pending && self.sender == Sender::Bot
    }
}
