use serde::{Deserialize, Serialize};

/// Conversation length above which [`Conversation::trim`] prunes history.
pub const MAX_HISTORY: usize = 20;

/// Number of recent non-system messages kept after pruning.
pub const KEPT_AFTER_TRIM: usize = 10;

/// Who sent a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Returns the display prefix for this role.
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::System => "System: ",
            Role::User => "You: ",
            Role::Assistant => "Assistant: ",
        }
    }
}

/// A single message in the chat history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered chat history, oldest first.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replace the first system message, or insert one at the front.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        match self.messages.iter_mut().find(|m| m.role == Role::System) {
            Some(message) => message.content = prompt,
            None => self.messages.insert(0, Message::system(prompt)),
        }
    }

    /// Drop old turns once the history grows past [`MAX_HISTORY`].
    ///
    /// System messages are always kept; of the rest only the last
    /// [`KEPT_AFTER_TRIM`] survive. Returns whether anything was dropped.
    pub fn trim(&mut self) -> bool {
        if self.messages.len() <= MAX_HISTORY {
            return false;
        }

        let (system, rest): (Vec<Message>, Vec<Message>) = std::mem::take(&mut self.messages)
            .into_iter()
            .partition(|m| m.role == Role::System);
        let skip = rest.len().saturating_sub(KEPT_AFTER_TRIM);

        self.messages = system;
        self.messages.extend(rest.into_iter().skip(skip));
        true
    }
}
