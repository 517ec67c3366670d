use thiserror::Error;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Inbound messages.

/// The kind of content carried by an inbound message.
///
/// Only [`ContentType::Text`] is ever relayed; everything else is ignored by the
/// eligibility filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Unknown,
    Attachment,
    Audio,
    Contact,
    ChatHistory,
    Emoticon,
    Image,
    Text,
    Location,
    MiniProgram,
    GroupNote,
    Transfer,
    RedEnvelope,
    Recalled,
    Url,
    Video,
    Post,
}

/// Who sent an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sender {
    /// Platform identifier of the sender.
    pub id: String,
    /// Display name of the sender.
    pub name: String,
    /// Whether the sender is the bot account itself.
    pub is_self: bool,
}

/// A single inbound message, as delivered by the chat adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageEvent {
    /// The conversation the message arrived in; replies go here.
    pub conversation_id: String,
    /// The sender of the message.
    pub sender: Sender,
    /// The enclosing group, if any. `None` means a one-to-one chat.
    pub group_id: Option<String>,
    /// The classified content type.
    pub content_type: ContentType,
    /// The raw message text.
    pub text: String,
}

impl MessageEvent {
    /// Whether this message arrived in a one-to-one chat.
    pub fn is_private(&self) -> bool {
        self.group_id.is_none()
    }

    /// The conversation that replies to this message should be delivered to.
    pub fn reply_target(&self) -> &str {
        self.group_id.as_deref().unwrap_or(&self.conversation_id)
    }
}

// Completion requests.

/// Role of a single turn in a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    System,
    User,
}

/// A role-tagged piece of text sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: TurnRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: TurnRole::User, content: content.into() }
    }
}

/// Static model parameters combined with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

// Completion failures.

/// Coarse classification of a completion failure, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Network,
    Auth,
    RateLimit,
    Unknown,
}

impl FailureReason {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            429 => Self::RateLimit,
            _ => Self::Unknown,
        }
    }
}

/// A failed completion request, with whatever detail the provider reported.
#[derive(Debug, Clone, Error)]
#[error("completion failed ({reason:?}): {}", .message.as_deref().unwrap_or("no details"))]
pub struct CompletionError {
    pub reason: FailureReason,
    pub status_code: Option<u16>,
    pub status_text: Option<String>,
    pub message: Option<String>,
}

impl CompletionError {
    /// A failure with only a reason and message.
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            status_code: None,
            status_text: None,
            message: Some(message.into()),
        }
    }
}

// Tests.
