pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::base::types::{MessageEvent, Void};

// Types.

/// Sending half of the inbound message feed.
///
/// Chat adapters push every received message here; the runtime drains the
/// receiving half one message at a time.
pub type InboundFeed = mpsc::UnboundedSender<MessageEvent>;

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with persona-relay.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Start the chat client listener.
    ///
    /// Every message the platform delivers is converted to a [`MessageEvent`]
    /// and pushed into `feed`. Runs until the listener shuts down.
    async fn start(&self, feed: InboundFeed) -> Void;

    /// Send a message to a conversation.
    ///
    /// Used both for persona acknowledgements and for relayed replies.
    async fn send_message(&self, conversation_id: &str, text: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
