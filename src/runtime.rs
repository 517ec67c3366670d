//! Runtime services and shared state for persona-relay.

use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::chat_event::Router,
    service::{chat::ChatClient, llm::LlmClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the service clients, and the router.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The message router.
    pub router: Router,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self::with_clients(config, llm, chat))
    }

    /// Assemble a runtime around already-constructed clients.
    pub fn with_clients(config: Config, llm: LlmClient, chat: ChatClient) -> Self {
        let current_date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let router = Router::new(&config, &current_date, llm.clone(), chat.clone());

        Self { config, llm, chat, router }
    }

    /// Announce the bot, then listen for messages until the chat listener stops.
    ///
    /// Messages are handled one at a time, in arrival order. A failure while
    /// handling one message is logged and does not affect the next. Messages
    /// still queued when the listener stops are handled before this returns.
    pub async fn start(&self) -> Void {
        self.router.announce().await;

        let (feed, mut inbound) = mpsc::unbounded_channel();

        let listener = self.chat.start(feed);

        let consumer = async {
            while let Some(event) = inbound.recv().await {
                if let Err(err) = self.router.handle_chat_event(event).await {
                    error!("Error while handling: {}", err);
                }
            }
        };

        // The listener owns the feed, so the consumer drains whatever is queued
        // and then stops once the listener returns.
        let (result, _) = tokio::join!(
            async {
                let result = listener.await;
                info!("Chat listener stopped.");
                result
            },
            consumer
        );

        info!("Inbound feed drained.");

        result
    }
}
