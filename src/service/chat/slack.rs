//! Chat service integration for persona-relay.
//!
//! This module connects to Slack in socket mode and:
//! - Converts message push events into [`MessageEvent`] values on the inbound feed
//! - Sends plain-text messages back to conversations
//!
//! Slack renders mentions as `<@USER_ID>` tokens; the adapter rewrites mentions of
//! the bot to `@<bot name>` so the trigger rules see the same text on every platform.

use crate::{
    base::{
        config::Config,
        types::{ContentType, MessageEvent, Res, Sender, Void},
    },
    service::chat::InboundFeed,
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Slack channel type for direct messages.
const DIRECT_MESSAGE_CHANNEL_TYPE: &str = "im";

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    feed: InboundFeed,
    bot_user_id: String,
    bot_name: String,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    app_token: SlackApiToken,
    bot_token: SlackApiToken,
    bot_user_id: String,
    bot_name: String,
    client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            bot_name: config.bot_name.clone(),
            client,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn start(&self, feed: InboundFeed) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            feed,
            bot_user_id: self.bot_user_id.clone(),
            bot_name: self.bot_name.clone(),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events.
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, conversation_id: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(conversation_id.to_string()), message)
            .with_as_user(true)
            .with_link_names(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Event mapping.

/// Rewrite Slack mention tokens for the bot (`<@U123>`) into `@<bot name>`.
pub fn normalize_mentions(text: &str, bot_user_id: &str, bot_name: &str) -> String {
    text.replace(&format!("<@{bot_user_id}>"), &format!("@{bot_name}"))
}

/// Whether a message was posted by a bot, including the echo of our own replies.
///
/// Slack delivers every `chat.postMessage` back to the listener, so relaying these
/// would answer our own replies forever.
fn is_bot_post(event: &SlackMessageEvent, bot_user_id: &str) -> bool {
    event.sender.bot_id.is_some() || event.subtype == Some(SlackMessageEventType::BotMessage) || event.sender.user.as_ref().is_some_and(|u| u.0 == bot_user_id)
}

/// Classify a Slack message by its subtype and attachments.
fn classify_content(event: &SlackMessageEvent) -> ContentType {
    let has_files = event.content.as_ref().and_then(|c| c.files.as_ref()).is_some_and(|files| !files.is_empty());

    if has_files {
        ContentType::Attachment
    } else if event.subtype.is_some() {
        ContentType::Unknown
    } else {
        ContentType::Text
    }
}

/// Convert a Slack message event into a [`MessageEvent`].
///
/// Returns `None` for events without a channel, which cannot be replied to.
fn to_message_event(event: &SlackMessageEvent, bot_user_id: &str, bot_name: &str) -> Option<MessageEvent> {
    let conversation_id = event.origin.channel.as_ref()?.0.clone();

    let is_direct = event.origin.channel_type.as_ref().is_some_and(|t| t.0 == DIRECT_MESSAGE_CHANNEL_TYPE);
    let group_id = if is_direct { None } else { Some(conversation_id.clone()) };

    let sender_id = event.sender.user.as_ref().map(|u| u.0.clone()).unwrap_or_default();
    let sender_name = event.sender.username.clone().unwrap_or_else(|| sender_id.clone());

    let text = event.content.as_ref().and_then(|c| c.text.as_deref()).unwrap_or_default();

    Some(MessageEvent {
        conversation_id,
        sender: Sender {
            is_self: sender_id == bot_user_id,
            id: sender_id,
            name: sender_name,
        },
        group_id,
        content_type: classify_content(event),
        text: normalize_mentions(text, bot_user_id, bot_name),
    })
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are currently supported.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            debug!("Received message event ...");

            if is_bot_post(&slack_message_event, &user_state.bot_user_id) {
                debug!("Skipping message posted by a bot.");
                return Ok(());
            }

            let Some(message) = to_message_event(&slack_message_event, &user_state.bot_user_id, &user_state.bot_name) else {
                warn!("Skipping message event without a channel.");
                return Ok(());
            };

            user_state.feed.send(message).map_err(|_| anyhow::anyhow!("Inbound feed is closed"))?;
        }
        SlackEventCallbackBody::AppMention(_) => {
            // The same text also arrives as a message event.
            debug!("Ignoring app mention event.");
        }
        _ => {
            warn!("Received unhandled push event.")
        }
    }

    Ok(())
}

// Tests.
