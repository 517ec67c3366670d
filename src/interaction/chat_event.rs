//! Message routing: persona commands first, then filtering, triggering, relaying and replying.

use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        prompts::{GROUP_REPLY_SEPARATOR, WARMUP_PROMPT},
        types::{MessageEvent, Void},
    },
    interaction::{
        filter::EligibilityFilter,
        persona::{PersonaCommands, PersonaState},
        relay::CompletionRelay,
        reply::dispatch_reply,
        trigger::TriggerRule,
    },
    service::{chat::ChatClient, llm::LlmClient},
};

/// Routes inbound messages: persona commands, filtering, triggering, and relaying.
///
/// This is trivially cloneable; clones share the same persona state.
#[derive(Clone)]
pub struct Router {
    bot_name: String,
    filter: EligibilityFilter,
    trigger: TriggerRule,
    commands: PersonaCommands,
    persona: PersonaState,
    relay: CompletionRelay,
    chat: ChatClient,
    max_message_size: usize,
}

impl Router {
    /// Create a router from the application config.
    ///
    /// `current_date` is baked into every templated persona, including the default one.
    pub fn new(config: &Config, current_date: &str, llm: LlmClient, chat: ChatClient) -> Self {
        let commands = PersonaCommands::standard(&config.bot_name, current_date);
        let persona = PersonaState::new(commands.default_persona());

        Self {
            bot_name: config.bot_name.clone(),
            filter: EligibilityFilter::from_config(config),
            trigger: TriggerRule::new(config.bot_name.clone(), config.trigger_keyword.clone()),
            commands,
            persona,
            relay: CompletionRelay::new(llm, config.model_config(), config.error_message.clone()),
            chat,
            max_message_size: config.single_message_max_size,
        }
    }

    /// The shared persona state.
    pub fn persona(&self) -> &PersonaState {
        &self.persona
    }

    /// Log the trigger setup and run one warm-up completion.
    #[instrument(skip_all)]
    pub async fn announce(&self) {
        info!("Bot name is: {}", self.bot_name);
        info!("Trigger keyword in private chat is: {}", self.trigger.keyword());
        info!("Trigger keyword in group chat is: {}", self.trigger.group_prefix());

        let reply = self.relay.relay(&self.persona.current().await, WARMUP_PROMPT).await;

        if reply == self.relay.fallback() {
            warn!("Warm-up completion failed; replies will fall back until the service recovers.");
        } else {
            info!("Warm-up completion succeeded, ready to handle messages!");
        }
    }

    /// Process one inbound message to completion.
    #[instrument(skip_all, fields(conversation = %event.conversation_id))]
    pub async fn handle_chat_event(&self, event: MessageEvent) -> Void {
        // Persona commands apply to every message, before any filtering.

        if let Some(command) = self.commands.find(&event.text) {
            info!("Persona command triggered: {}", command.trigger);

            self.persona.replace(self.commands.resolve(command, &event.text)).await;
            self.chat.send_message(event.reply_target(), &command.acknowledgement).await?;

            return Ok(());
        }

        // Drop anything that is not eligible or does not trigger.

        let is_private = event.is_private();

        if self.filter.should_ignore(&event) || !self.trigger.matches(&event.text, is_private) {
            return Ok(());
        }

        // Relay the cleaned text under the current persona.

        let text = self.trigger.clean(&event.text, is_private);
        let persona = self.persona.current().await;
        let reply = self.relay.relay(&persona, &text).await;

        // Groups see the original question above the answer.

        let reply = if is_private { reply } else { format!("{text}{GROUP_REPLY_SEPARATOR}{reply}") };

        dispatch_reply(&self.chat, event.reply_target(), &reply, self.max_message_size).await
    }
}
