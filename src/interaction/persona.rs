//! Persona state and the commands that replace it.
//!
//! The persona is the system prompt sent with every completion. It is shared by every
//! conversation the bot serves and only changes when a message contains one of the
//! persona commands.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::base::prompts::{self, render_template};

// Types.

/// How a persona command computes the new persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaReplacement {
    /// A fixed prompt.
    Fixed(String),
    /// The whole triggering message, verbatim.
    Verbatim,
    /// A prompt with the current date filled in.
    Templated(String),
}

/// A recognized persona command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaCommand {
    /// Substring that activates the command.
    pub trigger: String,
    /// Reply sent to the conversation when the command fires.
    pub acknowledgement: String,
    /// The new persona.
    pub replacement: PersonaReplacement,
}

/// The shared, process-wide persona.
///
/// This is trivially cloneable; clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct PersonaState {
    inner: Arc<RwLock<String>>,
}

impl PersonaState {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial.into())),
        }
    }

    /// A snapshot of the current persona.
    pub async fn current(&self) -> String {
        self.inner.read().await.clone()
    }

    /// Replace the persona wholesale.
    pub async fn replace(&self, persona: String) {
        *self.inner.write().await = persona;
    }
}

/// The ordered persona command table.
#[derive(Debug, Clone)]
pub struct PersonaCommands {
    commands: Vec<PersonaCommand>,
    current_date: String,
}

impl PersonaCommands {
    pub fn new(commands: Vec<PersonaCommand>, current_date: impl Into<String>) -> Self {
        Self {
            commands,
            current_date: current_date.into(),
        }
    }

    /// The built-in commands, addressed as `@<bot name> <word>`, in priority order.
    pub fn standard(bot_name: &str, current_date: impl Into<String>) -> Self {
        let command = |word: &str, acknowledgement: &str, replacement: PersonaReplacement| PersonaCommand {
            trigger: format!("@{bot_name} {word}"),
            acknowledgement: acknowledgement.to_string(),
            replacement,
        };

        let commands = vec![
            command("绫波丽出来", "🤖️：人格已切换到绫波丽", PersonaReplacement::Fixed(prompts::REI_PERSONA.to_string())),
            command("猫娘出来", "🤖️：人格已切换到猫娘", PersonaReplacement::Templated(prompts::CATGIRL_PERSONA.to_string())),
            command("魅魔出来", "🤖️：人格已切换到魅魔", PersonaReplacement::Fixed(prompts::SUCCUBUS_PERSONA.to_string())),
            command("逼乎模式", "🤖️：已激活逼乎模式", PersonaReplacement::Fixed(prompts::ZHIHU_STYLE.to_string())),
            command("RPG模式", "🤖️：已激活RPG模式", PersonaReplacement::Fixed(prompts::RPG_MODE.to_string())),
            command("-s", "🤖️：人格已写入", PersonaReplacement::Verbatim),
            command("清空人格", "🤖️：人格已清空", PersonaReplacement::Templated(prompts::NEUTRAL_PERSONA.to_string())),
        ];

        Self::new(commands, current_date)
    }

    /// The persona in effect before any command fires.
    pub fn default_persona(&self) -> String {
        render_template(prompts::CATGIRL_PERSONA, &self.current_date)
    }

    /// The first command, in priority order, whose trigger appears in `text`.
    pub fn find(&self, text: &str) -> Option<&PersonaCommand> {
        self.commands.iter().find(|command| text.contains(command.trigger.as_str()))
    }

    /// Compute the persona `command` installs for the message `text`.
    pub fn resolve(&self, command: &PersonaCommand, text: &str) -> String {
        match &command.replacement {
            PersonaReplacement::Fixed(persona) => persona.clone(),
            PersonaReplacement::Verbatim => text.to_string(),
            PersonaReplacement::Templated(template) => render_template(template, &self.current_date),
        }
    }
}

// Tests.
