//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::{prompts, types::ModelConfig};

use super::types::Res;

/// Default OpenAI model to use.
fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// Default sampling temperature.
fn default_openai_temperature() -> f32 {
    0.8
}

/// Default deadline for a single completion call, in seconds.
fn default_openai_timeout_secs() -> u64 {
    120
}

/// Default size of a single outbound message, in characters.
fn default_single_message_max_size() -> usize {
    500
}

/// Default reserved system-account names whose messages are never relayed.
fn default_reserved_sender_names() -> Vec<String> {
    vec!["微信团队".to_string(), "USLACKBOT".to_string()]
}

/// Default platform notices that carry no user content.
fn default_ignored_notices() -> Vec<String> {
    vec![
        // Video or voice call.
        "收到一条视频/语音聊天消息，请在手机上查看".to_string(),
        // Red envelope.
        "收到红包，请在手机上查看".to_string(),
        // Location.
        "/cgi-bin/mmwebwx-bin/webwxgetpubliclinkimg".to_string(),
    ]
}

/// Default reply when the completion service fails.
fn default_error_message() -> String {
    prompts::DEFAULT_ERROR_MESSAGE.to_string()
}

/// Configuration for the persona-relay application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// OpenAI organization ID (`OPENAI_ORGANIZATION_ID`).
    #[serde(default)]
    pub openai_organization_id: Option<String>,
    /// OpenAI model to use (`OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Sampling temperature (`OPENAI_TEMPERATURE`).
    /// Value between 0 and 2. Higher values like 0.8 make output more random,
    /// while lower values like 0.2 make it more focused and deterministic.
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,
    /// Max output tokens (`OPENAI_MAX_TOKENS`). Left to the provider when unset.
    #[serde(default)]
    pub openai_max_tokens: Option<u32>,
    /// Deadline for a single completion call in seconds (`OPENAI_TIMEOUT_SECS`).
    #[serde(default = "default_openai_timeout_secs")]
    pub openai_timeout_secs: u64,
    /// Display name of the bot, used to recognize @-mentions (`BOT_NAME`).
    pub bot_name: String,
    /// Ignore messages sent by the bot account itself (`DISABLE_SELF_CHAT`).
    #[serde(default)]
    pub disable_self_chat: bool,
    /// Keyword that activates the relay (`TRIGGER_KEYWORD`). May be empty.
    #[serde(default)]
    pub trigger_keyword: String,
    /// Maximum characters per outbound message (`SINGLE_MESSAGE_MAX_SIZE`).
    #[serde(default = "default_single_message_max_size")]
    pub single_message_max_size: usize,
    /// Sender names that are platform service accounts (`RESERVED_SENDER_NAMES`, comma-separated).
    #[serde(default = "default_reserved_sender_names")]
    pub reserved_sender_names: Vec<String>,
    /// Notices that carry no user content (`IGNORED_NOTICES`, comma-separated).
    #[serde(default = "default_ignored_notices")]
    pub ignored_notices: Vec<String>,
    /// Reply sent when the completion service fails (`ERROR_MESSAGE`).
    #[serde(default = "default_error_message")]
    pub error_message: String,
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
}

impl ConfigInner {
    /// The model parameters sent with every completion request.
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model: self.openai_model.clone(),
            temperature: self.openai_temperature,
            max_tokens: self.openai_max_tokens,
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let env = config::Environment::default()
            .prefix("PERSONA_RELAY")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("reserved_sender_names")
            .with_list_parse_key("ignored_notices");

        let mut cfg = config::Config::builder().add_source(env);

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check value ranges that `serde` cannot express.
    pub fn validate(&self) -> Res<()> {
        if self.openai_temperature < 0.0 || self.openai_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI temperature must be between 0 and 2."));
        }

        if let Some(max_tokens) = self.openai_max_tokens
            && !(1..=128000).contains(&max_tokens)
        {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        if self.openai_timeout_secs < 1 {
            return Err(anyhow::anyhow!("OpenAI timeout must be at least 1 second."));
        }

        if self.single_message_max_size < 1 {
            return Err(anyhow::anyhow!("Single message max size must be at least 1."));
        }

        Ok(())
    }
}

// Tests.
