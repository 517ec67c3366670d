//! Eligibility filtering for inbound messages.

use crate::base::{
    config::Config,
    types::{ContentType, MessageEvent},
};

/// Decides which inbound messages are never worth relaying.
#[derive(Debug, Clone, Default)]
pub struct EligibilityFilter {
    /// Ignore messages sent by the bot account itself.
    pub disable_self_chat: bool,
    /// Platform service accounts, matched against the sender's display name.
    pub reserved_sender_names: Vec<String>,
    /// Notices that carry no user content, matched by substring.
    pub ignored_notices: Vec<String>,
}

impl EligibilityFilter {
    pub fn from_config(config: &Config) -> Self {
        Self {
            disable_self_chat: config.disable_self_chat,
            reserved_sender_names: config.reserved_sender_names.clone(),
            ignored_notices: config.ignored_notices.clone(),
        }
    }

    /// Whether `event` should be dropped without further processing.
    pub fn should_ignore(&self, event: &MessageEvent) -> bool {
        (self.disable_self_chat && event.sender.is_self)
            || event.content_type != ContentType::Text
            || self.reserved_sender_names.iter().any(|name| *name == event.sender.name)
            || self.ignored_notices.iter().any(|notice| event.text.contains(notice.as_str()))
    }
}

// Tests.
