//! Trigger matching and text cleaning.
//!
//! Both operations depend on how many leading characters the trigger decoration
//! occupies, so both go through [`TriggerRule::prefix_len`]. Lengths are counted in
//! characters, never bytes, so multibyte names and keywords are handled whole.

use tracing::info;

use crate::base::prompts::QUOTE_SEPARATOR;

/// The bot name and keyword that together decide whether a message activates the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRule {
    bot_name: String,
    keyword: String,
}

impl TriggerRule {
    pub fn new(bot_name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            keyword: keyword.into(),
        }
    }

    /// The mention a group message must start with (`@<name>`).
    pub fn mention(&self) -> String {
        format!("@{}", self.bot_name)
    }

    /// The full decoration a group message starts with (`@<name> <keyword>`).
    pub fn group_prefix(&self) -> String {
        format!("@{} {}", self.bot_name, self.keyword)
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Number of characters of trigger decoration at the front of a triggering message.
    ///
    /// Group messages carry the mention, one separator character, then the keyword.
    pub fn prefix_len(&self, is_private: bool) -> usize {
        let keyword_len = self.keyword.chars().count();

        if is_private { keyword_len } else { self.mention_len() + keyword_len }
    }

    /// Characters occupied by the mention plus the one glyph that follows it.
    fn mention_len(&self) -> usize {
        self.bot_name.chars().count() + 2
    }

    /// Decide whether `text` activates the relay.
    pub fn matches(&self, text: &str, is_private: bool) -> bool {
        let triggered = if is_private {
            text.starts_with(&self.keyword)
        } else {
            // Clients disagree on the glyph after a mention, so skip exactly one
            // character past the mention and match the keyword from there.
            text.starts_with(&self.mention()) && skip_chars(text, self.mention_len()).starts_with(&self.keyword)
        };

        if triggered {
            info!("Relay triggered: {}", text);
        }

        triggered
    }

    /// Produce the text to forward to the completion service.
    ///
    /// Quoted content before the last quote separator is dropped, then the trigger
    /// decoration is stripped.
    pub fn clean(&self, raw: &str, is_private: bool) -> String {
        let text = raw.split(QUOTE_SEPARATOR).last().unwrap_or(raw);

        skip_chars(text, self.prefix_len(is_private)).to_string()
    }
}

/// The remainder of `text` after its first `count` characters.
fn skip_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((index, _)) => &text[index..],
        None => "",
    }
}

// Tests.
