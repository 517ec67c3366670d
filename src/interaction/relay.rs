//! Completion relay: persona plus user text in, reply text out.

use tracing::{error, info, instrument};

use crate::{
    base::types::{ChatTurn, CompletionError, ModelConfig},
    service::llm::LlmClient,
};

/// Sends user text to the completion service under the current persona.
///
/// The relay never fails: any completion error is logged and replaced with the
/// configured fallback message.
#[derive(Clone)]
pub struct CompletionRelay {
    llm: LlmClient,
    model: ModelConfig,
    fallback: String,
}

impl CompletionRelay {
    pub fn new(llm: LlmClient, model: ModelConfig, fallback: impl Into<String>) -> Self {
        Self {
            llm,
            model,
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Build the two-turn request for `text` under `persona`.
    pub fn build_turns(persona: &str, text: &str) -> Vec<ChatTurn> {
        vec![ChatTurn::system(persona), ChatTurn::user(text)]
    }

    /// Get a reply for `text`, or the fallback message if the completion fails.
    #[instrument(skip_all)]
    pub async fn relay(&self, persona: &str, text: &str) -> String {
        let turns = Self::build_turns(persona, text);

        match self.llm.complete(&self.model, &turns).await {
            Ok(reply) => {
                let reply = reply.trim().to_string();
                info!("Assistant says: {}", reply);
                reply
            }
            Err(err) => {
                log_completion_error(&err);
                self.fallback.clone()
            }
        }
    }
}

/// Log whichever failure details the provider reported.
fn log_completion_error(err: &CompletionError) {
    error!("{}", err);

    if let (Some(code), Some(status)) = (err.status_code, &err.status_text) {
        error!("Code {}: {}", code, status);
    } else if let Some(status) = &err.status_text {
        error!("Status: {}", status);
    }
}

// Tests.
