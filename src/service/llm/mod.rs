pub mod openai;

use crate::base::types::{ChatTurn, CompletionError, ModelConfig};
use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different LLM providers to be used with persona-relay.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Run one chat completion.
    ///
    /// `turns` is the ordered list of role-tagged messages; the text of the first
    /// returned choice is the result. Failures carry whatever status detail the
    /// provider reported.
    async fn complete(&self, model: &ModelConfig, turns: &[ChatTurn]) -> Result<String, CompletionError>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
