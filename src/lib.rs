//! Library root for `persona-relay`.
//!
//! Persona-relay is a chat-triggered assistant relay designed to:
//! - Listen for messages in private and group chats
//! - Forward messages that carry the trigger keyword (or @-mention) to an LLM
//! - Switch the assistant's persona when a persona command is posted
//! - Reply in bounded-size chunks, in order
//!
//! The bot integrates with Slack for chat and OpenAI for completions. The
//! architecture is built around traits that allow different implementations
//! of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use anyhow::anyhow;
use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the persona-relay runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with LLM and chat clients
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting persona-relay ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().map_err(|_| anyhow!("Failed to install the crypto provider"))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
