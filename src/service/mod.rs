//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services persona-relay talks to:
//! - Chat services (e.g., Slack)
//! - LLM services (e.g., OpenAI)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod llm;
