//! Event handling and user interactions for persona-relay.
//!
//! This module holds the message router and the rules it applies:
//! - Eligibility filtering of inbound messages
//! - Trigger matching and text cleaning for private and group chats
//! - Persona commands and the shared persona state
//! - Relaying to the completion service and chunked reply delivery

pub mod chat_event;
pub mod filter;
pub mod persona;
pub mod relay;
pub mod reply;
pub mod trigger;
