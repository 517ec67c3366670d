//! Core components, types, and utilities for persona-relay.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Persona prompts and canned replies.
//! - Common types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
