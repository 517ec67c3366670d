//! Splitting long replies and delivering them in order.

use tracing::{debug, instrument};

use crate::{base::types::Void, service::chat::ChatClient};

/// Split `text` into consecutive chunks of at most `max_size` characters.
///
/// Always yields at least one chunk, and the chunks concatenate back to `text`.
pub fn split_reply(text: &str, max_size: usize) -> Vec<String> {
    let max_size = max_size.max(1);

    let mut chunks = Vec::new();
    let mut remaining = text;

    while let Some((split_at, _)) = remaining.char_indices().nth(max_size) {
        chunks.push(remaining[..split_at].to_string());
        remaining = &remaining[split_at..];
    }

    chunks.push(remaining.to_string());

    chunks
}

/// Deliver `text` to `conversation_id`, one chunk at a time.
///
/// Each chunk is awaited before the next is sent, so chunks arrive in order.
#[instrument(skip(chat, text))]
pub async fn dispatch_reply(chat: &ChatClient, conversation_id: &str, text: &str, max_size: usize) -> Void {
    let chunks = split_reply(text, max_size);

    debug!("Sending reply in {} chunks", chunks.len());

    for chunk in &chunks {
        chat.send_message(conversation_id, chunk).await?;
    }

    Ok(())
}

// Tests.
