//! Current-task extraction from session message history
//!
//! The dashboard shows the most recent meaningful line of conversation.
//! Messages shorter than three characters (acks, control tokens) are skipped.

use crate::data::{ContentBlock, Message, MessageContent, Session, EMPTY_TASK};
use crate::util::truncate_chars;

/// Longest task string shown on the dashboard, in characters
pub const MAX_TASK_CHARS: usize = 80;

/// Trimmed text must be longer than this to count
const MIN_TASK_CHARS: usize = 2;

/// Most recent qualifying message text, or `EMPTY_TASK`.
pub fn extract_task(session: &Session) -> String {
    session
        .messages
        .iter()
        .rev()
        .find_map(message_text)
        .map(|text| truncate_chars(text, MAX_TASK_CHARS).to_string())
        .unwrap_or_else(|| EMPTY_TASK.to_string())
}

/// First qualifying text in a single message.
fn message_text(message: &Message) -> Option<&str> {
    match &message.content {
        MessageContent::Text(text) => qualifying(text),
        MessageContent::Blocks(blocks) => blocks.iter().find_map(|block| match block {
            ContentBlock::Text { text } => qualifying(text),
            ContentBlock::Other => None,
        }),
        MessageContent::Other => None,
    }
}

fn qualifying(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (trimmed.chars().count() > MIN_TASK_CHARS).then_some(trimmed)
}
