//! Inbound message sanitization.
//!
//! Applied to agent-originated text before it enters another conversation's
//! history. Guarantee: non-empty, non-whitespace input always yields
//! non-empty output.

/// Maximum sanitized message length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 32_768;

/// Sanitizes message text for delivery.
///
/// Strips control characters (keeping newlines and tabs), trims surrounding
/// whitespace and caps the length at [`MAX_MESSAGE_CHARS`] characters.
///
/// # Returns
///
/// `None` if nothing remains after sanitization.
pub fn sanitize_message_text(text: &str) -> Option<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_MESSAGE_CHARS)
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
