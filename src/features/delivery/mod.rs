//! # Delivery Feature
//!
//! Outbound message transport. The reminder engine only needs "send this text
//! to that destination"; Discord is the production implementation.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Transport reachability check
//! - 1.0.0: Initial release

pub mod discord;

pub use discord::DiscordTransport;

use crate::core::error::TransportError;
use async_trait::async_trait;

/// Discord message content limit (bytes)
pub const MESSAGE_LIMIT: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Render markdown; when false the text is escaped first
    pub markdown: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self { markdown: true }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        destination: &str,
        text: &str,
        options: SendOptions,
    ) -> Result<(), TransportError>;

    /// Confirm the transport can reach its service
    async fn check(&self) -> Result<(), TransportError>;
}

/// Split text into pieces of at most `limit` bytes.
///
/// Breaks at line ends where possible and never inside a UTF-8 character.
pub fn split_for_delivery(text: &str, limit: usize) -> Vec<String> {
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let needed = if current.is_empty() { line.len() } else { line.len() + 1 };
        if current.len() + needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        if line.len() <= limit {
            current.push_str(line);
        } else {
            let mut chars = split_long_line(line, limit);
            current = chars.pop().unwrap_or_default();
            pieces.extend(chars);
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn split_long_line(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        if current.len() + ch.len_utf8() > limit && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
