//! Discord channel transport over serenity's HTTP client
//!
//! Destinations are channel ids; threads are channels too, so a reminder can
//! target a forum/thread by its id.

use super::{split_for_delivery, SendOptions, Transport, MESSAGE_LIMIT};
use crate::core::error::TransportError;
use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use serenity::utils::MessageBuilder;
use std::sync::Arc;

#[derive(Clone)]
pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

pub fn parse_channel_id(destination: &str) -> Result<ChannelId, TransportError> {
    destination
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(ChannelId)
        .ok_or_else(|| TransportError::InvalidDestination(destination.to_string()))
}

#[async_trait]
impl Transport for DiscordTransport {
    async fn send(
        &self,
        destination: &str,
        text: &str,
        options: SendOptions,
    ) -> Result<(), TransportError> {
        let channel_id = parse_channel_id(destination)?;

        let body = if options.markdown {
            text.to_string()
        } else {
            MessageBuilder::new().push_safe(text).build()
        };

        let pieces = split_for_delivery(&body, MESSAGE_LIMIT);
        debug!("Sending {} piece(s) to channel {channel_id}", pieces.len());

        for piece in pieces {
            channel_id
                .say(&self.http, piece)
                .await
                .map_err(|e| TransportError::Delivery(e.to_string()))?;
        }
        Ok(())
    }

    async fn check(&self) -> Result<(), TransportError> {
        let user = self
            .http
            .get_current_user()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        debug!("Discord reachable as {}", user.name);
        Ok(())
    }
}
