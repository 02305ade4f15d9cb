//! Channel API seam for the Discord publisher.
//!
//! The publisher only needs four operations (who am I, list recent
//! messages, delete, send), so they live behind a trait and the twilight
//! client stays at the edge. Tests drive the publisher against an in-memory
//! implementation.

use async_trait::async_trait;
use chrono::Utc;
use twilight_http::Client as TwilightClient;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};
use twilight_model::id::Id;
use twilight_model::util::Timestamp;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};

use squadwatch_common::models::{ChannelMessage, StatusEmbed};

use crate::Error;

#[async_trait]
pub trait ChannelApi: Send + Sync {
    /// The bot's own user id; also serves as the login/connectivity check.
    async fn current_user_id(&self) -> Result<u64, Error>;

    /// Most recent messages in the channel, newest first.
    async fn recent_messages(&self, limit: u16) -> Result<Vec<ChannelMessage>, Error>;

    async fn delete_message(&self, message_id: u64) -> Result<(), Error>;

    /// Sends one rendered status embed, returning the new message id.
    async fn send_status_embed(&self, embed: &StatusEmbed) -> Result<u64, Error>;
}

pub struct TwilightChannelApi {
    http: TwilightClient,
    channel_id: Id<ChannelMarker>,
}

impl TwilightChannelApi {
    pub fn new(token: String, channel_id: u64) -> Self {
        Self {
            http: TwilightClient::new(token),
            channel_id: Id::new(channel_id),
        }
    }
}

#[async_trait]
impl ChannelApi for TwilightChannelApi {
    async fn current_user_id(&self) -> Result<u64, Error> {
        let user = self
            .http
            .current_user()
            .await
            .map_err(|e| map_api_error("fetch current user", e))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("parse current user => {e}")))?;
        Ok(user.id.get())
    }

    async fn recent_messages(&self, limit: u16) -> Result<Vec<ChannelMessage>, Error> {
        let messages = self
            .http
            .channel_messages(self.channel_id)
            .limit(limit)
            .await
            .map_err(|e| map_api_error("fetch channel messages", e))?
            .models()
            .await
            .map_err(|e| Error::Platform(format!("parse channel messages => {e}")))?;

        Ok(messages
            .into_iter()
            .map(|msg| ChannelMessage {
                id: msg.id.get(),
                author_id: msg.author.id.get(),
                has_embeds: !msg.embeds.is_empty(),
            })
            .collect())
    }

    async fn delete_message(&self, message_id: u64) -> Result<(), Error> {
        self.http
            .delete_message(self.channel_id, Id::<MessageMarker>::new(message_id))
            .await
            .map_err(|e| map_api_error("delete message", e))?;
        Ok(())
    }

    async fn send_status_embed(&self, embed: &StatusEmbed) -> Result<u64, Error> {
        let built = build_embed(embed)?;
        let message = self
            .http
            .create_message(self.channel_id)
            .embeds(&[built])
            .await
            .map_err(|e| map_api_error("send message", e))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("parse sent message => {e}")))?;
        Ok(message.id.get())
    }
}

fn build_embed(embed: &StatusEmbed) -> Result<twilight_model::channel::message::Embed, Error> {
    let timestamp = Timestamp::from_secs(Utc::now().timestamp())
        .map_err(|e| Error::Platform(format!("embed timestamp => {e}")))?;

    let mut builder = EmbedBuilder::new()
        .title(embed.title.as_str())
        .description(embed.description.as_str())
        .color(embed.color)
        .footer(EmbedFooterBuilder::new(embed.footer_text.as_str()))
        .timestamp(timestamp);

    if let Some(url) = &embed.url {
        builder = builder.url(url.as_str());
    }
    for field in &embed.fields {
        let mut fb = EmbedFieldBuilder::new(field.name.as_str(), field.value.as_str());
        if field.inline {
            fb = fb.inline();
        }
        builder = builder.field(fb);
    }
    Ok(builder.build())
}

/// Transport-level failures map to the transient error class so the retry
/// wrapper picks them up; everything else (auth, 4xx responses, parse
/// problems) propagates immediately.
fn map_api_error(context: &str, e: twilight_http::Error) -> Error {
    use twilight_http::error::ErrorType;
    match e.kind() {
        ErrorType::RequestTimedOut
        | ErrorType::RequestCanceled
        | ErrorType::RequestError
        | ErrorType::ServiceUnavailable { .. } => Error::Transport(format!("{context} => {e}")),
        _ => Error::Platform(format!("{context} => {e}")),
    }
}
