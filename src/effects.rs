use anyhow::{Context, Result};
use teloxide::types::ChatId;
use tracing::{error, info};

use crate::handlers::Effect;
use crate::platform::Messenger;
use crate::posts::{self, OutboundMessage};

/// Apply effects in order. The first failed call is logged and ends the batch.
pub async fn execute<M: Messenger + ?Sized>(messenger: &M, effects: Vec<Effect>) {
    for effect in effects {
        if let Err(e) = apply(messenger, effect).await {
            error!("{:#}", e);
            return;
        }
    }
}

async fn apply<M: Messenger + ?Sized>(messenger: &M, effect: Effect) -> Result<()> {
    match effect {
        Effect::Reply {
            chat_id,
            reply_to,
            message,
        } => messenger
            .send(chat_id.into(), &message, Some(reply_to))
            .await
            .with_context(|| format!("Failed to reply in chat {}", chat_id.0)),
        Effect::SendPrivate { user_id, message } => messenger
            .send(ChatId::from(user_id).into(), &message, None)
            .await
            .with_context(|| format!("Failed to message user {}", user_id.0)),
        Effect::Publish {
            channel,
            message,
            report_to,
            reply_to,
        } => {
            let outcome = match messenger.send(channel.clone(), &message, None).await {
                Ok(()) => {
                    info!("Posted to channel: {:?}", channel);
                    OutboundMessage::plain(posts::PUBLISHED)
                }
                Err(e) => {
                    error!("Post command failed: {:#}", e);
                    posts::publish_failed(&e)
                }
            };
            messenger
                .send(report_to.into(), &outcome, Some(reply_to))
                .await
                .context("Failed to report publish outcome")
        }
        Effect::EditText {
            chat_id,
            message_id,
            text,
            keyboard,
        } => messenger
            .edit_text(chat_id, message_id, &text, keyboard)
            .await
            .with_context(|| {
                format!(
                    "Failed to edit message {} in chat {}",
                    message_id.0, chat_id.0
                )
            }),
        Effect::AnswerCallback { query_id } => messenger
            .answer_callback(query_id)
            .await
            .context("Failed to answer callback query"),
    }
}
