pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{CallbackQueryId, ChatId, InlineKeyboardMarkup, MessageId, Recipient, UserId};

use crate::posts::OutboundMessage;

/// A command typed by a user, stripped down to what the handlers need
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The message a callback button was attached to
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: Option<String>,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

/// A button press on one of our posts
#[derive(Debug, Clone)]
pub struct CallbackInvocation {
    pub query_id: CallbackQueryId,
    pub user_id: UserId,
    pub data: Option<String>,
    /// `None` when the message is too old or otherwise inaccessible to the bot
    pub message: Option<MessageRef>,
}

/// The messaging primitives the bot relies on.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(
        &self,
        to: Recipient,
        message: &OutboundMessage,
        reply_to: Option<MessageId>,
    ) -> Result<()>;

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    async fn answer_callback(&self, query_id: CallbackQueryId) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Send {
            to: Recipient,
            message: OutboundMessage,
            reply_to: Option<MessageId>,
        },
        Edit {
            chat_id: ChatId,
            message_id: MessageId,
            text: String,
            keyboard: Option<InlineKeyboardMarkup>,
        },
        Answer(CallbackQueryId),
    }

    /// Records every call; sends to `failing` recipients return an error.
    #[derive(Default)]
    pub struct RecordingMessenger {
        pub calls: Mutex<Vec<Call>>,
        pub failing: Option<Recipient>,
    }

    impl RecordingMessenger {
        pub fn failing_for(to: Recipient) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: Some(to),
            }
        }

        pub async fn calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }

        pub async fn sends_to(&self, to: &Recipient) -> usize {
            self.calls
                .lock()
                .await
                .iter()
                .filter(|call| matches!(call, Call::Send { to: t, .. } if t == to))
                .count()
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send(
            &self,
            to: Recipient,
            message: &OutboundMessage,
            reply_to: Option<MessageId>,
        ) -> Result<()> {
            self.calls.lock().await.push(Call::Send {
                to: to.clone(),
                message: message.clone(),
                reply_to,
            });
            if self.failing.as_ref() == Some(&to) {
                anyhow::bail!("Bad Request: chat not found");
            }
            Ok(())
        }

        async fn edit_text(
            &self,
            chat_id: ChatId,
            message_id: MessageId,
            text: &str,
            keyboard: Option<InlineKeyboardMarkup>,
        ) -> Result<()> {
            self.calls.lock().await.push(Call::Edit {
                chat_id,
                message_id,
                text: text.to_string(),
                keyboard,
            });
            Ok(())
        }

        async fn answer_callback(&self, query_id: CallbackQueryId) -> Result<()> {
            self.calls
                .lock()
                .await
                .push(Call::Answer(query_id));
            Ok(())
        }
    }
}
