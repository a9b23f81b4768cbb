use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, ChatId, InlineKeyboardMarkup, MessageId, Recipient, ReplyParameters,
};

use crate::platform::{CallbackInvocation, CommandInvocation, MessageRef, Messenger};
use crate::posts::OutboundMessage;

#[async_trait]
impl Messenger for Bot {
    async fn send(
        &self,
        to: Recipient,
        message: &OutboundMessage,
        reply_to: Option<MessageId>,
    ) -> Result<()> {
        let mut req = self.send_message(to, message.text.clone());
        if let Some(mode) = message.parse_mode {
            req = req.parse_mode(mode);
        }
        if let Some(keyboard) = &message.keyboard {
            req = req.reply_markup(keyboard.clone());
        }
        if let Some(id) = reply_to {
            req = req.reply_parameters(ReplyParameters::new(id));
        }
        req.await?;
        Ok(())
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut req = self.edit_message_text(chat_id, message_id, text);
        if let Some(keyboard) = keyboard {
            req = req.reply_markup(keyboard);
        }
        req.await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: CallbackQueryId) -> Result<()> {
        self.answer_callback_query(query_id).await?;
        Ok(())
    }
}

/// Returns `None` for messages without a sender (e.g. anonymous channel posts).
pub fn command_invocation(msg: &Message) -> Option<CommandInvocation> {
    let user = msg.from.as_ref()?;
    Some(CommandInvocation {
        user_id: user.id,
        chat_id: msg.chat.id,
        message_id: msg.id,
    })
}

pub fn callback_invocation(q: &CallbackQuery) -> CallbackInvocation {
    let message = q
        .message
        .as_ref()
        .and_then(|m| m.regular_message())
        .map(|m| MessageRef {
            chat_id: m.chat.id,
            message_id: m.id,
            text: m.text().map(str::to_string),
            keyboard: m.reply_markup().cloned(),
        });

    CallbackInvocation {
        query_id: q.id.clone(),
        user_id: q.from.id,
        data: q.data.clone(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::{InlineKeyboardButton, UserId};

    fn refresh_query(message: serde_json::Value) -> CallbackQuery {
        serde_json::from_value(serde_json::json!({
            "id": "4382bfdwdsb323b2d9",
            "from": { "id": 42, "is_bot": false, "first_name": "Ann" },
            "chat_instance": "-1234",
            "data": "refresh",
            "message": message,
        }))
        .unwrap()
    }

    #[test]
    fn test_callback_invocation_from_real_query() {
        let q = refresh_query(serde_json::json!({
            "message_id": 77,
            "date": 1700000000,
            "chat": { "id": 42, "type": "private", "first_name": "Ann" },
            "from": { "id": 1000, "is_bot": true, "first_name": "Poster" },
            "text": "Hello",
            "reply_markup": {
                "inline_keyboard": [[{ "text": "🔄 Refresh Post", "callback_data": "refresh" }]]
            }
        }));

        let invocation = callback_invocation(&q);

        assert_eq!(
            invocation.query_id,
            CallbackQueryId("4382bfdwdsb323b2d9".to_string())
        );
        assert_eq!(invocation.user_id, UserId(42));
        assert_eq!(invocation.data.as_deref(), Some("refresh"));
        assert_eq!(
            invocation.message,
            Some(MessageRef {
                chat_id: ChatId(42),
                message_id: MessageId(77),
                text: Some("Hello".to_string()),
                keyboard: Some(InlineKeyboardMarkup::new(vec![vec![
                    InlineKeyboardButton::callback("🔄 Refresh Post", "refresh"),
                ]])),
            })
        );
    }

    #[test]
    fn test_callback_on_inaccessible_message_has_no_ref() {
        let q = refresh_query(serde_json::json!({
            "message_id": 77,
            "date": 0,
            "chat": { "id": 42, "type": "private", "first_name": "Ann" },
        }));

        let invocation = callback_invocation(&q);

        assert_eq!(invocation.message, None);
        assert_eq!(
            invocation.query_id,
            CallbackQueryId("4382bfdwdsb323b2d9".to_string())
        );
    }

    #[test]
    fn test_command_invocation_from_real_message() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "message_id": 10,
            "date": 1700000000,
            "chat": { "id": 7, "type": "private", "first_name": "Bob" },
            "from": { "id": 7, "is_bot": false, "first_name": "Bob" },
            "text": "/post",
            "entities": [{ "type": "bot_command", "offset": 0, "length": 5 }]
        }))
        .unwrap();

        let invocation = command_invocation(&msg).unwrap();

        assert_eq!(invocation.user_id, UserId(7));
        assert_eq!(invocation.chat_id, ChatId(7));
        assert_eq!(invocation.message_id, MessageId(10));
    }
}
