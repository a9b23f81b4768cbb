//! Decision logic for commands and button presses.
//!
//! Every handler turns an incoming event plus the configuration into a list of
//! [`Effect`]s. Nothing here talks to Telegram; see [`crate::effects`] for that.

use anyhow::Result;
use teloxide::types::{CallbackQueryId, ChatId, InlineKeyboardMarkup, MessageId, Recipient, UserId};
use teloxide::utils::command::BotCommands;

use crate::config::Config;
use crate::platform::{CallbackInvocation, CommandInvocation};
use crate::posts::{self, OutboundMessage};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "show your admin status and the target channel.")]
    Start,
    #[command(description = "send a new post to the channel.")]
    Post,
    #[command(description = "show this message.")]
    Help,
}

/// Identifiers carried by the callback buttons on our posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    MarkRead,
    ViewStats,
    Refresh,
    /// "Got It" on the announcement post. Nothing handles it.
    Acknowledge,
    Unknown(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data {
            "mark_read" => Self::MarkRead,
            "view_stats" => Self::ViewStats,
            "refresh" => Self::Refresh,
            "acknowledge" => Self::Acknowledge,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::MarkRead => "mark_read",
            Self::ViewStats => "view_stats",
            Self::Refresh => "refresh",
            Self::Acknowledge => "acknowledge",
            Self::Unknown(data) => data,
        }
    }
}

/// An API call a handler wants made.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Reply in the chat the command came from, threaded to the command message.
    Reply {
        chat_id: ChatId,
        reply_to: MessageId,
        message: OutboundMessage,
    },
    /// Message the user directly.
    SendPrivate {
        user_id: UserId,
        message: OutboundMessage,
    },
    /// Send to the channel, then report the outcome back to the requester.
    Publish {
        channel: Recipient,
        message: OutboundMessage,
        report_to: ChatId,
        reply_to: MessageId,
    },
    EditText {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    AnswerCallback {
        query_id: CallbackQueryId,
    },
}

pub fn command_effects(
    command: &Command,
    invocation: &CommandInvocation,
    config: &Config,
) -> Result<Vec<Effect>> {
    let reply = |message: OutboundMessage| Effect::Reply {
        chat_id: invocation.chat_id,
        reply_to: invocation.message_id,
        message,
    };

    let effects = match command {
        Command::Start | Command::Help => {
            let is_admin = config.admins().contains(invocation.user_id);
            vec![reply(posts::status_message(
                invocation.user_id,
                is_admin,
                &config.telegram.channel_id,
            ))]
        }
        Command::Post => {
            if !config.admins().permits(invocation.user_id) {
                return Ok(vec![reply(OutboundMessage::plain(posts::NOT_AUTHORIZED))]);
            }
            vec![
                reply(OutboundMessage::plain(posts::SENDING)),
                Effect::Publish {
                    channel: config.channel(),
                    message: posts::announcement_post()?,
                    report_to: invocation.chat_id,
                    reply_to: invocation.message_id,
                },
            ]
        }
    };

    Ok(effects)
}

pub fn callback_effects(invocation: &CallbackInvocation) -> Vec<Effect> {
    let mut effects = vec![Effect::AnswerCallback {
        query_id: invocation.query_id.clone(),
    }];

    let action = match invocation.data.as_deref() {
        Some(data) => CallbackAction::parse(data),
        None => return effects,
    };

    let private = |text: &str| Effect::SendPrivate {
        user_id: invocation.user_id,
        message: OutboundMessage::plain(text),
    };

    match action {
        CallbackAction::MarkRead => effects.push(private(posts::MARKED_READ)),
        CallbackAction::ViewStats => effects.push(private(posts::CHANNEL_STATS)),
        CallbackAction::Refresh => {
            let original = invocation
                .message
                .as_ref()
                .and_then(|m| m.text.as_deref().map(|text| (m, text)));
            if let Some((message, text)) = original {
                effects.push(Effect::EditText {
                    chat_id: message.chat_id,
                    message_id: message.message_id,
                    text: format!("{}{}", text, posts::REFRESH_SUFFIX),
                    keyboard: message.keyboard.clone(),
                });
            }
        }
        CallbackAction::Acknowledge | CallbackAction::Unknown(_) => {}
    }

    effects
}
