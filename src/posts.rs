use anyhow::{Context, Result};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, UserId};
use teloxide::utils::html;
use url::Url;

use crate::handlers::CallbackAction;

pub const REFRESH_SUFFIX: &str = "\n\n🔄 Last refreshed: Just now";

pub const NOT_AUTHORIZED: &str = "❌ You are not authorized to use this command.";
pub const SENDING: &str = "📤 Sending new post to channel...";
pub const PUBLISHED: &str = "✅ New post published successfully!";
pub const MARKED_READ: &str = "✅ Marked as read! (This appears in private chat)";
pub const CHANNEL_STATS: &str = "📈 Channel stats: 1,000 members | 50 online";

/// A message about to be sent. Built per send, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            keyboard: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            parse_mode: Some(ParseMode::Html),
            ..Self::plain(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

fn link(label: &str, href: &str) -> Result<InlineKeyboardButton> {
    let url = Url::parse(href).with_context(|| format!("Invalid button URL: {}", href))?;
    Ok(InlineKeyboardButton::url(label, url))
}

fn trigger(label: &str, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.as_str())
}

/// Posted once to the channel when the bot starts.
pub fn welcome_post() -> Result<OutboundMessage> {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            link("🌐 Official Website", "https://example.com")?,
            link("📚 Documentation", "https://example.com/docs")?,
        ],
        vec![
            link("📢 Join Announcements", "https://t.me/joinchat/EXAMPLE")?,
            link("👥 Community Chat", "https://t.me/joinchat/EXAMPLE2")?,
        ],
        vec![
            trigger("✅ Mark as Read", CallbackAction::MarkRead),
            trigger("📊 View Stats", CallbackAction::ViewStats),
        ],
        vec![trigger("🔄 Refresh Post", CallbackAction::Refresh)],
    ]);

    Ok(OutboundMessage::html(
        "🚀 <b>Welcome to Our Channel!</b> 🚀\n\n\
         This is an automated post from our custom bot.\n\
         Use the buttons below to interact!",
    )
    .with_keyboard(keyboard))
}

/// Posted to the channel by `/post`.
pub fn announcement_post() -> Result<OutboundMessage> {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            link("📥 Download Update", "https://example.com/download")?,
            link("📖 Read Changelog", "https://example.com/changelog")?,
        ],
        vec![
            trigger("👍 Got It", CallbackAction::Acknowledge),
            link("❓ Need Help", "https://t.me/support_bot")?,
        ],
    ]);

    Ok(OutboundMessage::html(
        "📢 <b>New Announcement!</b>\n\n\
         Important updates from the team:\n\
         • New feature released\n\
         • Bug fixes applied\n\
         • Upcoming events",
    )
    .with_keyboard(keyboard))
}

/// Reply to `/start` and `/help`.
pub fn status_message(user: UserId, is_admin: bool, channel: &str) -> OutboundMessage {
    let badge = if is_admin { "✅" } else { "❌" };
    OutboundMessage::html(format!(
        "🤖 <b>Channel Poster Bot</b>\n\n\
         Admin Status: {badge}\n\
         Your ID: <code>{user}</code>\n\n\
         <b>Commands:</b>\n\
         /post - Send new post to channel\n\
         /help - Show this message\n\n\
         Channel: {channel}",
        badge = badge,
        user = user.0,
        channel = html::escape(channel),
    ))
}

pub fn publish_failed(error: &anyhow::Error) -> OutboundMessage {
    OutboundMessage::plain(format!("❌ Failed: {}", error))
}
