use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::html;

use crate::config::ReplyStyle;
use crate::update::Sender;

/// How Telegram should render the reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formatting {
    #[default]
    Plain,
    Markdown,
    Html,
}

impl Formatting {
    /// Wire `parse_mode`, `None` for plain text.
    ///
    /// The rich texts are written for Telegram's legacy Markdown dialect,
    /// MarkdownV2 would reject their unescaped punctuation.
    #[allow(deprecated)]
    pub fn parse_mode(self) -> Option<ParseMode> {
        match self {
            Formatting::Plain => None,
            Formatting::Markdown => Some(ParseMode::Markdown),
            Formatting::Html => Some(ParseMode::Html),
        }
    }
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    /// Opens an external URL
    Link { label: String, url: String },
    /// Sends a callback query carrying `data` back to the bot
    Callback { label: String, data: String },
}

impl Button {
    pub fn link(label: &str, url: &str) -> Self {
        Button::Link {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    pub fn callback(label: &str, data: &str) -> Self {
        Button::Callback {
            label: label.to_string(),
            data: data.to_string(),
        }
    }
}

/// A message the bot is about to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub chat_id: ChatId,
    pub text: String,
    /// Keyboard rows, top to bottom
    pub buttons: Option<Vec<Vec<Button>>>,
    pub formatting: Formatting,
}

impl OutboundReply {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            buttons: None,
            formatting: Formatting::Plain,
        }
    }

    pub fn formatted(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn with_buttons(mut self, rows: Vec<Vec<Button>>) -> Self {
        self.buttons = Some(rows);
        self
    }
}

/// What a reply builder gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct ReplyContext<'a> {
    pub chat_id: ChatId,
    pub text: &'a str,
    pub sender: Option<&'a Sender>,
}

impl<'a> ReplyContext<'a> {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            text: "",
            sender: None,
        }
    }
}

/// Callback payload of the "More Info" button.
pub const MORE_INFO: &str = "more_info";
/// Callback payload of the button that only shows a filler message.
pub const NO_ACTION: &str = "no_action";

pub const ECHO_PREFIX: &str = "You said: ";

const RICH_WELCOME: &str = "🏢 **ZeroCodeStudios** 🏢\n\
━━━━━━━━━━━━━━━━━━━━━\n\n\
👨‍💻 **Founder - Deyo** 👨‍💻\n\n\
👨‍💼 **Founder - Xynx** 👨‍💼\n\n\
━━━━━━━━━━━━━━━━━━━━━";

const RICH_HELP: &str = "😎 **Yo, Chill Brat!** 😎\n\n\
🚀 There's a **LOT** more to come! 🚀\n\n\
✨ **Stay tuned for:**\n\
▪️ Amazing features\n\
▪️ Cool updates\n\
▪️ Epic surprises\n\n\
🎯 **Available Commands:**\n\
▪️ /start - Show main menu\n\
▪️ /help - Show this message\n\n\
💫 **Keep exploring! The best is yet to come!** 💫";

const RICH_MORE_INFO: &str = "📋 **Available Commands:**\n\n\
▪️ /start - Show main menu with links\n\
▪️ /help - Show this help message\n\n\
💡 Use these commands to navigate the bot!";

const RICH_NO_ACTION: &str = "🌍 Xynx's world is amazing! Stay tuned for more updates!";

const PLAIN_COMMANDS: &str = "Available commands:\n\
/start - Show this welcome message\n\
/help - Get help information\n\
/ping - Check if bot is alive";

const PLAIN_HELP: &str = "I'm a Telegram bot answering through a webhook!\n\n\
Commands available:\n\
/start - Welcome message\n\
/help - This help message\n\
/ping - Check bot status";

const PLAIN_PING: &str = "🏓 Pong! Bot is alive and answering through its webhook!";

const PLAIN_NO_ACTION: &str = "Nothing to do here, stay tuned for more updates!";

/// Fixed reply content for one [`ReplyStyle`].
#[derive(Debug, Clone)]
pub struct ReplyCatalog {
    style: ReplyStyle,
}

impl ReplyCatalog {
    pub fn new(style: ReplyStyle) -> Self {
        Self { style }
    }

    pub fn welcome(&self, ctx: &ReplyContext<'_>) -> OutboundReply {
        match self.style {
            ReplyStyle::Rich => OutboundReply::new(ctx.chat_id, RICH_WELCOME)
                .formatted(Formatting::Markdown)
                .with_buttons(main_menu()),
            ReplyStyle::Plain => {
                let greeting = match ctx.sender {
                    Some(sender) => format!("Hello {}!", mention_html(sender)),
                    None => "Hello there!".to_string(),
                };
                let text = format!(
                    "{greeting} I'm your Telegram bot, answering through a webhook! 🚀\n\n{PLAIN_COMMANDS}"
                );
                OutboundReply::new(ctx.chat_id, text).formatted(Formatting::Html)
            }
        }
    }

    pub fn help(&self, ctx: &ReplyContext<'_>) -> OutboundReply {
        match self.style {
            ReplyStyle::Rich => {
                OutboundReply::new(ctx.chat_id, RICH_HELP).formatted(Formatting::Markdown)
            }
            ReplyStyle::Plain => OutboundReply::new(ctx.chat_id, PLAIN_HELP),
        }
    }

    pub fn pong(&self, ctx: &ReplyContext<'_>) -> OutboundReply {
        match self.style {
            ReplyStyle::Rich => OutboundReply::new(ctx.chat_id, "🏓 Pong!"),
            ReplyStyle::Plain => OutboundReply::new(ctx.chat_id, PLAIN_PING),
        }
    }

    pub fn command_list(&self, ctx: &ReplyContext<'_>) -> OutboundReply {
        match self.style {
            ReplyStyle::Rich => {
                OutboundReply::new(ctx.chat_id, RICH_MORE_INFO).formatted(Formatting::Markdown)
            }
            ReplyStyle::Plain => OutboundReply::new(ctx.chat_id, PLAIN_COMMANDS),
        }
    }

    pub fn filler(&self, ctx: &ReplyContext<'_>) -> OutboundReply {
        match self.style {
            ReplyStyle::Rich => OutboundReply::new(ctx.chat_id, RICH_NO_ACTION),
            ReplyStyle::Plain => OutboundReply::new(ctx.chat_id, PLAIN_NO_ACTION),
        }
    }

    /// Same in every style: the text comes back untouched.
    pub fn echo(&self, ctx: &ReplyContext<'_>) -> OutboundReply {
        OutboundReply::new(ctx.chat_id, format!("{ECHO_PREFIX}{}", ctx.text))
    }
}

/// Keyboard attached to the rich welcome message, one button per row.
fn main_menu() -> Vec<Vec<Button>> {
    vec![
        vec![Button::link(
            "🚀 Join Our Channel 🚀",
            "https://t.me/zerocodestudios",
        )],
        vec![Button::link("🌐 Deyo's Website 🌐", "https://deyo.lol/")],
        vec![Button::callback("🌐 Xynx's World 🌐", NO_ACTION)],
        vec![Button::callback("💫 More Info 💫", MORE_INFO)],
    ]
}

fn mention_html(sender: &Sender) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        sender.id,
        html::escape(&sender.full_name())
    )
}
