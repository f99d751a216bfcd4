use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use tracing::debug;

use crate::platform::MessagingApi;
use crate::replies::{Button, OutboundReply};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
}

/// Bot API client speaking JSON over HTTPS.
pub struct TelegramApi {
    client: Client,
    api_base: String,
}

impl TelegramApi {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
        }
    }

    fn url(&self, bot_token: &str, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            bot_token,
            method
        )
    }

    /// POST `payload` to `method` and hand back whatever JSON comes back,
    /// error statuses included: Telegram explains failures in the body.
    async fn call<T: Serialize>(&self, bot_token: &str, method: &str, payload: &T) -> Result<Value> {
        debug!("Calling Bot API method {}", method);

        let response = self
            .client
            .post(self.url(bot_token, method))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", method))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response ({})", method, status))?;

        debug!("Bot API {} answered {}", method, status);
        Ok(body)
    }
}

/// Build the inline keyboard Telegram expects from our button rows.
fn reply_markup(rows: &[Vec<Button>]) -> Result<InlineKeyboardMarkup> {
    let mut keyboard = Vec::with_capacity(rows.len());
    for row in rows {
        let mut buttons = Vec::with_capacity(row.len());
        for button in row {
            buttons.push(match button {
                Button::Link { label, url } => {
                    let url = Url::parse(url)
                        .with_context(|| format!("Invalid button URL: {}", url))?;
                    InlineKeyboardButton::url(label.clone(), url)
                }
                Button::Callback { label, data } => {
                    InlineKeyboardButton::callback(label.clone(), data.clone())
                }
            });
        }
        keyboard.push(buttons);
    }
    Ok(InlineKeyboardMarkup::new(keyboard))
}

#[async_trait]
impl MessagingApi for TelegramApi {
    async fn send_message(&self, bot_token: &str, reply: &OutboundReply) -> Result<Value> {
        let reply_markup = reply.buttons.as_deref().map(reply_markup).transpose()?;
        let request = SendMessageRequest {
            chat_id: reply.chat_id,
            text: &reply.text,
            parse_mode: reply.formatting.parse_mode(),
            reply_markup,
        };
        self.call(bot_token, "sendMessage", &request).await
    }

    async fn answer_callback_query(
        &self,
        bot_token: &str,
        callback_query_id: &str,
    ) -> Result<Value> {
        let request = AnswerCallbackQueryRequest { callback_query_id };
        self.call(bot_token, "answerCallbackQuery", &request).await
    }
}
