use std::collections::HashMap;

use anyhow::Result;
use serde_json::{json, Value};
use tracing::info;

use crate::config::ReplyStyle;
use crate::platform::MessagingApi;
use crate::replies::{OutboundReply, ReplyCatalog, ReplyContext, MORE_INFO, NO_ACTION};
use crate::update::IncomingUpdate;

/// Builds the reply for one command or callback.
pub type ReplyBuilder = fn(&ReplyCatalog, &ReplyContext<'_>) -> OutboundReply;

/// What to do in answer to an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SendMessage(OutboundReply),
    /// Stop the button's loading spinner, nothing else
    AcknowledgeOnly(String),
    AcknowledgeThenSend(String, OutboundReply),
    NoOp,
}

/// Command prefixes and callback payloads mapped to reply builders.
pub struct CommandTable {
    /// Checked in order, first prefix match wins
    commands: Vec<(&'static str, ReplyBuilder)>,
    callbacks: HashMap<&'static str, ReplyBuilder>,
    fallback: ReplyBuilder,
}

impl CommandTable {
    pub fn new(fallback: ReplyBuilder) -> Self {
        Self {
            commands: Vec::new(),
            callbacks: HashMap::new(),
            fallback,
        }
    }

    /// The bot's built-in commands and buttons.
    pub fn standard() -> Self {
        let mut table = Self::new(ReplyCatalog::echo);
        table.command("/start", ReplyCatalog::welcome);
        table.command("/help", ReplyCatalog::help);
        table.command("/ping", ReplyCatalog::pong);
        table.callback(MORE_INFO, ReplyCatalog::command_list);
        table.callback(NO_ACTION, ReplyCatalog::filler);
        table
    }

    pub fn command(&mut self, prefix: &'static str, builder: ReplyBuilder) {
        self.commands.push((prefix, builder));
    }

    pub fn callback(&mut self, data: &'static str, builder: ReplyBuilder) {
        self.callbacks.insert(data, builder);
    }

    /// Builder for a message text. Matching is case-sensitive and anchored at
    /// the first character, so `/start now` matches and ` /start` does not.
    pub fn for_text(&self, text: &str) -> ReplyBuilder {
        self.commands
            .iter()
            .find(|(prefix, _)| text.starts_with(*prefix))
            .map(|(_, builder)| *builder)
            .unwrap_or(self.fallback)
    }

    pub fn for_callback(&self, data: &str) -> Option<ReplyBuilder> {
        self.callbacks.get(data).copied()
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|(prefix, _)| *prefix).collect()
    }
}

/// Turns updates into actions and carries them out against a [`MessagingApi`].
pub struct Dispatcher {
    table: CommandTable,
    catalog: ReplyCatalog,
}

impl Dispatcher {
    pub fn new(table: CommandTable, catalog: ReplyCatalog) -> Self {
        Self { table, catalog }
    }

    pub fn with_style(style: ReplyStyle) -> Self {
        Self::new(CommandTable::standard(), ReplyCatalog::new(style))
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn dispatch(&self, update: &IncomingUpdate) -> Action {
        match update {
            IncomingUpdate::Unrecognized => Action::NoOp,
            IncomingUpdate::CallbackQuery {
                id,
                chat_id: None,
                ..
            } => Action::AcknowledgeOnly(id.clone()),
            IncomingUpdate::CallbackQuery {
                id,
                chat_id: Some(chat_id),
                data,
            } => match self.table.for_callback(data) {
                Some(build) => {
                    let reply = build(&self.catalog, &ReplyContext::new(*chat_id));
                    Action::AcknowledgeThenSend(id.clone(), reply)
                }
                None => Action::AcknowledgeOnly(id.clone()),
            },
            IncomingUpdate::Message {
                chat_id,
                text,
                sender,
            } => {
                let ctx = ReplyContext {
                    chat_id: *chat_id,
                    text,
                    sender: sender.as_ref(),
                };
                let build = self.table.for_text(text);
                Action::SendMessage(build(&self.catalog, &ctx))
            }
        }
    }

    /// Perform `action`, returning the JSON to answer the webhook call with.
    ///
    /// The acknowledgment always goes out before the message. Its result is
    /// not inspected; the send result is returned as the API gave it.
    pub async fn execute(
        &self,
        api: &dyn MessagingApi,
        bot_token: &str,
        action: &Action,
    ) -> Result<Value> {
        match action {
            Action::NoOp => Ok(json!({ "ok": true })),
            Action::AcknowledgeOnly(id) => {
                api.answer_callback_query(bot_token, id).await?;
                Ok(json!({ "ok": true }))
            }
            Action::AcknowledgeThenSend(id, reply) => {
                api.answer_callback_query(bot_token, id).await?;
                api.send_message(bot_token, reply).await
            }
            Action::SendMessage(reply) => api.send_message(bot_token, reply).await,
        }
    }

    /// Dispatch and execute in one go.
    pub async fn handle(
        &self,
        api: &dyn MessagingApi,
        bot_token: &str,
        update: &IncomingUpdate,
    ) -> Result<Value> {
        let action = self.dispatch(update);
        info!("Handling {} update: {}", update.kind(), action.name());
        self.execute(api, bot_token, &action).await
    }
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SendMessage(_) => "send_message",
            Action::AcknowledgeOnly(_) => "acknowledge_only",
            Action::AcknowledgeThenSend(..) => "acknowledge_then_send",
            Action::NoOp => "no_op",
        }
    }
}
