pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::replies::OutboundReply;

/// The two Bot API calls the dispatcher needs.
///
/// Implementations return the API's JSON response as-is (`{"ok": bool, ...}`)
/// and only fail when the call itself could not be made or answered.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn send_message(&self, bot_token: &str, reply: &OutboundReply) -> Result<Value>;
    async fn answer_callback_query(&self, bot_token: &str, callback_query_id: &str)
        -> Result<Value>;
}
