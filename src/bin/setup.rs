//! Webhook setup helper.
//!
//! Registers the bot's public webhook URL with Telegram, removes it again,
//! or prints what Telegram currently has on file.
//!
//! ```text
//! setup set https://bot.example.com   # register <site>/webhook
//! setup delete
//! setup info
//! setup                               # interactive menu
//! ```
//!
//! The bot token comes from `BOT_TOKEN` (a `.env` file is honoured).
//! `WEBHOOK_PATH` overrides the `/webhook` route appended to the site URL,
//! and `TELEGRAM_API_BASE` points the helper at a Bot API server other than
//! `https://api.telegram.org`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

const API_BASE: &str = "https://api.telegram.org";

// ── Bot API ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    description: Option<String>,
}

struct SetupClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl SetupClient {
    fn new(token: String) -> Self {
        let api_base = std::env::var("TELEGRAM_API_BASE").unwrap_or_else(|_| API_BASE.into());
        Self {
            http: reqwest::Client::new(),
            api_base,
            token,
        }
    }

    async fn call(&self, method: &str, payload: Value) -> Result<ApiResponse> {
        let url = format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.token,
            method
        );
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("{} request failed", method))?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .with_context(|| format!("HTTP error: {}", status))?;
        Ok(body)
    }

    async fn set_webhook(&self, url: &str) -> Result<()> {
        let res = self.call("setWebhook", json!({ "url": url })).await?;
        if !res.ok {
            bail!(
                "Failed to set webhook: {}",
                res.description.unwrap_or_else(|| "Unknown error".into())
            );
        }
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<()> {
        let res = self.call("deleteWebhook", json!({})).await?;
        if !res.ok {
            bail!(
                "Failed to delete webhook: {}",
                res.description.unwrap_or_else(|| "Unknown error".into())
            );
        }
        Ok(())
    }

    async fn webhook_info(&self) -> Result<Value> {
        let res = self.call("getWebhookInfo", json!({})).await?;
        if !res.ok {
            bail!(
                "Failed to get webhook info: {}",
                res.description.unwrap_or_else(|| "Unknown error".into())
            );
        }
        Ok(res.result.unwrap_or_else(|| json!({})))
    }
}

// ── URL handling ───────────────────────────────────────────────────────────────

/// Turns a site URL into the full webhook URL, appending `path` unless the
/// URL already ends with it.
fn webhook_url(site: &str, path: &str) -> String {
    let site = site.trim();
    let path = format!("/{}", path.trim_matches('/'));
    if site.ends_with(&path) {
        site.to_owned()
    } else {
        format!("{}{}", site.trim_end_matches('/'), path)
    }
}

fn webhook_path() -> String {
    std::env::var("WEBHOOK_PATH").unwrap_or_else(|_| "/webhook".to_string())
}

// ── Commands ───────────────────────────────────────────────────────────────────

async fn set(client: &SetupClient, site: &str) -> Result<()> {
    if site.trim().is_empty() {
        bail!("No URL provided");
    }
    let url = webhook_url(site, &webhook_path());
    println!("Setting webhook to: {url}");

    client.set_webhook(&url).await?;
    println!("✅ Webhook set successfully!");
    println!("Webhook URL: {url}");

    // The webhook is already registered at this point
    match client.webhook_info().await {
        Ok(info) => println!("Webhook info: {info}"),
        Err(e) => eprintln!("⚠️ Could not fetch webhook info: {e:#}"),
    }
    Ok(())
}

async fn delete(client: &SetupClient) -> Result<()> {
    client.delete_webhook().await?;
    println!("✅ Webhook deleted successfully!");
    Ok(())
}

async fn info(client: &SetupClient) -> Result<()> {
    let info = client.webhook_info().await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

// ── Interactive mode ───────────────────────────────────────────────────────────

async fn run_menu(client: &SetupClient) -> Result<()> {
    use std::io::{self, Write};

    let read_line = |prompt: &str| -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        Ok(buf.trim().to_owned())
    };

    println!("Telegram Bot Webhook Setup");
    println!("1. Set webhook");
    println!("2. Delete webhook");
    println!("3. Exit");

    match read_line("Enter your choice (1-3): ")?.as_str() {
        "1" => {
            let site = read_line("Enter your site URL (e.g., https://your-bot.example.com): ")?;
            set(client, &site).await
        }
        "2" => delete(client).await,
        "3" => {
            println!("Exiting...");
            Ok(())
        }
        _ => {
            println!("Invalid choice");
            Ok(())
        }
    }
}

// ── Entry point ────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let token = match std::env::var("BOT_TOKEN") {
        Ok(token) if !token.trim().is_empty() => token,
        _ => bail!("BOT_TOKEN not found in environment or .env file"),
    };
    let client = SetupClient::new(token);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_menu(&client).await,
        Some("set") => match args.get(1) {
            Some(site) => set(&client, site).await,
            None => bail!("Usage: setup set <site-url>"),
        },
        Some("delete") => delete(&client).await,
        Some("info") => info(&client).await,
        Some(other) => bail!("Unknown command '{other}' (expected set, delete or info)"),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
