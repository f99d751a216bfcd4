use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Which set of reply texts the bot answers with.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStyle {
    /// Emoji and Markdown replies, `/start` carries inline buttons
    #[default]
    Rich,
    /// HTML greeting, plain-text help, no buttons
    Plain,
}

impl std::fmt::Display for ReplyStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyStyle::Rich => write!(f, "rich"),
            ReplyStyle::Plain => write!(f, "plain"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub replies: RepliesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RepliesConfig {
    #[serde(default)]
    pub style: ReplyStyle,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: default_api_base(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            path: default_path(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_path() -> String {
    "/webhook".to_string()
}

/// Route paths must start with `/`; `webhook`, `/webhook/` and `/webhook`
/// all mean the same route. An empty path is the root.
fn route_path(path: &str) -> String {
    format!("/{}", path.trim().trim_matches('/'))
}

impl Config {
    /// Bot credential, if one was configured. Blank strings count as unset.
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Load the config file if it exists, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.server.path = route_path(&config.server.path);
        Ok(config)
    }

    /// `BOT_TOKEN` and `BIND` win over the file. Empty values are ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup("BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(bind) = lookup("BIND") {
            self.server.bind = bind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.path, "/webhook");
        assert_eq!(config.replies.style, ReplyStyle::Rich);
        assert!(config.bot_token().is_none());
    }

    #[test]
    fn test_full_file() {
        let config = Config::parse(
            r#"
[telegram]
bot_token = "123:abc"
api_base = "http://localhost:9081"

[server]
bind = "127.0.0.1:3000"
path = "/hook"

[replies]
style = "plain"
"#,
        )
        .unwrap();
        assert_eq!(config.bot_token(), Some("123:abc"));
        assert_eq!(config.telegram.api_base, "http://localhost:9081");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.server.path, "/hook");
        assert_eq!(config.replies.style, ReplyStyle::Plain);
    }

    #[test]
    fn test_path_without_leading_slash_is_normalized() {
        let config = Config::parse("[server]\npath = \"webhook\"").unwrap();
        assert_eq!(config.server.path, "/webhook");
    }

    #[test]
    fn test_path_slashes_and_blanks_normalized() {
        for (raw, expected) in [
            ("/hooks/telegram/", "/hooks/telegram"),
            (" /webhook ", "/webhook"),
            ("", "/"),
            ("/", "/"),
        ] {
            let config = Config::parse(&format!("[server]\npath = \"{raw}\"")).unwrap();
            assert_eq!(config.server.path, expected, "path {:?}", raw);
        }
    }

    #[test]
    fn test_unknown_style_rejected() {
        assert!(Config::parse("[replies]\nstyle = \"fancy\"").is_err());
    }

    #[test]
    fn test_blank_token_is_unset() {
        let config = Config::parse("[telegram]\nbot_token = \"  \"").unwrap();
        assert!(config.bot_token().is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::parse("[telegram]\nbot_token = \"from-file\"").unwrap();
        let env: HashMap<&str, &str> = [("BOT_TOKEN", "from-env"), ("BIND", "127.0.0.1:9000")]
            .into_iter()
            .collect();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.bot_token(), Some("from-env"));
        assert_eq!(config.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn test_empty_env_does_not_clobber_file() {
        let mut config = Config::parse("[telegram]\nbot_token = \"from-file\"").unwrap();
        config.apply_overrides(|key| (key == "BOT_TOKEN").then(String::new));
        assert_eq!(config.bot_token(), Some("from-file"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/zerocode-bot.toml")).unwrap();
        assert_eq!(config.server.path, "/webhook");
    }

    #[test]
    fn test_style_display() {
        assert_eq!(ReplyStyle::Rich.to_string(), "rich");
        assert_eq!(ReplyStyle::Plain.to_string(), "plain");
    }
}
