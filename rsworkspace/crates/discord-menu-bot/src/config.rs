//! Configuration management for discord-menu-bot

#[path = "config_tests.rs"]
mod config_tests;

use std::fs;

use anyhow::{bail, Context, Result};
use reaction_menu::{same_emoji, EmojiKey};
use serde::{Deserialize, Serialize};

/// Source of environment variables.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordBotConfig,
    pub menu: MenuConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordBotConfig {
    /// Bot token from the Discord developer portal
    #[serde(default)]
    pub bot_token: String,
}

/// The menu hosted by the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    pub channel_id: u64,
    /// Existing message to attach to. When absent the bot posts `content`.
    #[serde(default)]
    pub message_id: Option<u64>,
    #[serde(default = "default_content")]
    pub content: String,
    #[serde(default)]
    pub options: Vec<OptionConfig>,
    /// Only these users' votes are kept. Empty means everyone.
    #[serde(default)]
    pub allowed_users: Vec<u64>,
    /// Remove reactions that match no option.
    #[serde(default)]
    pub remove_foreign_reactions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    pub emoji: EmojiKey,
    #[serde(default)]
    pub label: Option<String>,
    /// Toggle the user's vote off again after it is handled.
    #[serde(default)]
    pub button: bool,
}

impl OptionConfig {
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.emoji.to_string())
    }

    /// The emoji as Discord renders it in message text.
    fn emoji_display(&self) -> String {
        match &self.emoji {
            EmojiKey::Unicode(s) => s.clone(),
            EmojiKey::Custom { id, name, animated } => format!(
                "<{}:{}:{}>",
                if *animated { "a" } else { "" },
                name.as_deref().unwrap_or("_"),
                id
            ),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env(env: &impl ReadEnv) -> Result<Self> {
        let bot_token = env
            .var("DISCORD_BOT_TOKEN")
            .context("DISCORD_BOT_TOKEN not set")?;

        let channel_id = env
            .var("MENU_CHANNEL_ID")
            .context("MENU_CHANNEL_ID not set")?
            .trim()
            .parse::<u64>()
            .context("MENU_CHANNEL_ID is not a valid id")?;

        let message_id = match env.var("MENU_MESSAGE_ID") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("MENU_MESSAGE_ID is not a valid id")?,
            ),
            _ => None,
        };

        let options = parse_emoji_list(&env.var("MENU_OPTIONS").unwrap_or_default())?
            .into_iter()
            .map(|emoji| OptionConfig {
                emoji,
                label: None,
                button: false,
            })
            .collect();

        let content = env.var("MENU_CONTENT").unwrap_or_else(default_content);

        let allowed_users = parse_id_list(&env.var("MENU_ALLOWED_USERS").unwrap_or_default());

        let remove_foreign_reactions = env
            .var("MENU_REMOVE_FOREIGN")
            .unwrap_or_else(|| "false".to_string())
            .to_lowercase()
            == "true";

        let config = Config {
            discord: DiscordBotConfig { bot_token },
            menu: MenuConfig {
                channel_id,
                message_id,
                content,
                options,
                allowed_users,
                remove_foreign_reactions,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.menu.channel_id == 0 {
            bail!("menu.channel_id must be a non-zero id");
        }
        if self.menu.message_id == Some(0) {
            bail!("menu.message_id must be a non-zero id");
        }
        if self.menu.message_id.is_none() && self.menu.content.trim().is_empty() {
            bail!("menu.content must not be empty when the bot posts the menu message");
        }
        Ok(())
    }
}

impl MenuConfig {
    /// Suspicious but runnable settings.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.options.is_empty() {
            warnings.push("menu has no options; only the default behaviour applies".to_string());
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i]
                .iter()
                .any(|earlier| same_emoji(&earlier.emoji, &option.emoji))
            {
                warnings.push(format!(
                    "option '{}' is declared twice; the later one replaces the earlier",
                    option.emoji
                ));
            }
        }
        if self.message_id.is_some() && self.content != default_content() {
            warnings.push("menu.content is ignored when menu.message_id is set".to_string());
        }
        warnings
    }

    /// Text of the message the bot posts when no `message_id` is configured.
    pub fn render(&self) -> String {
        let mut text = self.content.clone();
        for option in &self.options {
            text.push_str(&format!("\n{} {}", option.emoji_display(), option.label()));
        }
        text
    }
}

fn default_content() -> String {
    "React to choose an option:".to_string()
}

fn parse_id_list(s: &str) -> Vec<u64> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .filter_map(|x| x.parse::<u64>().ok())
        .collect()
}

fn parse_emoji_list(s: &str) -> Result<Vec<EmojiKey>> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| {
            x.parse::<EmojiKey>()
                .with_context(|| format!("Invalid emoji in MENU_OPTIONS: {}", x))
        })
        .collect()
}
