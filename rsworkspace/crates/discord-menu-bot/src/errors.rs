//! Discord error classification for the menu host.
//!
//! Turns serenity errors into [`DiscordClientError`]s carrying the Discord
//! JSON error code, so the menu controller can tell "the message or reaction
//! no longer exists" apart from failures worth surfacing.

use reaction_menu::RemoteFailure;
use serenity::http::HttpError;
use thiserror::Error;

/// High-level category of a Discord API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    RateLimit,
    NotFound,
    PermissionDenied,
    InvalidInput,
    Network,
    Unknown,
}

/// Discord JSON error codes the menu host can run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscordErrorCode {
    /// 10003
    UnknownChannel,
    /// 10008, the menu message was deleted.
    UnknownMessage,
    /// 10014
    UnknownEmoji,
    /// 50001
    MissingAccess,
    /// 50013, usually Manage Messages for removing other users' votes.
    MissingPermissions,
    /// HTTP 429
    RateLimited,
    /// 30010
    MaxReactionsReached,
    /// 90001, the reacting user blocked the bot.
    ReactionBlocked,
    /// 130000
    ApiOverloaded,
    NetworkError,
    Unknown,
}

impl DiscordErrorCode {
    pub fn from_raw(code: u32) -> Self {
        match code {
            10003 => Self::UnknownChannel,
            10008 => Self::UnknownMessage,
            10014 => Self::UnknownEmoji,
            30010 => Self::MaxReactionsReached,
            50001 => Self::MissingAccess,
            50013 => Self::MissingPermissions,
            90001 => Self::ReactionBlocked,
            130000 => Self::ApiOverloaded,
            _ => Self::Unknown,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownChannel | Self::UnknownMessage | Self::UnknownEmoji => {
                ErrorCategory::NotFound
            }
            Self::MissingAccess | Self::MissingPermissions | Self::ReactionBlocked => {
                ErrorCategory::PermissionDenied
            }
            Self::RateLimited => ErrorCategory::RateLimit,
            Self::MaxReactionsReached => ErrorCategory::InvalidInput,
            Self::NetworkError => ErrorCategory::Network,
            Self::ApiOverloaded | Self::Unknown => ErrorCategory::Unknown,
        }
    }

    /// True if repeating the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::NotFound | ErrorCategory::PermissionDenied
        )
    }
}

/// A failed Discord REST call made on behalf of a menu.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed [{code:?} {raw_discord_code}, HTTP {http_status}]: {message}")]
pub struct DiscordClientError {
    pub operation: &'static str,
    pub code: DiscordErrorCode,
    pub raw_discord_code: u32,
    pub http_status: u16,
    pub message: String,
}

impl DiscordClientError {
    /// Classify a serenity error raised by `operation`.
    pub fn classify(operation: &'static str, err: &serenity::Error) -> Self {
        match err {
            serenity::Error::Http(http_err) => Self::classify_http(operation, http_err),
            _ => Self::network(operation, err.to_string()),
        }
    }

    fn classify_http(operation: &'static str, http_err: &HttpError) -> Self {
        match http_err {
            HttpError::UnsuccessfulRequest(resp) => {
                let http_status = resp.status_code.as_u16();
                let raw_discord_code = resp.error.code as u32;
                let code = if http_status == 429 {
                    DiscordErrorCode::RateLimited
                } else {
                    DiscordErrorCode::from_raw(raw_discord_code)
                };
                Self {
                    operation,
                    code,
                    raw_discord_code,
                    http_status,
                    message: resp.error.message.clone(),
                }
            }
            _ => Self::network(operation, http_err.to_string()),
        }
    }

    fn network(operation: &'static str, message: String) -> Self {
        Self {
            operation,
            code: DiscordErrorCode::NetworkError,
            raw_discord_code: 0,
            http_status: 0,
            message,
        }
    }
}

impl RemoteFailure for DiscordClientError {
    /// The message, or the reaction being removed, no longer exists.
    ///
    /// Unknown Emoji is not gone: the message is still there and the option
    /// names an emoji the bot cannot use.
    fn is_gone(&self) -> bool {
        self.http_status == 404
            || matches!(
                self.code,
                DiscordErrorCode::UnknownMessage | DiscordErrorCode::UnknownChannel
            )
    }
}
