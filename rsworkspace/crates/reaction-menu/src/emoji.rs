//! Emoji identity.
//!
//! Two emoji are the same when they denote the same logical emoji: custom
//! emoji are compared by their snowflake id (names can be renamed by guild
//! admins), unicode emoji by their character sequence with variation
//! selectors stripped, so `✅` and `✅\u{FE0F}` resolve to one option.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const VARIATION_SELECTORS: [char; 2] = ['\u{FE0E}', '\u{FE0F}'];

/// Identity key of a reaction emoji.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EmojiKey {
    /// A standard unicode emoji such as `👍`.
    Unicode(String),
    /// A guild emoji, identified by its id.
    Custom {
        id: u64,
        name: Option<String>,
        animated: bool,
    },
}

impl EmojiKey {
    pub fn unicode(s: impl Into<String>) -> Self {
        Self::Unicode(s.into())
    }

    pub fn custom(id: u64, name: impl Into<String>) -> Self {
        Self::Custom {
            id,
            name: Some(name.into()),
            animated: false,
        }
    }
}

/// Comparator used by the option registry and the pending set.
pub fn same_emoji(a: &EmojiKey, b: &EmojiKey) -> bool {
    match (a, b) {
        (EmojiKey::Custom { id: x, .. }, EmojiKey::Custom { id: y, .. }) => x == y,
        (EmojiKey::Unicode(x), EmojiKey::Unicode(y)) => normalized(x).eq(normalized(y)),
        _ => false,
    }
}

fn normalized(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().filter(|c| !VARIATION_SELECTORS.contains(c))
}

impl PartialEq for EmojiKey {
    fn eq(&self, other: &Self) -> bool {
        same_emoji(self, other)
    }
}

impl fmt::Display for EmojiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(s) => f.write_str(s),
            Self::Custom { id, name, .. } => {
                write!(f, "{}:{}", name.as_deref().unwrap_or("_"), id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEmojiError {
    #[error("emoji is empty")]
    Empty,
    #[error("invalid custom emoji id in '{0}'")]
    InvalidId(String),
}

/// Parses the textual form of an emoji.
///
/// Accepts:
/// - unicode emoji: `👍`
/// - custom emoji: `name:id` (e.g. `wave:123456789`)
/// - message markup: `<:name:id>` and `<a:name:id>` (animated)
impl FromStr for EmojiKey {
    type Err = ParseEmojiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseEmojiError::Empty);
        }

        if let Some(inner) = s.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
            let (animated, rest) = match inner.strip_prefix("a:") {
                Some(rest) => (true, rest),
                None => (false, inner.strip_prefix(':').unwrap_or(inner)),
            };
            let (name, id) = rest
                .rsplit_once(':')
                .ok_or_else(|| ParseEmojiError::InvalidId(s.to_string()))?;
            let id = id
                .parse::<u64>()
                .map_err(|_| ParseEmojiError::InvalidId(s.to_string()))?;
            return Ok(Self::Custom {
                id,
                name: (!name.is_empty()).then(|| name.to_string()),
                animated,
            });
        }

        if let Some((name, id_str)) = s.rsplit_once(':') {
            if let Ok(id) = id_str.parse::<u64>() {
                return Ok(Self::Custom {
                    id,
                    name: (!name.is_empty()).then(|| name.to_string()),
                    animated: false,
                });
            }
        }

        Ok(Self::Unicode(s.to_string()))
    }
}

impl TryFrom<String> for EmojiKey {
    type Error = ParseEmojiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EmojiKey> for String {
    fn from(key: EmojiKey) -> Self {
        key.to_string()
    }
}
