use crate::emoji::{same_emoji, EmojiKey};

/// Emoji of options found satisfied during one reconciliation pass.
#[derive(Debug, Default)]
pub struct PendingSet {
    keys: Vec<EmojiKey>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, emoji: EmojiKey) {
        if !self.has(&emoji) {
            self.keys.push(emoji);
        }
    }

    pub fn has(&self, emoji: &EmojiKey) -> bool {
        self.keys.iter().any(|k| same_emoji(k, emoji))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Extend<EmojiKey> for PendingSet {
    fn extend<I: IntoIterator<Item = EmojiKey>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_after_add() {
        let mut set = PendingSet::new();
        set.add(EmojiKey::unicode("✅"));
        assert!(set.has(&EmojiKey::unicode("✅\u{FE0F}")));
        assert!(!set.has(&EmojiKey::unicode("❌")));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = PendingSet::new();
        set.extend([EmojiKey::custom(1, "a"), EmojiKey::custom(1, "b")]);
        assert_eq!(set.len(), 1);
    }
}
