//! Insertion-ordered option lookup keyed by emoji identity.
//!
//! Lookups go through [`same_emoji`](crate::emoji::same_emoji) rather than
//! hashing, so a linear scan over a `Vec` is the store. Menus hold a
//! handful of options, which keeps this cheap.

use std::sync::Arc;

use crate::emoji::{same_emoji, EmojiKey};
use crate::option::MenuOption;

#[derive(Clone, Default, Debug)]
pub struct OptionRegistry {
    entries: Vec<Arc<MenuOption>>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `option`, replacing any option with the same emoji in place.
    /// Returns the replaced option.
    pub fn add(&mut self, option: MenuOption) -> Option<Arc<MenuOption>> {
        let option = Arc::new(option);
        match self.position(&option.emoji) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx], option)),
            None => {
                self.entries.push(option);
                None
            }
        }
    }

    /// Remove the option registered for `emoji`, if any.
    pub fn remove(&mut self, emoji: &EmojiKey) -> Option<Arc<MenuOption>> {
        self.position(emoji).map(|idx| self.entries.remove(idx))
    }

    pub fn get(&self, emoji: &EmojiKey) -> Option<Arc<MenuOption>> {
        self.position(emoji).map(|idx| self.entries[idx].clone())
    }

    /// Snapshot of the options in insertion order. Later mutations of the
    /// registry are not visible through the returned vector.
    pub fn values(&self) -> Vec<Arc<MenuOption>> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, emoji: &EmojiKey) -> Option<usize> {
        self.entries.iter().position(|o| same_emoji(&o.emoji, emoji))
    }
}

impl FromIterator<MenuOption> for OptionRegistry {
    fn from_iter<I: IntoIterator<Item = MenuOption>>(iter: I) -> Self {
        let mut registry = Self::new();
        for option in iter {
            registry.add(option);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(emoji: &str) -> MenuOption {
        MenuOption::new(EmojiKey::unicode(emoji))
    }

    fn emojis(registry: &OptionRegistry) -> Vec<String> {
        registry.values().iter().map(|o| o.emoji.to_string()).collect()
    }

    #[test]
    fn test_preserves_insertion_order() {
        let registry: OptionRegistry = ["1️⃣", "2️⃣", "3️⃣"].into_iter().map(opt).collect();
        assert_eq!(emojis(&registry), vec!["1️⃣", "2️⃣", "3️⃣"]);
    }

    #[test]
    fn test_colliding_key_replaces_in_place() {
        let mut registry = OptionRegistry::new();
        registry.add(opt("✅"));
        registry.add(opt("❌"));
        let replaced = registry.add(opt("✅").with_condition(|| false));

        assert!(replaced.is_some());
        assert_eq!(registry.len(), 2);
        assert_eq!(emojis(&registry), vec!["✅", "❌"]);
        assert!(!registry.get(&EmojiKey::unicode("✅")).unwrap().is_offered());
    }

    #[test]
    fn test_get_uses_emoji_comparator() {
        let mut registry = OptionRegistry::new();
        registry.add(opt("✅"));
        assert!(registry.get(&EmojiKey::unicode("✅\u{FE0F}")).is_some());
        assert!(registry.get(&EmojiKey::unicode("❌")).is_none());
    }

    #[test]
    fn test_custom_lookup_ignores_name() {
        let mut registry = OptionRegistry::new();
        registry.add(MenuOption::new(EmojiKey::custom(10, "old")));
        assert!(registry.get(&EmojiKey::custom(10, "new")).is_some());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut registry = OptionRegistry::new();
        registry.add(opt("✅"));
        assert!(registry.remove(&EmojiKey::unicode("❌")).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_present() {
        let mut registry = OptionRegistry::new();
        registry.add(opt("✅"));
        registry.add(opt("❌"));
        assert!(registry.remove(&EmojiKey::unicode("✅")).is_some());
        assert_eq!(emojis(&registry), vec!["❌"]);
    }

    #[test]
    fn test_values_is_a_snapshot() {
        let mut registry = OptionRegistry::new();
        registry.add(opt("✅"));
        let snapshot = registry.values();
        registry.add(opt("❌"));
        registry.remove(&EmojiKey::unicode("✅"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].emoji, EmojiKey::unicode("✅"));
    }
}
