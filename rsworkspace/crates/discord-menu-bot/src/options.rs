//! Builds the menu's options from configuration.

use std::sync::Arc;

use reaction_menu::{DefaultOption, HandlerReply, MenuOption, Reaction, UserId};
use tracing::info;

use crate::config::{MenuConfig, OptionConfig};

/// Options in declaration order, plus the default behaviour for unlisted
/// reactions when `remove_foreign_reactions` is set.
pub fn build(menu: &MenuConfig) -> (Vec<MenuOption>, Option<DefaultOption>) {
    let allowed: Arc<[UserId]> = menu.allowed_users.iter().copied().map(UserId).collect();

    let options = menu
        .options
        .iter()
        .map(|option| build_option(option, &allowed))
        .collect();

    let default = menu.remove_foreign_reactions.then(|| {
        DefaultOption::new()
            .with_validate(|_, _| false)
            .on_dispose(|reaction, _| async move {
                info!("Removed unlisted reaction '{}'", reaction.emoji);
                Ok(HandlerReply::Continue)
            })
    });

    (options, default)
}

fn build_option(config: &OptionConfig, allowed: &Arc<[UserId]>) -> MenuOption {
    let label: Arc<str> = config.label().into();
    let reply = if config.button {
        HandlerReply::Retract
    } else {
        HandlerReply::Continue
    };

    let collect_label = label.clone();
    let mut option = MenuOption::new(config.emoji.clone())
        .on_collect(move |_, user| {
            let label = collect_label.clone();
            async move {
                info!("{} chose '{}'", voter(user), label);
                Ok(reply)
            }
        })
        .on_remove(move |_, user| {
            let label = label.clone();
            async move {
                info!("{} withdrew '{}'", voter(user), label);
                Ok(HandlerReply::Continue)
            }
        });

    if !allowed.is_empty() {
        let allowed = allowed.clone();
        option = option.with_validate(move |_: &Reaction, user| match user {
            Some(user) => allowed.contains(&user),
            None => true,
        });
    }

    option
}

fn voter(user: Option<UserId>) -> String {
    user.map_or_else(|| "someone".to_string(), |u| format!("user {}", u))
}
