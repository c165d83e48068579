//! # reaction-menu
//!
//! Interactive menus rendered as emoji reactions on a single chat message.
//!
//! A [`Menu`] keeps the reactions on its message in line with a declared set
//! of [`MenuOption`]s and routes users' votes to per-option callbacks:
//!
//! - every declared, currently offered option gets a reaction from the bot;
//! - votes rejected by an option's `validate` are retracted;
//! - reactions matching no option fall back to an optional [`DefaultOption`];
//! - the bot's own reactions never count as user input.
//!
//! The chat platform is reached only through [`ReactionClient`], so the
//! crate is independent of any particular Discord library.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use reaction_menu::{EmojiKey, HandlerReply, Menu, MenuOption};
//!
//! let vote = MenuOption::new(EmojiKey::unicode("👍"))
//!     .on_collect(|reaction, user| async move {
//!         tracing::info!("{:?} voted {}", user, reaction.emoji);
//!         Ok(HandlerReply::Continue)
//!     });
//!
//! let (menu, running) = Menu::new(client, bot_id, message, [vote], None);
//! ```

pub mod client;
pub mod emoji;
pub mod error;
pub mod menu;
pub mod option;
pub mod pending;
pub mod reconcile;
pub mod registry;
pub mod router;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod mocks;

pub use client::{ReactionClient, RemoteFailure};
pub use emoji::{same_emoji, EmojiKey, ParseEmojiError};
pub use error::{BoxError, MenuError, Result};
pub use menu::Menu;
pub use option::{Callbacks, DefaultOption, HandlerReply, MenuOption};
pub use reconcile::ReconcileOutcome;
pub use registry::OptionRegistry;
pub use router::EventRouter;
pub use types::{
    Message, MessageRef, Reaction, ReactionEvent, ReactionEventKind, RemoteEvent, UserId,
};
