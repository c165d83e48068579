//! Menu options and the callbacks attached to them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::emoji::EmojiKey;
use crate::error::BoxError;
use crate::types::{Reaction, ReactionEventKind, UserId};

/// What the router should do after a lifecycle handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerReply {
    #[default]
    Continue,
    /// Retract the acting user's vote. Only honoured for `collect`, which
    /// turns the option into a button: every click toggles back off.
    Retract,
}

pub type HandlerFuture = BoxFuture<'static, Result<HandlerReply, BoxError>>;

/// Async lifecycle handler: `(reaction, acting user)`.
pub type Handler = Arc<dyn Fn(Reaction, Option<UserId>) -> HandlerFuture + Send + Sync>;

/// Keep/discard predicate for a vote. The user is `None` when the reaction
/// as a whole is being judged.
pub type Validator = Arc<dyn Fn(&Reaction, Option<UserId>) -> bool + Send + Sync>;

/// Whether an option is currently offered.
pub type Condition = Arc<dyn Fn() -> bool + Send + Sync>;

fn boxed_handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Reaction, Option<UserId>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HandlerReply, BoxError>> + Send + 'static,
{
    Arc::new(move |reaction, user| f(reaction, user).boxed())
}

/// Callback set shared by [`MenuOption`] and [`DefaultOption`].
#[derive(Clone, Default)]
pub struct Callbacks {
    pub collect: Option<Handler>,
    pub remove: Option<Handler>,
    pub dispose: Option<Handler>,
    pub validate: Option<Validator>,
}

impl Callbacks {
    /// Handler for an event kind.
    pub fn handler(&self, kind: ReactionEventKind) -> Option<&Handler> {
        match kind {
            ReactionEventKind::Collect => self.collect.as_ref(),
            ReactionEventKind::Remove => self.remove.as_ref(),
            ReactionEventKind::Dispose => self.dispose.as_ref(),
        }
    }

    /// `None` when no validator is declared.
    pub fn validate(&self, reaction: &Reaction, user: Option<UserId>) -> Option<bool> {
        self.validate.as_ref().map(|v| v(reaction, user))
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("collect", &self.collect.is_some())
            .field("remove", &self.remove.is_some())
            .field("dispose", &self.dispose.is_some())
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

macro_rules! callback_builders {
    () => {
        pub fn on_collect<F, Fut>(mut self, f: F) -> Self
        where
            F: Fn(Reaction, Option<UserId>) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<HandlerReply, BoxError>> + Send + 'static,
        {
            self.callbacks.collect = Some(boxed_handler(f));
            self
        }

        pub fn on_remove<F, Fut>(mut self, f: F) -> Self
        where
            F: Fn(Reaction, Option<UserId>) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<HandlerReply, BoxError>> + Send + 'static,
        {
            self.callbacks.remove = Some(boxed_handler(f));
            self
        }

        pub fn on_dispose<F, Fut>(mut self, f: F) -> Self
        where
            F: Fn(Reaction, Option<UserId>) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<HandlerReply, BoxError>> + Send + 'static,
        {
            self.callbacks.dispose = Some(boxed_handler(f));
            self
        }

        pub fn with_validate<F>(mut self, f: F) -> Self
        where
            F: Fn(&Reaction, Option<UserId>) -> bool + Send + Sync + 'static,
        {
            self.callbacks.validate = Some(Arc::new(f));
            self
        }
    };
}

/// A selectable entry bound to one emoji.
#[derive(Clone)]
pub struct MenuOption {
    pub emoji: EmojiKey,
    pub callbacks: Callbacks,
    pub condition: Option<Condition>,
}

impl MenuOption {
    pub fn new(emoji: EmojiKey) -> Self {
        Self {
            emoji,
            callbacks: Callbacks::default(),
            condition: None,
        }
    }

    callback_builders!();

    pub fn with_condition<F>(mut self, f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(f));
        self
    }

    /// True when the option has no condition or its condition holds.
    pub fn is_offered(&self) -> bool {
        self.condition.as_ref().map_or(true, |c| c())
    }
}

impl fmt::Debug for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuOption")
            .field("emoji", &self.emoji)
            .field("callbacks", &self.callbacks)
            .field("condition", &self.condition.is_some())
            .finish()
    }
}

/// Fallback policy for reactions that match no offered option.
#[derive(Clone, Default, Debug)]
pub struct DefaultOption {
    pub callbacks: Callbacks,
}

impl DefaultOption {
    pub fn new() -> Self {
        Self::default()
    }

    callback_builders!();
}
