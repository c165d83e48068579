//! The menu controller: owns the option registry and the message handle,
//! and starts reconciliation passes and the event router.

#[path = "menu_tests.rs"]
mod menu_tests;

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::client::ReactionClient;
use crate::emoji::EmojiKey;
use crate::error::{MenuError, Result};
use crate::option::{Callbacks, DefaultOption, MenuOption};
use crate::reconcile::{ReconcileOutcome, Reconciler};
use crate::registry::OptionRegistry;
use crate::router::EventRouter;
use crate::types::{Message, MessageRef, UserId};

struct MenuState<C> {
    client: C,
    me: UserId,
    message: MessageRef,
    registry: RwLock<OptionRegistry>,
    default: Option<DefaultOption>,
    last_message: Mutex<Option<Message>>,
    initial_pass: Mutex<Option<oneshot::Receiver<Result<ReconcileOutcome>>>>,
}

/// An emoji-reaction menu on one message.
///
/// Cloning is cheap; clones share state. Methods that trigger remote work
/// spawn it onto the tokio runtime and return the task handle. Awaiting the
/// handle is optional.
pub struct Menu<C> {
    state: Arc<MenuState<C>>,
}

impl<C> Clone for Menu<C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<C: ReactionClient> Menu<C> {
    /// Create the menu and start it.
    ///
    /// Spawns a task that runs the first reconciliation pass and then routes
    /// events from the message's subscription until the stream ends. The
    /// router starts even if the first pass fails; that result is available
    /// through [`Menu::take_initial_pass`]. Must be called from within a
    /// tokio runtime; never waits on the network.
    pub fn new(
        client: C,
        me: UserId,
        message: MessageRef,
        options: impl IntoIterator<Item = MenuOption>,
        default: Option<DefaultOption>,
    ) -> (Self, JoinHandle<Result<()>>) {
        let menu = Self::unstarted(client, me, message, options, default);
        let handle = menu.start();
        (menu, handle)
    }

    pub(crate) fn unstarted(
        client: C,
        me: UserId,
        message: MessageRef,
        options: impl IntoIterator<Item = MenuOption>,
        default: Option<DefaultOption>,
    ) -> Self {
        Self {
            state: Arc::new(MenuState {
                client,
                me,
                message,
                registry: RwLock::new(options.into_iter().collect()),
                default,
                last_message: Mutex::new(None),
                initial_pass: Mutex::new(None),
            }),
        }
    }

    fn start(&self) -> JoinHandle<Result<()>> {
        let (tx, rx) = oneshot::channel();
        *self
            .state
            .initial_pass
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(rx);

        let menu = self.clone();
        tokio::spawn(async move {
            info!(
                "Starting menu on {} with {} options",
                menu.message_ref(),
                menu.options().len()
            );
            let first = match menu.spawn_reconcile().await {
                Ok(result) => result,
                Err(e) => {
                    error!(
                        "Initial reconciliation of {} did not complete: {}",
                        menu.message_ref(),
                        e
                    );
                    Err(MenuError::from(e))
                }
            };
            // Nobody may be listening.
            let _ = tx.send(first);
            EventRouter::new(menu).run().await
        })
    }

    /// Result of the startup pass. Yields `Some` once, for the first caller.
    pub fn take_initial_pass(&self) -> Option<oneshot::Receiver<Result<ReconcileOutcome>>> {
        self.state
            .initial_pass
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Run one reconciliation pass on the current task.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome> {
        let registry = self
            .state
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let reconciler = Reconciler {
            client: &self.state.client,
            me: self.state.me,
            registry: &registry,
            default: self.state.default.as_ref(),
        };
        let (message, outcome) = reconciler.run(self.state.message).await?;
        *self
            .state
            .last_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = message;
        Ok(outcome)
    }

    /// Spawn a reconciliation pass. Failures are logged and returned
    /// through the handle.
    pub fn spawn_reconcile(&self) -> JoinHandle<Result<ReconcileOutcome>> {
        let menu = self.clone();
        tokio::spawn(async move {
            let result = menu.reconcile().await;
            match &result {
                Ok(outcome) if outcome.mutations() > 0 => {
                    debug!("Reconciled {}: {:?}", menu.message_ref(), outcome)
                }
                Ok(_) => {}
                Err(e) => error!("Reconciliation of {} failed: {}", menu.message_ref(), e),
            }
            result
        })
    }

    /// Register `option` (replacing one with the same emoji) and reconcile.
    pub fn add_option(&self, option: MenuOption) -> JoinHandle<Result<ReconcileOutcome>> {
        let emoji = option.emoji.clone();
        let replaced = self
            .state
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(option);
        if replaced.is_some() {
            debug!("Replaced option '{}' on {}", emoji, self.message_ref());
        }
        self.spawn_reconcile()
    }

    /// Unregister the option for `emoji` and reconcile.
    pub fn remove_option(&self, emoji: &EmojiKey) -> JoinHandle<Result<ReconcileOutcome>> {
        self.state
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(emoji);
        self.spawn_reconcile()
    }

    pub fn get_option(&self, emoji: &EmojiKey) -> Option<Arc<MenuOption>> {
        self.state
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(emoji)
    }

    /// Callbacks responsible for `emoji`: the option's, else the default's.
    pub fn get_callbacks(&self, emoji: &EmojiKey) -> Option<Callbacks> {
        match self.get_option(emoji) {
            Some(option) => Some(option.callbacks.clone()),
            None => self.state.default.as_ref().map(|d| d.callbacks.clone()),
        }
    }

    /// Registered options in insertion order.
    pub fn options(&self) -> Vec<Arc<MenuOption>> {
        self.state
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
    }

    /// The message as fetched by the most recent pass.
    pub fn last_message(&self) -> Option<Message> {
        self.state
            .last_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn me(&self) -> UserId {
        self.state.me
    }

    pub fn message_ref(&self) -> MessageRef {
        self.state.message
    }

    pub fn client(&self) -> &C {
        &self.state.client
    }
}
