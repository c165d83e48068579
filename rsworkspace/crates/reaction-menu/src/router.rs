//! Event router: turns reaction events on the menu message into option
//! callbacks, then schedules a reconciliation pass.

#[path = "router_tests.rs"]
mod router_tests;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{ReactionClient, RemoteFailure};
use crate::error::{MenuError, Result};
use crate::menu::Menu;
use crate::option::HandlerReply;
use crate::reconcile::ReconcileOutcome;
use crate::types::{ReactionEvent, ReactionEventKind, RemoteEvent, UserId};

/// True if the event was caused by the controller itself.
pub fn is_own_event(event: &RemoteEvent, me: UserId) -> bool {
    matches!(event, RemoteEvent::Reaction(ReactionEvent { user: Some(user), .. }) if *user == me)
}

pub struct EventRouter<C> {
    menu: Menu<C>,
}

impl<C: ReactionClient> EventRouter<C> {
    pub fn new(menu: Menu<C>) -> Self {
        Self { menu }
    }

    /// Subscribe to the menu message and route events until the stream ends.
    ///
    /// A handler error stops routing and is returned.
    pub async fn run(self) -> Result<()> {
        let target = self.menu.message_ref();
        let mut events = match self.menu.client().subscribe(target).await {
            Ok(events) => events,
            Err(e) if e.is_gone() => {
                warn!("Menu {} is gone, not subscribing: {}", target, e);
                return Ok(());
            }
            Err(e) => return Err(MenuError::remote(e)),
        };

        info!("Routing reaction events for menu {}", target);

        while let Some(event) = events.next().await {
            self.handle(event).await?;
        }

        info!("Event stream for menu {} closed", target);
        Ok(())
    }

    /// Route one event.
    ///
    /// Returns the handle of the reconciliation pass triggered afterwards, or
    /// `None` if the event was the controller's own and was ignored. Only a
    /// handler error fails routing; a failed toggle-off is logged and left
    /// to the follow-up pass.
    pub async fn handle(
        &self,
        event: RemoteEvent,
    ) -> Result<Option<JoinHandle<Result<ReconcileOutcome>>>> {
        if is_own_event(&event, self.menu.me()) {
            return Ok(None);
        }

        match &event {
            RemoteEvent::Reaction(reaction_event) => self.dispatch(reaction_event).await?,
            RemoteEvent::AllRemoved(message) => {
                debug!("All reactions cleared from {}", message);
            }
        }

        Ok(Some(self.menu.spawn_reconcile()))
    }

    async fn dispatch(&self, event: &ReactionEvent) -> Result<()> {
        let emoji = &event.reaction.emoji;
        let Some(callbacks) = self.menu.get_callbacks(emoji) else {
            debug!("No option or default for '{}', skipping {:?}", emoji, event.kind);
            return Ok(());
        };
        let Some(handler) = callbacks.handler(event.kind) else {
            return Ok(());
        };

        debug!(
            "Dispatching {:?} on '{}' by {:?}",
            event.kind, emoji, event.user
        );
        let reply = handler(event.reaction.clone(), event.user)
            .await
            .map_err(MenuError::Handler)?;

        if event.kind == ReactionEventKind::Collect && reply == HandlerReply::Retract {
            if let Some(user) = event.user {
                match self.menu.client().remove_vote(&event.reaction, user).await {
                    Ok(()) => debug!("Toggled off {}'s vote on '{}'", user, emoji),
                    Err(e) if e.is_gone() => debug!("Vote to toggle off already gone: {}", e),
                    Err(e) => {
                        warn!("Could not toggle off {}'s vote on '{}': {}", user, emoji, e)
                    }
                }
            }
        }

        Ok(())
    }
}
