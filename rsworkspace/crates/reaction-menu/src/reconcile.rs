//! Reconciliation: converge the reactions on the menu message toward the
//! declared options.
//!
//! A pass always starts from a fresh fetch of the message. Users keep
//! reacting while a pass runs, so nothing observed here is reused by the
//! next pass; concurrent passes are safe because every mutation a pass makes
//! (adding a missing reaction, retracting an invalid vote) is idempotent.

#[path = "reconcile_tests.rs"]
mod reconcile_tests;

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::client::{ReactionClient, RemoteFailure};
use crate::emoji::EmojiKey;
use crate::error::{MenuError, Result};
use crate::option::{Callbacks, DefaultOption};
use crate::pending::PendingSet;
use crate::registry::OptionRegistry;
use crate::types::{Message, MessageRef, Reaction, UserId};

/// Remote mutations performed by one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Emoji the controller reacted with, in registry order.
    pub added: Vec<EmojiKey>,
    /// Individual votes retracted (the controller's own included).
    pub votes_retracted: usize,
    /// Whole reactions removed.
    pub reactions_removed: usize,
    /// The message no longer exists; nothing past the fetch was attempted.
    pub message_gone: bool,
}

impl ReconcileOutcome {
    pub fn mutations(&self) -> usize {
        self.added.len() + self.votes_retracted + self.reactions_removed
    }
}

#[derive(Debug, Default)]
struct ReactionVerdict {
    satisfied: Option<EmojiKey>,
    votes_retracted: usize,
    removed: bool,
}

pub(crate) struct Reconciler<'a, C> {
    pub client: &'a C,
    pub me: UserId,
    pub registry: &'a OptionRegistry,
    pub default: Option<&'a DefaultOption>,
}

impl<C: ReactionClient> Reconciler<'_, C> {
    /// Run one pass. Returns the refreshed message (`None` if it is gone).
    pub async fn run(&self, target: MessageRef) -> Result<(Option<Message>, ReconcileOutcome)> {
        let mut outcome = ReconcileOutcome::default();

        let message = match self.client.fetch_message(target).await {
            Ok(message) => message,
            Err(e) if e.is_gone() => {
                warn!("Menu message {} is gone: {}", target, e);
                outcome.message_gone = true;
                return Ok((None, outcome));
            }
            Err(e) => return Err(MenuError::remote(e)),
        };

        let verdicts = try_join_all(
            message
                .reactions
                .iter()
                .cloned()
                .map(|reaction| self.judge(reaction)),
        )
        .await?;

        let mut satisfied = PendingSet::new();
        for verdict in verdicts {
            outcome.votes_retracted += verdict.votes_retracted;
            outcome.reactions_removed += usize::from(verdict.removed);
            satisfied.extend(verdict.satisfied);
        }

        for option in self.registry.values() {
            if satisfied.has(&option.emoji) || !option.is_offered() {
                continue;
            }
            match self.client.add_reaction(target, &option.emoji).await {
                Ok(()) => {
                    debug!("Added reaction '{}' to menu {}", option.emoji, target);
                    outcome.added.push(option.emoji.clone());
                }
                Err(e) if e.is_gone() => {
                    warn!("Could not add '{}' to menu {}: {}", option.emoji, target, e);
                }
                Err(e) => return Err(MenuError::remote(e)),
            }
        }

        Ok((Some(message), outcome))
    }

    /// Fetch one reaction's voters and prune what policy rejects.
    async fn judge(&self, reaction: Reaction) -> Result<ReactionVerdict> {
        let mut verdict = ReactionVerdict::default();

        let reactors = match self.client.fetch_reactors(&reaction).await {
            Ok(reactors) => reactors,
            Err(e) if e.is_gone() => {
                debug!("Reaction '{}' vanished before fetch: {}", reaction.emoji, e);
                return Ok(verdict);
            }
            Err(e) => return Err(MenuError::remote(e)),
        };
        if reactors.is_empty() {
            return Ok(verdict);
        }

        let option = self.registry.get(&reaction.emoji);
        let offered = option.as_ref().filter(|o| o.is_offered());

        if offered.is_none() {
            let rejected = self
                .default
                .and_then(|d| d.callbacks.validate(&reaction, None))
                == Some(false);
            if rejected {
                if self.tolerate(self.client.remove_reaction(&reaction).await)? {
                    debug!("Removed unrecognised reaction '{}'", reaction.emoji);
                    verdict.removed = true;
                }
                return Ok(verdict);
            }
            if reactors.contains(&self.me)
                && self.tolerate(self.client.remove_vote(&reaction, self.me).await)?
            {
                debug!("Withdrew own vote on '{}'", reaction.emoji);
                verdict.votes_retracted += 1;
            }
        }

        let callbacks: Option<&Callbacks> = match &option {
            Some(option) => Some(&option.callbacks),
            None => self.default.map(|d| &d.callbacks),
        };

        let mut survivors = 0usize;
        for user in reactors {
            if user == self.me {
                survivors += usize::from(offered.is_some());
                continue;
            }
            let keep = callbacks
                .and_then(|c| c.validate(&reaction, Some(user)))
                .unwrap_or(true);
            if keep {
                survivors += 1;
            } else if self.tolerate(self.client.remove_vote(&reaction, user).await)? {
                debug!("Retracted invalid vote by {} on '{}'", user, reaction.emoji);
                verdict.votes_retracted += 1;
            }
        }

        if let Some(option) = offered {
            if survivors > 0 {
                verdict.satisfied = Some(option.emoji.clone());
            }
        }

        Ok(verdict)
    }

    /// `Ok(true)` on success, `Ok(false)` if the target was already gone.
    fn tolerate(&self, result: std::result::Result<(), C::Error>) -> Result<bool> {
        match result {
            Ok(()) => Ok(true),
            Err(e) if e.is_gone() => {
                debug!("Ignoring removal of vanished target: {}", e);
                Ok(false)
            }
            Err(e) => Err(MenuError::remote(e)),
        }
    }
}
