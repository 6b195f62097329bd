use std::sync::Arc;

use tracing::Instrument;

use crate::mailbox::{Ask, Mailbox};
use crate::scheduler::run_actor;
use crate::{ActorDeadError, Message};

/// Handle to an actor.
///
/// The actor keeps running as long as at least one handle is alive. Tasks
/// spawned on behalf of the actor can hold a clone to report back.
pub struct Actor<S> {
    mailbox: Arc<Mailbox<S>>,
}

impl<S: Send + 'static> Actor<S> {
    /// Spawns a new actor with the specified state and an optional label.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(state: S, label: Option<&str>) -> Self {
        let (mailbox, msg_rx) = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_actor(Arc::downgrade(&mailbox), state, msg_rx)
                .instrument(trace_span!("actor", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub(crate) fn from_mailbox(mailbox: Arc<Mailbox<S>>) -> Self {
        Self { mailbox }
    }

    /// Sends a message to the actor.
    ///
    /// Messages are handled one at a time, in the order they were sent.
    #[inline]
    pub fn send<M: Message<S> + 'static>(
        &self,
        msg: M,
    ) -> Result<(), ActorDeadError> {
        self.mailbox.send(Box::new(msg))
    }

    /// Runs `f` against the actor's state and waits for its result.
    ///
    /// `f` is queued like any other message, so it observes every
    /// message sent before it.
    pub async fn ask<R, F>(&self, f: F) -> Result<R, ActorDeadError>
    where
        R: Send + 'static,
        F: FnOnce(&mut S, &Actor<S>) -> R + Send + 'static,
    {
        let (ask, reply_rx) = Ask::new(f);
        self.send(ask)?;
        reply_rx.await.map_err(|_| ActorDeadError)
    }

    /// Returns `true` if the actor task has ended.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.mailbox.is_closed()
    }
}

impl<S> Clone for Actor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}
