use std::fmt::{self, Debug};
use std::marker::PhantomData;

use tokio::sync::{mpsc, oneshot};

use crate::{Actor, ActorDeadError};

/// Helper trait for handling boxed messages.
pub trait BoxMessage<S>: Send + Debug + 'static {
    fn handle_box(self: Box<Self>, state: &mut S, handle: &Actor<S>);
}

/// A message that an actor can handle.
pub trait Message<S>: BoxMessage<S> {
    /// Handles the message with exclusive access to the actor's state.
    fn handle(self, state: &mut S, handle: &Actor<S>);
}

impl<S, M: Message<S>> BoxMessage<S> for M {
    #[inline]
    fn handle_box(self: Box<Self>, state: &mut S, handle: &Actor<S>) {
        (*self).handle(state, handle)
    }
}

pub type BoxedMessage<S> = Box<dyn BoxMessage<S>>;

/// A message that runs a closure against the state and replies with
/// its return value.
pub struct Ask<S, R, F> {
    f: F,
    reply_tx: oneshot::Sender<R>,
    _state: PhantomData<fn(&mut S)>,
}

impl<S, R, F> Ask<S, R, F> {
    #[inline]
    pub fn new(f: F) -> (Self, oneshot::Receiver<R>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        let ask = Self {
            f,
            reply_tx,
            _state: PhantomData,
        };
        (ask, reply_rx)
    }
}

impl<S, R, F> Debug for Ask<S, R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ask").finish_non_exhaustive()
    }
}

impl<S, R, F> Message<S> for Ask<S, R, F>
where
    S: 'static,
    R: Send + 'static,
    F: FnOnce(&mut S, &Actor<S>) -> R + Send + 'static,
{
    fn handle(self, state: &mut S, handle: &Actor<S>) {
        let value = (self.f)(state, handle);
        // The asker may have given up waiting, which is fine.
        self.reply_tx.send(value).ok();
    }
}

pub struct Mailbox<S> {
    msg_tx: mpsc::UnboundedSender<BoxedMessage<S>>,
}

impl<S: Send + 'static> Mailbox<S> {
    #[inline]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BoxedMessage<S>>) {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        (Mailbox { msg_tx }, msg_rx)
    }

    #[inline]
    pub fn send(&self, msg: BoxedMessage<S>) -> Result<(), ActorDeadError> {
        self.msg_tx.send(msg).map_err(|_| ActorDeadError)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.msg_tx.is_closed()
    }
}
