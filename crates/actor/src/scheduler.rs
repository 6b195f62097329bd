use std::sync::Weak;

use tokio::sync::mpsc;

use crate::Actor;
use crate::mailbox::{BoxedMessage, Mailbox};

/// Drives the actor until every handle has been dropped.
pub async fn run_actor<S: Send + 'static>(
    mailbox: Weak<Mailbox<S>>,
    mut state: S,
    mut msg_rx: mpsc::UnboundedReceiver<BoxedMessage<S>>,
) {
    debug!("started");
    while let Some(msg) = msg_rx.recv().await {
        trace!("received message: {msg:?}");

        // Handles own the mailbox. If none is left, nobody can observe
        // what this message would change.
        let Some(mailbox) = mailbox.upgrade() else {
            warn!("last handle has been dropped, discard the message");
            break;
        };

        trace_span!("proc msg").in_scope(|| {
            msg.handle_box(&mut state, &Actor::from_mailbox(mailbox));
            trace!("finished");
        });
    }
    debug!("will terminate");
}
