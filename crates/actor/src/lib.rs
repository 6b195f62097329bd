//! A minimal actor runtime on top of tokio.
//!
//! An actor owns a piece of state inside a single task. Everything that
//! wants to read or change that state goes through the actor's mailbox,
//! so handlers never run concurrently and never need locks.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

pub use error::ActorDeadError;
pub use handle::Actor;
pub use mailbox::Message;
