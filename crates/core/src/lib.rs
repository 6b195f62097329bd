//! Core logic of a storyboard session: the transcript, and the
//! controller that turns user actions into remote requests.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod controller;
pub mod error;
mod service_client;
pub mod transcript;

pub use controller::{
    ConversationSnapshot, Controller, ControllerBuilder, OptionPolicy,
    PendingOperation, Settled,
};
pub use error::{InvalidOperation, RequestFailed, ServiceKind};
pub use transcript::{Source, Transcript, TranscriptEntry};
