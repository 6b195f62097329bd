//! A storyboard session that turns prose into image prompts, and prompts
//! into pictures.
//!
//! The crate includes a CLI tool for using in the terminal. And you can
//! also use it as a library to put a storyboard session behind your own
//! front end.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod config;
mod session;

pub use config::Config;
pub use session::{Session, SessionBuilder};

/// Re-exports of [`storyboard_core`] crate.
pub mod core {
    pub use storyboard_core::*;
}
