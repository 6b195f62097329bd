//! Contracts for the remote services a storyboard session talks to.
//!
//! A session needs two collaborators: one that reads free-form text and
//! proposes prompts suitable for image generation, and one that turns a
//! single prompt into an image. This crate establishes the protocol both
//! of them must follow, so that the conversation logic never depends on a
//! concrete HTTP backend.
//!
//! Types in this crate don't define any network behavior. The only logic
//! living here is the grammar of the delimited prompt list, which is
//! shared by every extractor that reads a completion-style response.

#![deny(missing_docs)]

mod error;
mod image;
mod prompts;
mod service;

pub use error::*;
pub use image::*;
pub use prompts::*;
pub use service::*;
