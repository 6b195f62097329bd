//! The conversation controller.

mod builder;
mod state;
#[cfg(test)]
mod tests;

use serde::Serialize;
use storyboard_actor::Actor;
use tokio::sync::oneshot;

use crate::error::{InvalidOperation, RequestFailed};
use crate::service_client::{ExtractionClient, GenerationClient};
use crate::transcript::{Transcript, TranscriptEntry};
pub use builder::ControllerBuilder;
use state::{ConversationState, UpdateDraft};

/// Which prompts [`Controller::submit_image_choice`] accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OptionPolicy {
    /// Any prompt offered by some entry of the transcript.
    #[default]
    AnyOffered,
    /// Only prompts offered by the most recent offer.
    Latest,
    /// Any non-empty prompt, offered or not.
    Unchecked,
}

impl OptionPolicy {
    fn permits(self, transcript: &Transcript, prompt: &str) -> bool {
        let contains = |options: &[String]| options.iter().any(|o| o == prompt);
        match self {
            OptionPolicy::AnyOffered => {
                transcript.offered_options().any(contains)
            }
            OptionPolicy::Latest => transcript
                .offered_options()
                .next_back()
                .is_some_and(contains),
            OptionPolicy::Unchecked => true,
        }
    }
}

/// A read-only copy of the conversation, for displaying it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    /// All transcript entries in display order.
    pub entries: Vec<TranscriptEntry>,
    /// Whether a remote request is outstanding.
    pub busy: bool,
    /// The unsent input.
    pub draft: String,
}

impl ConversationSnapshot {
    /// Returns the options of the most recent offer, if any.
    #[inline]
    pub fn latest_options(&self) -> Option<&[String]> {
        self.entries.iter().rev().find_map(TranscriptEntry::options)
    }
}

/// The report of an accepted operation once it has settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settled {
    /// The entry appended in response to the operation.
    pub response: TranscriptEntry,
    /// The failure behind the response, if the request failed.
    pub error: Option<RequestFailed>,
}

/// An accepted operation that may still be waiting for its request.
#[derive(Debug)]
#[must_use = "dropping the handle doesn't cancel the operation"]
pub struct PendingOperation {
    settled_rx: oneshot::Receiver<Settled>,
}

impl PendingOperation {
    /// Waits until the operation settles.
    ///
    /// By then the response entry has been appended and the controller
    /// is idle again.
    pub async fn settled(self) -> Settled {
        self.settled_rx
            .await
            .expect("controller task has been dropped too early")
    }
}

struct ControllerState {
    extraction_client: ExtractionClient,
    generation_client: GenerationClient,
    option_policy: OptionPolicy,
    conversation: ConversationState,
    pending_reply: Option<oneshot::Sender<Settled>>,

    on_busy_changed: Option<Box<dyn Fn(bool) + Send + Sync>>,
}

/// The conversation controller, which owns the transcript and sequences
/// requests to the remote services.
///
/// The controller serves one operation at a time. While a request is
/// outstanding it is busy, and every other submission is rejected with
/// [`InvalidOperation::Busy`] rather than queued. A busy controller
/// always becomes idle again once the request settles, whether it
/// succeeded, failed, or its task died.
///
/// Cloning the controller gives another handle to the same conversation.
#[derive(Clone)]
pub struct Controller {
    handle: Actor<ControllerState>,
}

impl Controller {
    /// Submits free-form text for prompt extraction.
    ///
    /// On acceptance, the text has been appended to the transcript, the
    /// draft has been cleared, and the controller is busy.
    pub async fn submit_text<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<PendingOperation, InvalidOperation> {
        let text = text.into();
        self.ask(move |state, handle| state.submit_text(text, handle))
            .await
    }

    /// Submits the current draft, like pressing enter in the input box.
    pub async fn submit_draft(
        &self,
    ) -> Result<PendingOperation, InvalidOperation> {
        self.ask(|state, handle| {
            let draft = state.conversation.draft.clone();
            state.submit_text(draft, handle)
        })
        .await
    }

    /// Submits an offered prompt for image generation.
    pub async fn submit_image_choice<S: Into<String>>(
        &self,
        prompt: S,
    ) -> Result<PendingOperation, InvalidOperation> {
        let prompt = prompt.into();
        self.ask(move |state, handle| state.submit_image_choice(prompt, handle))
            .await
    }

    /// Replaces the unsent input.
    pub fn update_draft<S: Into<String>>(&self, draft: S) {
        self.handle
            .send(UpdateDraft(draft.into()))
            .expect("controller task has been dropped too early");
    }

    /// Returns a copy of the current conversation.
    ///
    /// The snapshot reflects every operation submitted before this call.
    pub async fn snapshot(&self) -> ConversationSnapshot {
        self.handle
            .ask(|state, _| state.conversation.snapshot())
            .await
            .expect("controller task has been dropped too early")
    }

    async fn ask<F>(&self, f: F) -> Result<PendingOperation, InvalidOperation>
    where
        F: FnOnce(
                &mut ControllerState,
                &Actor<ControllerState>,
            ) -> Result<oneshot::Receiver<Settled>, InvalidOperation>
            + Send
            + 'static,
    {
        let settled_rx = self
            .handle
            .ask(f)
            .await
            .expect("controller task has been dropped too early")?;
        Ok(PendingOperation { settled_rx })
    }

    fn spawn_from_builder(builder: ControllerBuilder) -> Self {
        let ControllerBuilder {
            extraction_client,
            generation_client,
            option_policy,
            on_entry_appended,
            on_busy_changed,
        } = builder;

        let mut transcript = Transcript::new();
        for observer in on_entry_appended {
            transcript.observe(observer);
        }

        let state = ControllerState {
            extraction_client,
            generation_client,
            option_policy,
            conversation: ConversationState::new(transcript),
            pending_reply: None,
            on_busy_changed,
        };
        Self {
            handle: Actor::spawn(state, Some("controller")),
        }
    }
}
