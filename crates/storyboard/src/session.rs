use storyboard_core::{
    ConversationSnapshot, Controller, ControllerBuilder, InvalidOperation,
    OptionPolicy, PendingOperation, TranscriptEntry,
};
use storyboard_model::{ImageGenerator, PromptExtractor};
use storyboard_remote::{CompletionPromptExtractor, ImagineClient};

use crate::config::Config;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    controller_builder: ControllerBuilder,
}

impl SessionBuilder {
    /// Creates a session builder that talks to the configured HTTP
    /// services.
    pub fn with_config(config: Config) -> Self {
        Self::with_services(
            CompletionPromptExtractor::new(config.completion),
            ImagineClient::new(config.imagine),
        )
    }

    /// Creates a session builder with the specified remote services.
    pub fn with_services<E, G>(extractor: E, generator: G) -> Self
    where
        E: PromptExtractor + 'static,
        G: ImageGenerator + 'static,
    {
        let controller_builder =
            ControllerBuilder::with_services(extractor, generator);
        Self { controller_builder }
    }

    /// Sets which prompts are accepted for image generation.
    #[inline]
    pub fn with_option_policy(mut self, policy: OptionPolicy) -> Self {
        self.controller_builder =
            self.controller_builder.with_option_policy(policy);
        self
    }

    /// Attaches a callback to be invoked when an entry is appended to the
    /// transcript.
    #[inline]
    pub fn on_entry(
        mut self,
        on_entry: impl Fn(&TranscriptEntry, usize) + Send + Sync + 'static,
    ) -> Self {
        self.controller_builder =
            self.controller_builder.on_entry_appended(on_entry);
        self
    }

    /// Attaches a callback to be invoked when the session becomes busy or
    /// idle.
    #[inline]
    pub fn on_busy_changed(
        mut self,
        on_busy_changed: impl Fn(bool) + Send + Sync + 'static,
    ) -> Self {
        self.controller_builder =
            self.controller_builder.on_busy_changed(on_busy_changed);
        self
    }

    /// Builds a new session.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(self) -> Session {
        Session {
            controller: self.controller_builder.build(),
        }
    }
}

/// A chat session, like a window that displays messages and has an input
/// box.
///
/// The session is a thin wrapper around [`Controller`] that speaks in
/// terms of what a user does: typing a message, and picking one of the
/// numbered options the bot offered.
#[derive(Clone)]
pub struct Session {
    controller: Controller,
}

impl Session {
    /// Types `message` into the input box and sends it.
    pub async fn send_message(
        &self,
        message: &str,
    ) -> Result<PendingOperation, InvalidOperation> {
        self.controller.update_draft(message);
        self.controller.submit_draft().await
    }

    /// Picks option `number` (counting from 1) of the latest offer.
    pub async fn choose_option(
        &self,
        number: usize,
    ) -> Result<PendingOperation, InvalidOperation> {
        let snapshot = self.controller.snapshot().await;
        let prompt = number
            .checked_sub(1)
            .and_then(|i| snapshot.latest_options()?.get(i).cloned())
            .ok_or(InvalidOperation::UnknownPrompt)?;
        self.controller.submit_image_choice(prompt).await
    }

    /// Asks for an image of `prompt`, which must pass the option policy.
    #[inline]
    pub async fn draw(
        &self,
        prompt: &str,
    ) -> Result<PendingOperation, InvalidOperation> {
        self.controller.submit_image_choice(prompt).await
    }

    /// Returns a copy of the conversation.
    #[inline]
    pub async fn snapshot(&self) -> ConversationSnapshot {
        self.controller.snapshot().await
    }

    /// Returns the underlying controller.
    #[inline]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }
}
