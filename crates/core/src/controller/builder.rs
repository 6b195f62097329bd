use storyboard_model::{ImageGenerator, PromptExtractor};

use super::{Controller, OptionPolicy};
use crate::service_client::{ExtractionClient, GenerationClient};
use crate::transcript::TranscriptEntry;

type EntryObserver = Box<dyn Fn(&TranscriptEntry, usize) + Send + Sync>;

/// [`Controller`] builder.
pub struct ControllerBuilder {
    pub(crate) extraction_client: ExtractionClient,
    pub(crate) generation_client: GenerationClient,
    pub(crate) option_policy: OptionPolicy,
    pub(crate) on_entry_appended: Vec<EntryObserver>,
    pub(crate) on_busy_changed: Option<Box<dyn Fn(bool) + Send + Sync>>,
}

impl ControllerBuilder {
    /// Creates a new builder with the specified remote services.
    #[inline]
    pub fn with_services<E, G>(extractor: E, generator: G) -> Self
    where
        E: PromptExtractor + 'static,
        G: ImageGenerator + 'static,
    {
        Self {
            extraction_client: ExtractionClient::new(extractor),
            generation_client: GenerationClient::new(generator),
            option_policy: OptionPolicy::default(),
            on_entry_appended: vec![],
            on_busy_changed: None,
        }
    }

    /// Sets which prompts are accepted for image generation.
    #[inline]
    pub fn with_option_policy(mut self, policy: OptionPolicy) -> Self {
        self.option_policy = policy;
        self
    }

    /// Attaches a callback to be invoked after every transcript append,
    /// with the new entry and its index.
    ///
    /// The greeting is appended while the controller is built, so it is
    /// the first entry every callback sees.
    #[inline]
    pub fn on_entry_appended(
        mut self,
        on_entry_appended: impl Fn(&TranscriptEntry, usize)
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.on_entry_appended.push(Box::new(on_entry_appended));
        self
    }

    /// Attaches a callback to be invoked when the controller becomes busy
    /// or idle.
    #[inline]
    pub fn on_busy_changed(
        mut self,
        on_busy_changed: impl Fn(bool) + Send + Sync + 'static,
    ) -> Self {
        self.on_busy_changed = Some(Box::new(on_busy_changed));
        self
    }

    /// Builds the controller.
    ///
    /// Must be called within a tokio runtime.
    #[inline]
    pub fn build(self) -> Controller {
        Controller::spawn_from_builder(self)
    }
}
