//! The conversation transcript.

use std::fmt::{self, Debug, Formatter};

use serde::Serialize;
use storyboard_model::ImageRef;

/// The first entry of every fresh transcript.
pub const GREETING: &str = "Hello, I'm your image bot. How can I help you?";

/// Who produced a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    /// The person chatting.
    User,
    /// The bot backed by the prompt extraction service.
    PromptBot,
    /// The bot backed by the image generation service.
    ImageBot,
}

/// An entry in the transcript.
///
/// Entries can only be built with the constructors below, which keep
/// options on prompt bot entries and image references on image bot
/// entries. Once built, an entry never changes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_ref: Option<ImageRef>,
    source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
}

impl TranscriptEntry {
    #[inline]
    fn text(content: String, source: Source) -> Self {
        Self {
            content,
            image_ref: None,
            source,
            options: None,
        }
    }

    /// Creates an entry typed by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::text(content.into(), Source::User)
    }

    /// Creates a plain prompt bot message.
    #[inline]
    pub fn prompt_bot<S: Into<String>>(content: S) -> Self {
        Self::text(content.into(), Source::PromptBot)
    }

    /// Creates a prompt bot message offering `options` to choose from.
    ///
    /// An empty list offers nothing, so the entry carries no options.
    #[inline]
    pub fn prompt_offer<S: Into<String>>(
        content: S,
        options: Vec<String>,
    ) -> Self {
        Self {
            options: (!options.is_empty()).then_some(options),
            ..Self::prompt_bot(content)
        }
    }

    /// Creates an image bot entry carrying a generated image.
    #[inline]
    pub fn image(image_ref: ImageRef) -> Self {
        Self {
            image_ref: Some(image_ref),
            ..Self::text(String::new(), Source::ImageBot)
        }
    }

    /// Creates an image bot message without an image.
    #[inline]
    pub fn image_bot<S: Into<String>>(content: S) -> Self {
        Self::text(content.into(), Source::ImageBot)
    }

    /// Returns the text shown to the user.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the generated image, if any.
    #[inline]
    pub fn image_ref(&self) -> Option<&ImageRef> {
        self.image_ref.as_ref()
    }

    /// Returns who produced this entry.
    #[inline]
    pub fn source(&self) -> Source {
        self.source
    }

    /// Returns the prompts offered by this entry, if any.
    #[inline]
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }
}

type Observer = Box<dyn Fn(&TranscriptEntry, usize) + Send + Sync>;

/// An append-only log of transcript entries.
///
/// The order of entries is the order they were appended in, which is
/// also the order they are displayed in. Observers are called after
/// every append with the new entry and its index.
#[derive(Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    observers: Vec<Observer>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for appended entries.
    ///
    /// Entries appended before the registration are not replayed.
    #[inline]
    pub fn observe(
        &mut self,
        observer: impl Fn(&TranscriptEntry, usize) + Send + Sync + 'static,
    ) {
        self.observers.push(Box::new(observer));
    }

    /// Appends an entry and returns the new length.
    pub fn append(&mut self, entry: TranscriptEntry) -> usize {
        trace!("append {:?} entry", entry.source);
        self.entries.push(entry);
        let idx = self.entries.len() - 1;
        for observer in &self.observers {
            observer(&self.entries[idx], idx);
        }
        self.entries.len()
    }

    /// Returns all entries in display order.
    #[inline]
    pub fn all(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was appended yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the most recent entry.
    #[inline]
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Returns every offered option list, oldest first.
    pub fn offered_options(
        &self,
    ) -> impl DoubleEndedIterator<Item = &[String]> {
        self.entries.iter().filter_map(TranscriptEntry::options)
    }
}

impl Debug for Transcript {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript")
            .field("entries", &self.entries)
            .field("observers", &self.observers.len())
            .finish()
    }
}
