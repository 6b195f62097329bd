//! Local fake services for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use storyboard_model::{
    ErrorKind, ImageGenerator, ImageRef, PromptExtractor, PromptParser,
    ServiceError,
};
use tokio::time::sleep;

pub use preset::*;

const DEFAULT_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

struct Script<T> {
    steps: VecDeque<T>,
    received: Vec<String>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            steps: VecDeque::new(),
            received: Vec::new(),
        }
    }
}

/// Shared script state, consumed one step per request.
struct SharedScript<T>(Arc<Mutex<Script<T>>>);

impl<T> SharedScript<T> {
    #[inline]
    fn lock(&self) -> MutexGuard<'_, Script<T>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_step(&self, input: &str) -> Option<T> {
        let mut script = self.lock();
        script.received.push(input.to_owned());
        script.steps.pop_front()
    }
}

impl<T> Clone for SharedScript<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for SharedScript<T> {
    fn default() -> Self {
        Self(Default::default())
    }
}

/// A fake prompt extractor that answers from a script.
///
/// Every request consumes the next step of the script, and a request
/// arriving after the script ran out fails. Clones share the same script,
/// so a test can keep one clone to push steps or inspect the received
/// inputs after handing the other one over.
#[derive(Clone, Default)]
pub struct ScriptedPromptService {
    script: SharedScript<PresetExtraction>,
    delay: Option<Duration>,
}

impl ScriptedPromptService {
    /// Appends a step to the script.
    #[inline]
    pub fn add_step(&self, preset: PresetExtraction) {
        self.script.lock().steps.push_back(preset);
    }

    /// Sets how long each request takes before it settles.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the texts received so far, in order.
    #[inline]
    pub fn received(&self) -> Vec<String> {
        self.script.lock().received.clone()
    }
}

impl PromptExtractor for ScriptedPromptService {
    type Error = crate::Error;

    fn extract_prompts(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'static
    {
        let step = self.script.next_step(text);
        let delay = self.delay.unwrap_or(DEFAULT_DELAY);
        async move {
            sleep(delay).await;
            match step {
                Some(PresetExtraction::Completion(completion)) => {
                    Ok(PromptParser::default().parse(&completion))
                }
                Some(PresetExtraction::Prompts(prompts)) => Ok(prompts),
                Some(PresetExtraction::Failure(failure)) => Err(Error {
                    message: "scripted extraction failure",
                    kind: failure.kind(),
                }),
                Some(PresetExtraction::Crash) => {
                    panic!("scripted extraction crash")
                }
                None => Err(Error {
                    message: "no enough steps",
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}

/// A fake image generator that answers from a script.
///
/// See [`ScriptedPromptService`] for how the script is consumed.
#[derive(Clone, Default)]
pub struct ScriptedImageService {
    script: SharedScript<PresetImage>,
    delay: Option<Duration>,
}

impl ScriptedImageService {
    /// Appends a step to the script.
    #[inline]
    pub fn add_step(&self, preset: PresetImage) {
        self.script.lock().steps.push_back(preset);
    }

    /// Sets how long each request takes before it settles.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the prompts received so far, in order.
    #[inline]
    pub fn received(&self) -> Vec<String> {
        self.script.lock().received.clone()
    }
}

impl ImageGenerator for ScriptedImageService {
    type Error = crate::Error;

    fn generate_image(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<ImageRef, Self::Error>> + Send + 'static
    {
        let step = self.script.next_step(prompt);
        let delay = self.delay.unwrap_or(DEFAULT_DELAY);
        async move {
            sleep(delay).await;
            match step {
                Some(PresetImage::Reference(reference)) => {
                    Ok(ImageRef::new(reference))
                }
                Some(PresetImage::Failure(failure)) => Err(Error {
                    message: "scripted generation failure",
                    kind: failure.kind(),
                }),
                Some(PresetImage::Crash) => {
                    panic!("scripted generation crash")
                }
                None => Err(Error {
                    message: "no enough steps",
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}
