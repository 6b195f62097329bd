use std::error::Error;

use crate::error::ErrorKind;
use crate::image::ImageRef;

/// The error type for a remote service.
pub trait ServiceError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A service that reads free-form text and proposes prompts for image
/// generation.
///
/// Once the extractor is created, it should behave like a stateless
/// object. It can still have internal state, but callers should not rely
/// on it, and the extractor should be prepared for being dropped anytime.
pub trait PromptExtractor: Send + Sync {
    /// The error type that may be returned by the extractor.
    type Error: ServiceError;

    /// Extracts candidate prompts from `text`.
    ///
    /// Prompts are returned in the order the service produced them. A
    /// response that cannot be understood yields an empty list instead of
    /// an error; errors are reserved for failures of the request itself.
    ///
    /// The returned future must not borrow `self`, and implementations
    /// must not retry on their own.
    fn extract_prompts(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'static;
}

/// A service that turns one prompt into an image.
pub trait ImageGenerator: Send + Sync {
    /// The error type that may be returned by the generator.
    type Error: ServiceError;

    /// Generates an image for `prompt` and returns a reference to it.
    ///
    /// The returned future must not borrow `self`.
    fn generate_image(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<ImageRef, Self::Error>> + Send + 'static;
}
