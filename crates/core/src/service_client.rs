use std::pin::Pin;
use std::sync::Arc;

use storyboard_model::{ImageGenerator, ImageRef, PromptExtractor};
use tracing::Instrument;

use crate::error::{RequestFailed, ServiceKind};

pub type ExtractionResult = Result<Vec<String>, RequestFailed>;
pub type GenerationResult = Result<ImageRef, RequestFailed>;

type BoxedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type HandlerFn<T> = Arc<dyn Fn(String) -> BoxedFuture<T> + Send + Sync>;

/// A type-erased wrapper around a [`PromptExtractor`].
///
/// Errors of the concrete extractor are flattened into [`RequestFailed`],
/// so the controller deals with a single error type.
#[derive(Clone)]
pub struct ExtractionClient {
    handler_fn: HandlerFn<ExtractionResult>,
}

impl ExtractionClient {
    pub fn new<E: PromptExtractor + 'static>(extractor: E) -> Self {
        let handler_fn: HandlerFn<ExtractionResult> =
            Arc::new(move |text: String| -> BoxedFuture<ExtractionResult> {
                let fut = extractor.extract_prompts(&text);
                Box::pin(
                    async move {
                        trace!("extracting prompts from {} bytes", text.len());
                        match fut.await {
                            Ok(prompts) => {
                                debug!("got {} prompts", prompts.len());
                                Ok(prompts)
                            }
                            Err(err) => {
                                error!("got an error: {err:?}");
                                Err(RequestFailed::from_service_error(
                                    ServiceKind::Extraction,
                                    &err,
                                ))
                            }
                        }
                    }
                    .instrument(trace_span!("extraction req")),
                )
            });
        Self { handler_fn }
    }

    /// Sends `text` to the extractor.
    #[inline]
    pub async fn extract_prompts(&self, text: String) -> ExtractionResult {
        (self.handler_fn)(text).await
    }
}

/// A type-erased wrapper around an [`ImageGenerator`].
#[derive(Clone)]
pub struct GenerationClient {
    handler_fn: HandlerFn<GenerationResult>,
}

impl GenerationClient {
    pub fn new<G: ImageGenerator + 'static>(generator: G) -> Self {
        let handler_fn: HandlerFn<GenerationResult> =
            Arc::new(move |prompt: String| -> BoxedFuture<GenerationResult> {
                let fut = generator.generate_image(&prompt);
                Box::pin(
                    async move {
                        trace!("generating image for {prompt:?}");
                        match fut.await {
                            Ok(image_ref) => {
                                debug!("got image {image_ref}");
                                Ok(image_ref)
                            }
                            Err(err) => {
                                error!("got an error: {err:?}");
                                Err(RequestFailed::from_service_error(
                                    ServiceKind::Generation,
                                    &err,
                                ))
                            }
                        }
                    }
                    .instrument(trace_span!("generation req")),
                )
            });
        Self { handler_fn }
    }

    /// Sends `prompt` to the generator.
    #[inline]
    pub async fn generate_image(&self, prompt: String) -> GenerationResult {
        (self.handler_fn)(prompt).await
    }
}
