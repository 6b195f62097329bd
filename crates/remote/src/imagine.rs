use std::sync::Arc;

use reqwest::{Client, Response, header};
use storyboard_model::{ImageGenerator, ImageRef};

use crate::proto::{self, ImagineRequest};
use crate::{Error, ImagineConfig, content_type};

/// An [`ImageGenerator`] that posts `{"prompt": ...}` to an image
/// endpoint.
///
/// The endpoint answers with the image reference, either as plain text
/// or as JSON.
#[derive(Clone, Debug)]
pub struct ImagineClient {
    client: Client,
    config: Arc<ImagineConfig>,
}

impl ImagineClient {
    /// Creates a new `ImagineClient` with the given configuration.
    #[inline]
    pub fn new(config: ImagineConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ImageGenerator for ImagineClient {
    type Error = Error;

    fn generate_image(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<ImageRef, Self::Error>> + Send + 'static
    {
        let mut builder = self
            .client
            .post(&self.config.endpoint)
            .header(header::ACCEPT, "application/json, text/plain")
            .json(&ImagineRequest { prompt });
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }
        let resp_fut = builder.send();

        async move {
            let resp = resp_fut.await.and_then(Response::error_for_status)?;
            let content_type = content_type(&resp);
            trace!("image response content type: {content_type:?}");
            let body = resp.text().await?;
            proto::decode_image_ref(content_type.as_ref(), &body)
        }
    }
}
