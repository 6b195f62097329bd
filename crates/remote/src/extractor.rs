use std::sync::Arc;

use reqwest::{Client, Response, header};
use storyboard_model::{PromptExtractor, PromptParser};

use crate::{CompletionConfig, Error, proto};

/// A [`PromptExtractor`] backed by a text completions endpoint.
///
/// The excerpt is wrapped in an instruction that asks the model to answer
/// with a delimited prompt list, which is then read by a
/// [`PromptParser`].
#[derive(Clone, Debug)]
pub struct CompletionPromptExtractor {
    client: Client,
    config: Arc<CompletionConfig>,
    parser: Arc<PromptParser>,
}

impl CompletionPromptExtractor {
    /// Creates an extractor that uses the default prompt grammar.
    #[inline]
    pub fn new(config: CompletionConfig) -> Self {
        Self::with_parser(config, PromptParser::default())
    }

    /// Creates an extractor that asks for, and reads, the grammar of
    /// `parser`.
    #[inline]
    pub fn with_parser(config: CompletionConfig, parser: PromptParser) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
            parser: Arc::new(parser),
        }
    }
}

impl PromptExtractor for CompletionPromptExtractor {
    type Error = Error;

    fn extract_prompts(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'static
    {
        let req = proto::create_completion_request(
            text,
            &self.parser,
            &self.config,
        );
        let builder = self
            .client
            .post(&self.config.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(&req);
        let resp_fut = self
            .config
            .auth_scheme
            .apply(builder, &self.config.api_key)
            .send();
        let parser = Arc::clone(&self.parser);

        async move {
            let resp = resp_fut.await.and_then(Response::error_for_status)?;
            let body = resp.text().await?;

            // Whatever the model answered, an unreadable answer only means
            // there is nothing to offer.
            let Some(completion) = proto::decode_completion(&body) else {
                return Ok(vec![]);
            };
            let prompts = parser.parse(completion.trim());
            if prompts.is_empty() {
                debug!("no prompts in completion: {completion:?}");
            }
            Ok(prompts)
        }
    }
}
