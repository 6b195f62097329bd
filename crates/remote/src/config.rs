use std::fmt::{self, Debug, Formatter};

use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, HeaderName};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo-instruct";
const DEFAULT_MAX_TOKENS: u32 = 4000;

/// How the API key is attached to a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`, as OpenAI expects.
    #[default]
    Bearer,
    /// `Api-Key: <key>`, as Azure OpenAI deployments expect.
    ApiKey,
}

impl AuthScheme {
    pub(crate) fn apply(
        self,
        builder: RequestBuilder,
        api_key: &str,
    ) -> RequestBuilder {
        match self {
            AuthScheme::Bearer => {
                builder.header(AUTHORIZATION, format!("Bearer {api_key}"))
            }
            AuthScheme::ApiKey => {
                builder.header(HeaderName::from_static("api-key"), api_key)
            }
        }
    }
}

/// Builder for [`CompletionConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompletionConfigBuilder {
    api_key: String,
    auth_scheme: AuthScheme,
    endpoint: Option<String>,
    model: Option<Option<String>>,
    max_tokens: Option<u32>,
}

impl CompletionConfigBuilder {
    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            auth_scheme: AuthScheme::default(),
            endpoint: None,
            model: None,
            max_tokens: None,
        }
    }

    /// Sets how the API key is sent.
    #[inline]
    pub fn with_auth_scheme(mut self, auth_scheme: AuthScheme) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    /// Sets the full URL of the completions endpoint.
    #[inline]
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(Some(model.into()));
        self
    }

    /// Leaves the model out of requests. Deployment-scoped endpoints
    /// choose the model from the URL.
    #[inline]
    pub fn without_model(mut self) -> Self {
        self.model = Some(None);
        self
    }

    /// Sets the token limit of a completion.
    #[inline]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> CompletionConfig {
        CompletionConfig {
            api_key: self.api_key,
            auth_scheme: self.auth_scheme,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
            model: self
                .model
                .unwrap_or_else(|| Some(DEFAULT_MODEL.to_owned())),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

impl Debug for CompletionConfigBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfigBuilder")
            .field("api_key", &"<redacted>")
            .field("auth_scheme", &self.auth_scheme)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Configuration for the completion-based prompt extractor.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompletionConfig {
    pub(crate) api_key: String,
    pub(crate) auth_scheme: AuthScheme,
    pub(crate) endpoint: String,
    pub(crate) model: Option<String>,
    pub(crate) max_tokens: u32,
}

impl Debug for CompletionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("auth_scheme", &self.auth_scheme)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Builder for [`ImagineConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImagineConfigBuilder {
    endpoint: String,
    api_key: Option<String>,
}

impl ImagineConfigBuilder {
    /// Creates a builder with the full URL of the image endpoint.
    #[inline]
    pub fn with_endpoint<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Sets a bearer token for the image endpoint.
    #[inline]
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> ImagineConfig {
        ImagineConfig {
            endpoint: self.endpoint,
            api_key: self.api_key,
        }
    }
}

impl Debug for ImagineConfigBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagineConfigBuilder")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration for the image generation client.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImagineConfig {
    pub(crate) endpoint: String,
    pub(crate) api_key: Option<String>,
}

impl Debug for ImagineConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagineConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompletionConfigBuilder::with_api_key("sk-secret").build();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model.as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.auth_scheme, AuthScheme::Bearer);

        let config = CompletionConfigBuilder::with_api_key("sk-secret")
            .with_auth_scheme(AuthScheme::ApiKey)
            .without_model()
            .build();
        assert_eq!(config.model, None);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = CompletionConfigBuilder::with_api_key("sk-secret")
            .with_max_tokens(100)
            .build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("max_tokens: 100"));

        let config = ImagineConfigBuilder::with_endpoint("http://localhost/imagine")
            .with_api_key("img-secret")
            .build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("img-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
