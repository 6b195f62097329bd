//! Configuration read from the environment.

use std::env;

use anyhow::{Context as _, Result, bail};
use storyboard_remote::{
    AuthScheme, CompletionConfig, CompletionConfigBuilder, ImagineConfig,
    ImagineConfigBuilder,
};

/// Endpoints and credentials of both remote services.
#[derive(Clone, Debug)]
pub struct Config {
    /// Configuration of the prompt extractor.
    pub completion: CompletionConfig,
    /// Configuration of the image generator.
    pub imagine: ImagineConfig,
}

impl Config {
    /// Reads the configuration from the process environment, after loading
    /// a `.env` file from the working directory if there is one.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("loaded environment from {}", path.display()),
            Err(err) if err.not_found() => {}
            Err(err) => warn!("failed to load .env: {err}"),
        }
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which finds a variable by
    /// name.
    ///
    /// `OPENAI_API_KEY` and `IMAGINE_ENDPOINT` are required. Setting
    /// `OPENAI_MODEL` to `none` leaves the model out of requests.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable is not set")?;
        let mut completion = CompletionConfigBuilder::with_api_key(api_key);
        if let Some(endpoint) = var("OPENAI_ENDPOINT") {
            completion = completion.with_endpoint(endpoint);
        }
        match var("OPENAI_MODEL") {
            Some(model) if model.eq_ignore_ascii_case("none") => {
                completion = completion.without_model();
            }
            Some(model) => completion = completion.with_model(model),
            None => {}
        }
        if let Some(scheme) = var("OPENAI_AUTH_SCHEME") {
            let scheme = parse_auth_scheme(&scheme)?;
            completion = completion.with_auth_scheme(scheme);
        }
        if let Some(max_tokens) = var("OPENAI_MAX_TOKENS") {
            let max_tokens = max_tokens.trim().parse::<u32>().with_context(|| {
                format!("invalid OPENAI_MAX_TOKENS: {max_tokens:?}")
            })?;
            completion = completion.with_max_tokens(max_tokens);
        }

        let endpoint = var("IMAGINE_ENDPOINT")
            .context("IMAGINE_ENDPOINT environment variable is not set")?;
        let mut imagine = ImagineConfigBuilder::with_endpoint(endpoint);
        if let Some(api_key) = var("IMAGINE_API_KEY") {
            imagine = imagine.with_api_key(api_key);
        }

        Ok(Self {
            completion: completion.build(),
            imagine: imagine.build(),
        })
    }
}

fn parse_auth_scheme(value: &str) -> Result<AuthScheme> {
    match value.trim().to_ascii_lowercase().as_str() {
        "bearer" => Ok(AuthScheme::Bearer),
        "api-key" | "api_key" | "apikey" => Ok(AuthScheme::ApiKey),
        _ => bail!("unknown OPENAI_AUTH_SCHEME: {value:?}"),
    }
}
