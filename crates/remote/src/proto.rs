use mime::Mime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storyboard_model::{ErrorKind, ImageRef, PromptParser};

use crate::{CompletionConfig, Error};

const INSTRUCTION_TEMPLATE: &str = include_str!("./instruction.md");

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    prompt: String,
    max_tokens: u32,
    stop: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ImagineRequest<'a> {
    pub prompt: &'a str,
}

// -----------
// Conversions
// -----------

/// Fills the instruction template with the excerpt and the output format
/// `parser` understands.
pub fn create_instruction(excerpt: &str, parser: &PromptParser) -> String {
    // The excerpt goes in last, so placeholders typed by the user are
    // left alone.
    INSTRUCTION_TEMPLATE
        .replace("{{LABEL}}", parser.label())
        .replace("{{TERMINATOR}}", parser.terminator())
        .replace("{{EXCERPT}}", excerpt.trim())
}

#[inline]
pub fn create_completion_request(
    excerpt: &str,
    parser: &PromptParser,
    config: &CompletionConfig,
) -> CompletionRequest {
    CompletionRequest {
        model: config.model.clone(),
        prompt: create_instruction(excerpt, parser),
        max_tokens: config.max_tokens,
        stop: vec![parser.terminator().to_owned()],
    }
}

/// Returns the text of the first choice, or `None` if the body isn't a
/// completion response.
pub fn decode_completion(body: &str) -> Option<String> {
    let resp = match serde_json::from_str::<CompletionResponse>(body) {
        Ok(resp) => resp,
        Err(err) => {
            warn!("malformed completion response: {err}");
            return None;
        }
    };
    let choice = resp.choices.into_iter().next();
    if choice.is_none() {
        warn!("completion response has no choices");
    }
    choice.map(|c| c.text)
}

/// Reads the image reference out of a response body.
///
/// JSON bodies may be a bare string or an object with a `url` or
/// `imageUrl` field. Other bodies are the reference itself.
pub fn decode_image_ref(
    content_type: Option<&Mime>,
    body: &str,
) -> Result<ImageRef, Error> {
    let is_json = content_type.is_some_and(|m| {
        m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)
    });

    let reference = if is_json {
        let value = serde_json::from_str::<Value>(body).map_err(|err| {
            Error::new(format!("{err}"), ErrorKind::InvalidResponse)
        })?;
        match value {
            Value::String(s) => s,
            Value::Object(mut obj) => {
                let url = ["url", "imageUrl"].into_iter().find_map(|key| {
                    match obj.remove(key) {
                        Some(Value::String(s)) => Some(s),
                        _ => None,
                    }
                });
                match url {
                    Some(url) => url,
                    None => {
                        return Err(Error::new(
                            "no image url in response",
                            ErrorKind::InvalidResponse,
                        ));
                    }
                }
            }
            _ => {
                return Err(Error::new(
                    format!("unexpected image response: {value}"),
                    ErrorKind::InvalidResponse,
                ));
            }
        }
    } else {
        body.to_owned()
    };

    let reference = reference.trim();
    if reference.is_empty() {
        return Err(Error::new(
            "empty image reference",
            ErrorKind::InvalidResponse,
        ));
    }
    Ok(ImageRef::new(reference))
}
