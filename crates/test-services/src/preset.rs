use serde::{Deserialize, Serialize};
use storyboard_model::ErrorKind;

/// How a scripted extraction step answers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetExtraction {
    /// A raw completion text, parsed with the default prompt grammar.
    #[serde(rename = "completion")]
    Completion(String),
    /// An already parsed prompt list.
    #[serde(rename = "prompts")]
    Prompts(Vec<String>),
    /// The request fails.
    #[serde(rename = "failure")]
    Failure(PresetFailure),
    /// The request future panics before settling.
    #[serde(rename = "crash")]
    Crash,
}

/// How a scripted generation step answers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetImage {
    /// The generated image reference.
    #[serde(rename = "reference")]
    Reference(String),
    /// The request fails.
    #[serde(rename = "failure")]
    Failure(PresetFailure),
    /// The request future panics before settling.
    #[serde(rename = "crash")]
    Crash,
}

/// The failure a scripted step reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetFailure {
    Network,
    Rejected,
    RateLimitExceeded,
    InvalidResponse,
}

impl PresetFailure {
    #[inline]
    pub(crate) fn kind(self) -> ErrorKind {
        match self {
            PresetFailure::Network => ErrorKind::Network,
            PresetFailure::Rejected => ErrorKind::Rejected,
            PresetFailure::RateLimitExceeded => ErrorKind::RateLimitExceeded,
            PresetFailure::InvalidResponse => ErrorKind::InvalidResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_script() {
        let script = r#"[
            { "type": "completion", "data": "\"Midjourneyprompt1\": \"dawn\"" },
            { "type": "prompts", "data": ["dawn", "dusk"] },
            { "type": "failure", "data": "rate_limit_exceeded" },
            { "type": "crash" }
        ]"#;
        let steps: Vec<PresetExtraction> = serde_json::from_str(script).unwrap();
        assert_eq!(
            steps,
            vec![
                PresetExtraction::Completion(
                    "\"Midjourneyprompt1\": \"dawn\"".to_owned()
                ),
                PresetExtraction::Prompts(vec![
                    "dawn".to_owned(),
                    "dusk".to_owned()
                ]),
                PresetExtraction::Failure(PresetFailure::RateLimitExceeded),
                PresetExtraction::Crash,
            ]
        );
        assert_eq!(
            PresetFailure::RateLimitExceeded.kind(),
            ErrorKind::RateLimitExceeded
        );
    }
}
