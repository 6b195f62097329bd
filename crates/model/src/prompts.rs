/// The label every entry key starts with, unless configured otherwise.
pub const DEFAULT_PROMPT_LABEL: &str = "Midjourneyprompt";

/// The token that marks the end of the prompt list, unless configured
/// otherwise.
pub const DEFAULT_PROMPT_TERMINATOR: &str = "PROMPTEND";

/// A parser for the delimited prompt list produced by a completion model.
///
/// The model is instructed to answer with numbered key-value pairs, and
/// the parser picks the values out of whatever text surrounds them:
///
/// ```text
/// response = *( noise / entry ) [ terminator *any ]
/// entry    = DQUOTE label 1*DIGIT DQUOTE ":" *WS DQUOTE value DQUOTE
/// value    = *( any char except DQUOTE )
/// ```
///
/// `WS` is any Unicode whitespace, line breaks included.
///
/// Scanning stops at the first terminator, or at the end of input if the
/// terminator is missing. Anything that doesn't match `entry` is skipped,
/// so malformed input results in zero or partial matches, never an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PromptParser {
    // `"` followed by the label.
    key_prefix: String,
    terminator: String,
}

impl PromptParser {
    /// Creates a parser with a custom label and terminator.
    #[inline]
    pub fn new<S1: AsRef<str>, S2: Into<String>>(
        label: S1,
        terminator: S2,
    ) -> Self {
        Self {
            key_prefix: format!("\"{}", label.as_ref()),
            terminator: terminator.into(),
        }
    }

    /// Returns the label of the entry keys.
    #[inline]
    pub fn label(&self) -> &str {
        &self.key_prefix[1..]
    }

    /// Returns the terminator token.
    #[inline]
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Parses `text` and returns the values in source order.
    pub fn parse(&self, text: &str) -> Vec<String> {
        let text = if self.terminator.is_empty() {
            text
        } else {
            text.find(&self.terminator).map_or(text, |idx| &text[..idx])
        };

        let mut prompts = vec![];
        let mut rest = text;
        while let Some(idx) = rest.find(&self.key_prefix) {
            let after_key = &rest[idx + self.key_prefix.len()..];
            match parse_entry_tail(after_key) {
                Some((value, remaining)) => {
                    prompts.push(value.to_owned());
                    rest = remaining;
                }
                // Not an entry, keep looking after the key prefix.
                None => rest = after_key,
            }
        }
        prompts
    }
}

impl Default for PromptParser {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_LABEL, DEFAULT_PROMPT_TERMINATOR)
    }
}

/// Parses the part of an entry after its label, returning the value and
/// the remaining input.
fn parse_entry_tail(s: &str) -> Option<(&str, &str)> {
    let digits =
        s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let s = s[digits..].strip_prefix("\":")?;
    let s = s.trim_start().strip_prefix('"')?;
    let end = s.find('"')?;
    Some((&s[..end], &s[end + 1..]))
}
