use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// An opaque reference to a generated image.
///
/// Most generators hand back a URL, but callers should not rely on that:
/// the reference is only meant to be passed to whatever displays it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Creates a new `ImageRef`.
    #[inline]
    pub fn new<S: Into<String>>(reference: S) -> Self {
        Self(reference.into())
    }

    /// Returns the reference as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ImageRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ImageRef {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ImageRef {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
