//! Errors reported by the conversation controller.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use storyboard_model::{ErrorKind, ServiceError};

/// The remote service a request was sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// The prompt extraction service.
    Extraction,
    /// The image generation service.
    Generation,
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Extraction => write!(f, "prompt extraction"),
            ServiceKind::Generation => write!(f, "image generation"),
        }
    }
}

/// A request to a remote service failed.
///
/// The controller never lets this escape to the caller of a submit
/// operation. It is turned into a transcript entry, and attached to the
/// [`Settled`](crate::controller::Settled) report of the operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestFailed {
    service: ServiceKind,
    kind: ErrorKind,
    message: String,
}

impl RequestFailed {
    pub(crate) fn from_service_error<E: ServiceError>(
        service: ServiceKind,
        err: &E,
    ) -> Self {
        Self {
            service,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// The request task ended without reporting a result.
    pub(crate) fn aborted(service: ServiceKind) -> Self {
        Self {
            service,
            kind: ErrorKind::Other,
            message: "the request was aborted before it settled".to_owned(),
        }
    }

    /// Returns the service the request was sent to.
    #[inline]
    pub fn service(&self) -> ServiceKind {
        self.service
    }

    /// Returns the kind of the underlying service error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for RequestFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} request failed: {}", self.service, self.message)
    }
}

impl Error for RequestFailed {}

/// An operation was rejected without changing the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidOperation {
    /// A remote request is still outstanding.
    Busy,
    /// The submitted text is empty or only whitespace.
    EmptyText,
    /// The chosen prompt was never offered.
    UnknownPrompt,
}

impl Display for InvalidOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InvalidOperation::Busy => {
                write!(f, "a request is still in flight")
            }
            InvalidOperation::EmptyText => write!(f, "the text is empty"),
            InvalidOperation::UnknownPrompt => {
                write!(f, "the prompt was not offered")
            }
        }
    }
}

impl Error for InvalidOperation {}
