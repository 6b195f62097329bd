use std::fmt::{self, Display, Formatter};

/// The kind of error that occurred while calling a remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never reached the service, or the connection broke.
    Network,
    /// The service answered with a non-success status.
    Rejected,
    /// The service is rate limited.
    RateLimitExceeded,
    /// The service answered, but the payload is unusable.
    InvalidResponse,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "Network error"),
            ErrorKind::Rejected => write!(f, "Request rejected"),
            ErrorKind::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ErrorKind::InvalidResponse => write!(f, "Invalid response"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
