use std::error::Error;
use std::fmt;

/// Returned when a message is sent to an actor whose task has ended.
pub struct ActorDeadError;

impl fmt::Debug for ActorDeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActorDeadError")
    }
}

impl fmt::Display for ActorDeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "the actor task has ended".fmt(f)
    }
}

impl Error for ActorDeadError {}
