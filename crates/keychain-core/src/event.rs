//! Observability hook for keychain operations.
//!
//! Every facade operation reports one [`KeychainEvent`] to the installed
//! [`EventSink`]. Events carry the operation and its outcome only; domains,
//! tags and passwords never reach a sink. Sinks observe and cannot influence
//! the operation.

use std::fmt;

/// Facade operation that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Keychain created from a password
    Init,
    /// Entry inserted or replaced
    Set,
    /// Entry looked up
    Get,
    /// Entry removal attempted
    Remove,
    /// Store serialized
    Dump,
    /// Store restored from its serialized form
    Load,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Set => "set",
            Self::Get => "get",
            Self::Remove => "remove",
            Self::Dump => "dump",
            Self::Load => "load",
        };
        f.write_str(name)
    }
}

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Operation completed
    Ok,
    /// Lookup or removal found an entry
    Found,
    /// No entry under the domain's tag
    NotFound,
    /// An entry exists but failed authentication or domain binding
    Rejected,
    /// Operation returned an error
    Failed,
}

impl Outcome {
    /// Whether the operation failed or refused a stored entry.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Rejected | Self::Failed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "ok",
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One observed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeychainEvent {
    /// Which operation ran
    pub operation: Operation,
    /// How it ended
    pub outcome: Outcome,
}

impl KeychainEvent {
    /// Create an event.
    pub fn new(operation: Operation, outcome: Outcome) -> Self {
        Self { operation, outcome }
    }
}

/// Receiver for keychain events.
pub trait EventSink: Send + Sync {
    /// Observe one event.
    fn record(&self, event: &KeychainEvent);
}

/// Emits events through `tracing`: failures at warn, the rest at debug.
/// Installed by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &KeychainEvent) {
        if event.outcome.is_failure() {
            tracing::warn!(
                operation = %event.operation,
                outcome = %event.outcome,
                "keychain operation"
            );
        } else {
            tracing::debug!(
                operation = %event.operation,
                outcome = %event.outcome,
                "keychain operation"
            );
        }
    }
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: &KeychainEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_snake_case() {
        assert_eq!(Operation::Remove.to_string(), "remove");
        assert_eq!(Outcome::NotFound.to_string(), "not_found");
    }

    #[test]
    fn only_rejections_and_errors_are_failures() {
        let failures: Vec<_> =
            [Outcome::Ok, Outcome::Found, Outcome::NotFound, Outcome::Rejected, Outcome::Failed]
                .into_iter()
                .filter(|outcome| outcome.is_failure())
                .collect();
        assert_eq!(failures, [Outcome::Rejected, Outcome::Failed]);
    }
}
