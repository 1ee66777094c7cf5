//! Structured events emitted by the zone record manager
//!
//! The manager reports progress through an injected [`ChallengeObserver`]
//! instead of logging inline. [`TracingObserver`] is the default and forwards
//! every event to `tracing`.

use std::fmt;

use crate::zone::{RelativeName, Zone};

/// Which record operation an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Creating the challenge record
    Upsert,
    /// Removing conflicting TXT records before creation
    ConflictCleanup,
    /// Removing the challenge record after validation
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Upsert => write!(f, "upsert"),
            Operation::ConflictCleanup => write!(f, "conflict_cleanup"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Progress of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Started,
    Succeeded,
    /// The operation failed; for best-effort operations this is only a warning
    Failed,
    /// Nothing to do (e.g. no conflicting records)
    Skipped,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Started => write!(f, "started"),
            Stage::Succeeded => write!(f, "succeeded"),
            Stage::Failed => write!(f, "failed"),
            Stage::Skipped => write!(f, "skipped"),
        }
    }
}

/// A single structured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeEvent {
    pub operation: Operation,
    pub stage: Stage,
    pub domain: String,
    pub zone: Zone,
    pub relative_name: RelativeName,
    /// Error text for failures, record counts for cleanup
    pub detail: Option<String>,
}

impl ChallengeEvent {
    pub fn new(
        operation: Operation,
        stage: Stage,
        domain: &str,
        zone: &Zone,
        relative_name: &RelativeName,
    ) -> Self {
        Self {
            operation,
            stage,
            domain: domain.to_string(),
            zone: zone.clone(),
            relative_name: relative_name.clone(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Receives events from the zone record manager
pub trait ChallengeObserver: Send + Sync {
    fn on_event(&self, event: &ChallengeEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ChallengeObserver for TracingObserver {
    fn on_event(&self, event: &ChallengeEvent) {
        let detail = event.detail.as_deref().unwrap_or("");
        match event.stage {
            Stage::Failed => tracing::warn!(
                operation = %event.operation,
                domain = %event.domain,
                zone = %event.zone,
                relative_name = %event.relative_name,
                detail,
                "TXT record {} failed",
                event.operation
            ),
            Stage::Started => tracing::debug!(
                operation = %event.operation,
                domain = %event.domain,
                zone = %event.zone,
                relative_name = %event.relative_name,
                "TXT record {} started",
                event.operation
            ),
            stage => tracing::info!(
                operation = %event.operation,
                domain = %event.domain,
                zone = %event.zone,
                relative_name = %event.relative_name,
                detail,
                "TXT record {} {}",
                event.operation,
                stage
            ),
        }
    }
}
