//! Single channel for non-fatal, per-item problems found during a run.
//!
//! Neither an unknown fragment nor an unclassifiable record stops the batch.
//! Each is pushed here, logged at warn level, and kept for the run summary.

use serde::Serialize;

use crate::error::ErrorCode;
use crate::event::FragmentKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("unrecognized fragment kind {code} on event {event_id}")]
    UnrecognizedFragmentKind { event_id: String, code: i64 },

    #[error("{kind} fragment {event_id} has no parent id")]
    MalformedFragment { event_id: String, kind: FragmentKind },

    #[error("failed to classify record {record_id}: {description:?}")]
    UnclassifiableRecord {
        record_id: String,
        description: String,
    },

    #[error("stat-loss rating for record {record_id} is not finite")]
    NonFiniteRating { record_id: String },
}

impl Diagnostic {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnrecognizedFragmentKind { .. } => ErrorCode::UnrecognizedFragmentKind,
            Self::MalformedFragment { .. } => ErrorCode::MalformedFragment,
            Self::UnclassifiableRecord { .. } => ErrorCode::UnclassifiableRecord,
            Self::NonFiniteRating { .. } => ErrorCode::NonFiniteRating,
        }
    }
}

/// Serializable view of a diagnostic for JSON summaries.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEntry {
    pub code: &'static str,
    pub message: String,
}

/// Ordered collection of diagnostics raised during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(code = %diagnostic.error_code(), "{diagnostic}");
        self.entries.push(diagnostic);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics carrying `code`.
    #[must_use]
    pub fn count(&self, code: ErrorCode) -> usize {
        self.entries
            .iter()
            .filter(|diagnostic| diagnostic.error_code() == code)
            .count()
    }

    #[must_use]
    pub fn to_entries(&self) -> Vec<DiagnosticEntry> {
        self.entries
            .iter()
            .map(|diagnostic| DiagnosticEntry {
                code: diagnostic.error_code().code(),
                message: diagnostic.to_string(),
            })
            .collect()
    }
}
