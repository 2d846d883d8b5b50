use std::fmt;

/// Machine-readable error codes shared by fatal errors and run diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    UnrecognizedFragmentKind,
    MalformedFragment,
    UnclassifiableRecord,
    NonFiniteRating,
    RemoteFetchFailed,
    RemoteDecodeFailed,
    LocalReadFailed,
    OutputWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::UnrecognizedFragmentKind => "E2001",
            Self::MalformedFragment => "E2002",
            Self::UnclassifiableRecord => "E2003",
            Self::NonFiniteRating => "E2004",
            Self::RemoteFetchFailed => "E3001",
            Self::RemoteDecodeFailed => "E3002",
            Self::LocalReadFailed => "E3003",
            Self::OutputWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::UnrecognizedFragmentKind => "Unrecognized event fragment kind",
            Self::MalformedFragment => "Event fragment is missing its parent id",
            Self::UnclassifiableRecord => "Attack record could not be classified",
            Self::NonFiniteRating => "Stat-loss rating is not a finite number",
            Self::RemoteFetchFailed => "Remote request failed",
            Self::RemoteDecodeFailed => "Remote response was not valid JSON",
            Self::LocalReadFailed => "Replay file could not be read",
            Self::OutputWriteFailed => "Output file write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in chum.toml and retry."),
            Self::UnrecognizedFragmentKind | Self::MalformedFragment => {
                Some("The fragment was skipped; the rest of the batch is unaffected.")
            }
            Self::UnclassifiableRecord => {
                Some("The record was emitted with a placeholder line and a 0 rating.")
            }
            Self::NonFiniteRating => {
                Some("The line was kept; check the stat-loss fragment's before value.")
            }
            Self::RemoteFetchFailed => {
                Some("Check network access and the configured endpoint URLs, then rerun.")
            }
            Self::RemoteDecodeFailed => {
                Some("The endpoint may have changed shape; replay a saved response with --events-file.")
            }
            Self::LocalReadFailed => Some("Check the replay file path and that it holds a JSON array."),
            Self::OutputWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure reported by a remote or replayed collaborator.
///
/// Any of these aborts the run; nothing is written.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Map the failure onto its stable error code.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Request { .. } => ErrorCode::RemoteFetchFailed,
            Self::Decode { .. } => ErrorCode::RemoteDecodeFailed,
            Self::Io { .. } => ErrorCode::LocalReadFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, SourceError};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::UnrecognizedFragmentKind,
            ErrorCode::MalformedFragment,
            ErrorCode::UnclassifiableRecord,
            ErrorCode::NonFiniteRating,
            ErrorCode::RemoteFetchFailed,
            ErrorCode::RemoteDecodeFailed,
            ErrorCode::LocalReadFailed,
            ErrorCode::OutputWriteFailed,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::UnclassifiableRecord.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn source_errors_map_to_fetch_codes() {
        let err = SourceError::Request {
            url: "https://example.invalid/events".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(err.error_code(), ErrorCode::RemoteFetchFailed);
        assert!(err.to_string().contains("connection refused"));

        let err = SourceError::Decode {
            url: "https://example.invalid/events".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(err.error_code(), ErrorCode::RemoteDecodeFailed);
    }
}
