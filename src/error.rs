//! Centralized error types for mailgrab.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors produced by the mailgrab library.
///
/// Per-attachment save failures, mark failures and post-action failures are
/// deliberately NOT represented here: they are logged where they occur and
/// never interrupt the run.
#[derive(Error, Debug)]
pub enum MailgrabError {
    /// Invalid or missing settings. The run never connects.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transport-level failure while establishing the connection.
    #[error("connecting to '{server}': {reason}")]
    Connect { server: String, reason: String },

    /// The server rejected the credentials.
    #[error("authentication failed for '{username}': {reason}")]
    Auth { username: String, reason: String },

    /// The mailbox does not exist or could not be selected.
    #[error("selecting mailbox '{mailbox}': {reason}")]
    Mailbox { mailbox: String, reason: String },

    /// The unprocessed-message search failed.
    #[error("searching messages: {0}")]
    Search(String),

    /// The batch envelope/structure fetch failed.
    #[error("fetching messages: {0}")]
    Fetch(String),

    /// A partial fetch for one addressed MIME part failed.
    /// Fatal to the whole run: partial extraction results are discarded.
    #[error("fetching part [{section}] of message {uid}: {reason}")]
    FetchPart {
        uid: u32,
        section: String,
        reason: String,
    },

    /// A flag update (marker keyword or `\Deleted`) failed.
    #[error("updating flags of message {uid}: {reason}")]
    Store { uid: u32, reason: String },

    /// A server-side move failed.
    #[error("moving message {uid}: {reason}")]
    Move { uid: u32, reason: String },

    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, MailgrabError>`.
pub type Result<T> = std::result::Result<T, MailgrabError>;

impl MailgrabError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error.
    ///
    /// 1 = configuration, 2 = connection/authentication, 3 = processing.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Connect { .. } | Self::Auth { .. } => 2,
            Self::Mailbox { .. }
            | Self::Search(_)
            | Self::Fetch(_)
            | Self::FetchPart { .. }
            | Self::Store { .. }
            | Self::Move { .. }
            | Self::Io { .. } => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(MailgrabError::Config("x".into()).exit_code(), 1);
        assert_eq!(
            MailgrabError::Connect {
                server: "imap.example.com".into(),
                reason: "refused".into()
            }
            .exit_code(),
            2
        );
        assert_eq!(
            MailgrabError::Auth {
                username: "user".into(),
                reason: "NO".into()
            }
            .exit_code(),
            2
        );
        assert_eq!(MailgrabError::Search("BAD".into()).exit_code(), 3);
        assert_eq!(
            MailgrabError::FetchPart {
                uid: 7,
                section: "2.1".into(),
                reason: "lost".into()
            }
            .exit_code(),
            3
        );
    }
}
