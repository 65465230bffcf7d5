//! Error types for the update pipeline

use std::io;
use thiserror::Error;

/// Main error type for self-update operations
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Not a failure: the installed build is already current or newer
    #[error("No newer version available")]
    NoNewerVersion,

    /// Release-service lookups
    #[error("Release not found: {tag}")]
    ReleaseNotFound { tag: String },

    #[error("Asset {name} not found in release {tag}")]
    AssetNotFound { name: String, tag: String },

    /// Signature or digest mismatch. Any bytes already read are untrusted.
    #[error("Verification failed")]
    VerificationFailed,

    #[error("Invalid key: {reason}")]
    InvalidKey { reason: String },

    /// Stream ended before the framing was complete
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Compression error: {reason}")]
    Compression { reason: String },

    /// Network errors
    #[error("Redirect error: {reason}")]
    Redirect { reason: String },

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex encoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Configuration errors
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    /// Context errors
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Generic error for unexpected conditions
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl UpdateError {
    /// Create a new release not found error
    pub fn release_not_found(tag: impl Into<String>) -> Self {
        Self::ReleaseNotFound { tag: tag.into() }
    }

    /// Create a new asset not found error
    pub fn asset_not_found(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::AssetNotFound {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Create a new invalid key error
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }

    /// Create a new compression error
    pub fn compression(reason: impl Into<String>) -> Self {
        Self::Compression {
            reason: reason.into(),
        }
    }

    /// Create a new redirect error
    pub fn redirect(reason: impl Into<String>) -> Self {
        Self::Redirect {
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for the release/asset lookup failures
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ReleaseNotFound { .. } | Self::AssetNotFound { .. }
        )
    }

    /// Verification failures must never be installed or executed
    pub fn is_security_event(&self) -> bool {
        matches!(self, Self::VerificationFailed)
    }

    /// Wrap this error so it can travel through `std::io::Read`.
    ///
    /// The original variant is recovered by `From<io::Error>`.
    pub fn into_io(self) -> io::Error {
        match self {
            Self::Io(err) => err,
            other => {
                // Never Interrupted: std read loops retry that kind
                let kind = match &other {
                    Self::ShortRead { .. } => io::ErrorKind::UnexpectedEof,
                    Self::DeadlineExceeded => io::ErrorKind::TimedOut,
                    Self::Cancelled => io::ErrorKind::Other,
                    _ => io::ErrorKind::InvalidData,
                };
                io::Error::new(kind, other)
            },
        }
    }

    /// Rebuild an equivalent error for sticky readers that must report
    /// the same failure on every subsequent read.
    pub(crate) fn replay(&self) -> Self {
        match self {
            Self::NoNewerVersion => Self::NoNewerVersion,
            Self::VerificationFailed => Self::VerificationFailed,
            Self::ShortRead { expected, actual } => Self::ShortRead {
                expected: *expected,
                actual: *actual,
            },
            Self::ReleaseNotFound { tag } => Self::release_not_found(tag.clone()),
            Self::AssetNotFound { name, tag } => Self::asset_not_found(name.clone(), tag.clone()),
            Self::InvalidKey { reason } => Self::invalid_key(reason.clone()),
            Self::Compression { reason } => Self::compression(reason.clone()),
            Self::Redirect { reason } => Self::redirect(reason.clone()),
            Self::Http { status, url } => Self::Http {
                status: *status,
                url: url.clone(),
            },
            Self::Configuration { reason } => Self::configuration(reason.clone()),
            Self::HomeDirectoryNotFound => Self::HomeDirectoryNotFound,
            Self::Cancelled => Self::Cancelled,
            Self::DeadlineExceeded => Self::DeadlineExceeded,
            Self::Internal { message } => Self::internal(message.clone()),
            Self::Io(err) => Self::Io(io::Error::new(err.kind(), err.to_string())),
            // Source errors are not Clone; keep their message
            Self::Network(_) | Self::Json(_) | Self::Hex(_) => Self::internal(self.to_string()),
        }
    }
}

impl From<io::Error> for UpdateError {
    fn from(err: io::Error) -> Self {
        let is_ours = err
            .get_ref()
            .map(|inner| inner.is::<UpdateError>())
            .unwrap_or(false);

        if is_ours {
            if let Some(inner) = err.into_inner() {
                if let Ok(ours) = inner.downcast::<UpdateError>() {
                    return *ours;
                }
            }
            return Self::internal("lost wrapped error");
        }

        Self::Io(err)
    }
}

/// Result type alias for self-update operations
pub type Result<T> = std::result::Result<T, UpdateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_round_trip_keeps_variant() {
        let io_err = UpdateError::VerificationFailed.into_io();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);

        let back: UpdateError = io_err.into();
        assert!(back.is_security_event());
    }

    #[test]
    fn test_short_read_maps_to_unexpected_eof() {
        let io_err = UpdateError::ShortRead {
            expected: 96,
            actual: 3,
        }
        .into_io();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);

        match UpdateError::from(io_err) {
            UpdateError::ShortRead { expected, actual } => {
                assert_eq!(expected, 96);
                assert_eq!(actual, 3);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_replay_keeps_variant() {
        let replayed = UpdateError::compression("bad frame").replay();
        assert!(matches!(replayed, UpdateError::Compression { ref reason } if reason == "bad frame"));

        let replayed = UpdateError::Http {
            status: 502,
            url: "https://example.com".to_string(),
        }
        .replay();
        assert!(matches!(replayed, UpdateError::Http { status: 502, .. }));

        assert!(UpdateError::asset_not_found("a", "1.0").replay().is_not_found());
    }

    #[test]
    fn test_cancellation_is_not_retried_by_read_loops() {
        let cancelled = UpdateError::Cancelled.into_io();
        assert_ne!(cancelled.kind(), io::ErrorKind::Interrupted);
        assert_eq!(UpdateError::DeadlineExceeded.into_io().kind(), io::ErrorKind::TimedOut);

        // read_to_end would spin forever on Interrupted
        struct Cancelling;
        impl io::Read for Cancelling {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(UpdateError::Cancelled.into_io())
            }
        }
        let mut out = Vec::new();
        let err = io::Read::read_to_end(&mut Cancelling, &mut out).unwrap_err();
        assert!(matches!(UpdateError::from(err), UpdateError::Cancelled));
    }

    #[test]
    fn test_plain_io_error_stays_io() {
        let err = UpdateError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, UpdateError::Io(_)));
    }

    #[test]
    fn test_not_found_helpers() {
        assert!(UpdateError::release_not_found("1.0.0").is_not_found());
        assert!(UpdateError::asset_not_found("tool.sign", "1.0.0").is_not_found());
        assert!(!UpdateError::VerificationFailed.is_not_found());
    }
}
