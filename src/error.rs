//! Error taxonomy shared by every backend-facing operation
//!
//! Raw backend errors never reach the user directly: each variant carries the
//! technical detail for logs and maps to a fixed, user-facing message.

use tracing::warn;

/// Broad category of a failure, used to pick a propagation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Validation,
    Unauthorized,
    NotFound,
    Server,
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Validation failed on {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, PlatformError>;

impl PlatformError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Server(_) => ErrorKind::Server,
        }
    }

    /// Message safe to show in a transient notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Validation { field, reason } => format!("Invalid {}: {}", field, reason),
            Self::Unauthorized(_) => "You need to be signed in to do that.".to_string(),
            Self::NotFound(_) => "We couldn't find what you were looking for.".to_string(),
            Self::Server(_) => "Something went wrong on our side. Please try again.".to_string(),
        }
    }

    /// Whether a read path may swallow this error and render an empty state
    pub fn is_degradable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Server)
    }
}

impl From<rusqlite::Error> for PlatformError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound("no matching row".to_string()),
            other => Self::Server(other.to_string()),
        }
    }
}

/// Degrade a non-critical read to its empty state on connectivity/server errors.
///
/// Validation, authorization and not-found errors are still returned.
pub fn degrade<T: Default>(result: Result<T>, context: &str) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_degradable() => {
            warn!(context, error = %err, "read degraded to empty state");
            Ok(T::default())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_raw_detail() {
        let err = PlatformError::Server("duplicate key value violates constraint".to_string());
        assert!(!err.user_message().contains("constraint"));
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_degrade_swallows_network_errors() {
        let res: Result<Vec<u32>> = Err(PlatformError::Network("timeout".to_string()));
        assert_eq!(degrade(res, "social counts").unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_degrade_keeps_validation_errors() {
        let res: Result<u32> = Err(PlatformError::validation("slug", "too short"));
        assert!(matches!(
            degrade(res, "slug check"),
            Err(PlatformError::Validation { .. })
        ));
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err: PlatformError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
