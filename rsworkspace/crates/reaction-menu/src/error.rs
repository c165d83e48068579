//! Error types for reaction-menu

use thiserror::Error;

/// Boxed error used for remote failures and handler failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias
pub type Result<T> = std::result::Result<T, MenuError>;

#[derive(Debug, Error)]
pub enum MenuError {
    /// A remote call failed for a reason other than the target being gone.
    #[error("Remote error: {0}")]
    Remote(#[source] BoxError),

    /// A `collect`, `remove` or `dispose` handler returned an error.
    #[error("Handler error: {0}")]
    Handler(#[source] BoxError),

    /// A spawned reconciliation pass panicked or was aborted.
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl MenuError {
    pub(crate) fn remote<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Remote(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = MenuError::Remote("missing permissions".into());
        assert_eq!(err.to_string(), "Remote error: missing permissions");
    }

    #[test]
    fn test_handler_error_display() {
        let err = MenuError::Handler("boom".into());
        assert_eq!(err.to_string(), "Handler error: boom");
    }

    #[test]
    fn test_remote_keeps_source() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::Other, "reset");
        let err = MenuError::remote(io);
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("reset"));
    }

    #[tokio::test]
    async fn test_from_join_error() {
        let handle = tokio::spawn(async { panic!("predicate panicked") });
        let join_err = handle.await.unwrap_err();
        let err: MenuError = join_err.into();
        assert!(err.to_string().starts_with("Task error:"));
    }
}
