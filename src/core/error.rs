use thiserror::Error;

/// Comprehensive error type for the polybrain execution core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Sandbox error: {0}")]
    Sandbox(String),

    #[error("Execution timed out after {0} seconds")]
    Timeout(u64),

    #[error("Session is poisoned by an interrupted execution; reset() it before running more code")]
    PoisonedSession,

    #[error("Rejected fragment: {0}")]
    RejectedFragment(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Async task error: {0}")]
    AsyncTask(#[from] tokio::task::JoinError),
}

impl Error {
    /// Create a workspace error
    pub fn workspace<S: Into<String>>(msg: S) -> Self {
        Self::Workspace(msg.into())
    }

    /// Create a sandbox error
    pub fn sandbox<S: Into<String>>(msg: S) -> Self {
        Self::Sandbox(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a rejected-fragment error
    pub fn rejected_fragment<S: Into<String>>(msg: S) -> Self {
        Self::RejectedFragment(msg.into())
    }

    /// Whether this error leaves the session in an unknown workspace state.
    ///
    /// A fatal error means an execution may have partially applied its side
    /// effects, so the session history can no longer be trusted to describe
    /// the workspace. Sessions poison themselves on fatal errors and stay
    /// unusable until reset.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Workspace(_) | Self::Sandbox(_) | Self::Timeout(_) | Self::Io(_)
                | Self::AsyncTask(_)
        )
    }
}

/// Convenient result type for the execution core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation_helpers() {
        let workspace_err = Error::workspace("document unreachable");
        match workspace_err {
            Error::Workspace(msg) => assert_eq!(msg, "document unreachable"),
            _ => panic!("Expected Workspace error"),
        }

        let sandbox_err = Error::sandbox("interpreter exited abnormally");
        match sandbox_err {
            Error::Sandbox(msg) => assert_eq!(msg, "interpreter exited abnormally"),
            _ => panic!("Expected Sandbox error"),
        }

        let rejected_err = Error::rejected_fragment("re-imports the CAD API");
        match rejected_err {
            Error::RejectedFragment(msg) => assert_eq!(msg, "re-imports the CAD API"),
            _ => panic!("Expected RejectedFragment error"),
        }
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::workspace("wipe failed").is_fatal());
        assert!(Error::sandbox("spawn failed").is_fatal());
        assert!(Error::Timeout(30).is_fatal());

        assert!(!Error::PoisonedSession.is_fatal());
        assert!(!Error::rejected_fragment("bad").is_fatal());
        assert!(!Error::configuration("empty interpreter path").is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = Error::Timeout(45);
        assert_eq!(err.to_string(), "Execution timed out after 45 seconds");

        let err = Error::rejected_fragment("re-binds `partstudio`");
        assert_eq!(err.to_string(), "Rejected fragment: re-binds `partstudio`");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_fatal());
    }
}
