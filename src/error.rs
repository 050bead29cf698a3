use std::path::PathBuf;

/// Failures of the credential-to-URL pipeline.
///
/// Every variant is fatal; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested credential profile does not exist in any shared file.
    #[error("profile '{profile}' not found (searched: {})", display_paths(.searched))]
    ProfileNotFound {
        profile: String,
        searched: Vec<PathBuf>,
    },

    /// Local configuration could not be read or is incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// The security token service rejected the request.
    #[error("{operation} rejected by STS: {message}")]
    Provider {
        operation: &'static str,
        message: String,
    },

    /// The sign-in token exchange failed on the wire or returned a non-2xx status.
    #[error("token exchange failed: {0}")]
    Transport(String),

    /// The federation endpoint answered with a body we cannot use.
    #[error("token exchange failed: malformed response: {0}")]
    MalformedResponse(String),
}

impl Error {
    /// Whether the failure happened before anything was sent over the network.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ProfileNotFound { .. } | Self::Config(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
