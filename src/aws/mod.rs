use std::fmt;

use aws_smithy_types::DateTime;

pub mod console;
pub mod profile;
pub mod sts;

/// AWS temporary credentials structure
///
/// Issued once per run and never written anywhere. The secret and session token
/// are left out of `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

/// Parameters for one temporary console session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// Inline IAM policy, passed to STS as-is
    pub policy: String,
    /// Requested lifetime in seconds; bounds are enforced by STS
    pub duration_seconds: i32,
    /// Federated user name, or role session name for assume-role
    pub user_name: String,
}

// Re-export commonly used types (functions should be accessed via module path)
pub use console::{FederationEndpoint, SigninUrlBuilder};
pub use profile::{BaseCredentials, BaseIdentity, CredentialSource, ProfileResolver};
pub use sts::{Strategy, TokenService};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let creds = Credentials {
            access_key_id: "ASIAEXAMPLE".to_string(),
            secret_access_key: "very-secret".to_string(),
            session_token: "token-value".to_string(),
            expiration: DateTime::from_secs(0),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("ASIAEXAMPLE"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("token-value"));
    }
}
