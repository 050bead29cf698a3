use std::{
    fmt,
    path::{Path, PathBuf},
};

use ini::{Ini, Properties};
use tracing::debug;

use crate::{
    constants,
    error::{Error, Result},
};

/// Where the base identity used to call STS comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CredentialSource {
    /// Ambient credentials from the SDK default chain
    #[default]
    Default,
    /// A named profile from the local shared credential files
    NamedProfile(String),
}

impl CredentialSource {
    pub fn from_profile(profile: Option<String>) -> Self {
        profile.map_or(Self::Default, Self::NamedProfile)
    }

    /// Resolve the source to a concrete identity without touching the network
    pub fn resolve<R: ProfileResolver + ?Sized>(&self, resolver: &R) -> Result<BaseIdentity> {
        match self {
            Self::Default => Ok(BaseIdentity::Ambient),
            Self::NamedProfile(name) => resolver.resolve(name),
        }
    }
}

/// Long-lived keys read from a shared credential file
#[derive(Clone, PartialEq, Eq)]
pub struct BaseCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for BaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseCredentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// The identity STS requests are signed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseIdentity {
    /// Whatever the SDK default chain finds
    Ambient,
    /// Static keys taken from `profile`; the profile still supplies the region
    Static {
        profile: String,
        credentials: BaseCredentials,
    },
    /// A profile that exists but carries no static keys (role, SSO, process);
    /// left to the SDK profile provider
    Profile(String),
}

/// Local credential-profile store
pub trait ProfileResolver {
    /// Resolve `name` to a base identity, or fail with [`Error::ProfileNotFound`]
    fn resolve(&self, name: &str) -> Result<BaseIdentity>;
}

/// Resolver backed by `~/.aws/credentials` and `~/.aws/config`
#[derive(Debug, Clone)]
pub struct SharedProfileFiles {
    credentials_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl SharedProfileFiles {
    pub fn new(credentials_file: Option<PathBuf>, config_file: Option<PathBuf>) -> Self {
        Self {
            credentials_file,
            config_file,
        }
    }

    /// Locate the shared files the same way the AWS CLI does
    pub fn from_env() -> Self {
        Self::new(
            constants::get_aws_credentials_path(),
            constants::get_aws_config_path(),
        )
    }
}

impl ProfileResolver for SharedProfileFiles {
    fn resolve(&self, name: &str) -> Result<BaseIdentity> {
        let mut searched = Vec::new();

        if let Some(path) = &self.credentials_file {
            searched.push(path.clone());
            if let Some(ini) = load_ini(path)? {
                if let Some(section) = ini.section(Some(name)) {
                    debug!("Profile '{}' found in {}", name, path.display());
                    return Ok(identity_from_section(name, section));
                }
            }
        }

        if let Some(path) = &self.config_file {
            searched.push(path.clone());
            if let Some(ini) = load_ini(path)? {
                let section_name = if name == "default" {
                    name.to_string()
                } else {
                    format!("profile {name}")
                };
                if let Some(section) = ini.section(Some(section_name)) {
                    debug!("Profile '{}' found in {}", name, path.display());
                    return Ok(identity_from_section(name, section));
                }
            }
        }

        Err(Error::ProfileNotFound {
            profile: name.to_string(),
            searched,
        })
    }
}

fn load_ini(path: &Path) -> Result<Option<Ini>> {
    if !path.exists() {
        return Ok(None);
    }
    Ini::load_from_file(path)
        .map(Some)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))
}

fn identity_from_section(name: &str, section: &Properties) -> BaseIdentity {
    match (
        section.get("aws_access_key_id"),
        section.get("aws_secret_access_key"),
    ) {
        (Some(access_key_id), Some(secret_access_key)) => BaseIdentity::Static {
            profile: name.to_string(),
            credentials: BaseCredentials {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
                session_token: section.get("aws_session_token").map(str::to_string),
            },
        },
        _ => BaseIdentity::Profile(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_files(credentials: &str, config: &str) -> (TempDir, SharedProfileFiles) {
        let dir = tempfile::tempdir().unwrap();
        let credentials_path = dir.path().join("credentials");
        let config_path = dir.path().join("config");
        fs::write(&credentials_path, credentials).unwrap();
        fs::write(&config_path, config).unwrap();
        let files = SharedProfileFiles::new(Some(credentials_path), Some(config_path));
        (dir, files)
    }

    #[test]
    fn test_default_source_needs_no_lookup() {
        let files = SharedProfileFiles::new(None, None);
        let identity = CredentialSource::Default.resolve(&files).unwrap();
        assert_eq!(identity, BaseIdentity::Ambient);
    }

    #[test]
    fn test_from_profile() {
        assert_eq!(CredentialSource::from_profile(None), CredentialSource::Default);
        assert_eq!(
            CredentialSource::from_profile(Some("dev".to_string())),
            CredentialSource::NamedProfile("dev".to_string())
        );
    }

    #[test]
    fn test_static_keys_from_credentials_file() {
        let (_dir, files) = write_files(
            "[AssumeRole-Test]\naws_access_key_id = AKIAEXAMPLE\naws_secret_access_key = secret\n",
            "",
        );
        let identity = files.resolve("AssumeRole-Test").unwrap();
        assert_eq!(
            identity,
            BaseIdentity::Static {
                profile: "AssumeRole-Test".to_string(),
                credentials: BaseCredentials {
                    access_key_id: "AKIAEXAMPLE".to_string(),
                    secret_access_key: "secret".to_string(),
                    session_token: None,
                },
            }
        );
    }

    #[test]
    fn test_session_token_is_kept() {
        let (_dir, files) = write_files(
            "[tmp]\naws_access_key_id = ASIA\naws_secret_access_key = s\naws_session_token = t\n",
            "",
        );
        match files.resolve("tmp").unwrap() {
            BaseIdentity::Static { credentials, .. } => {
                assert_eq!(credentials.session_token.as_deref(), Some("t"))
            }
            other => panic!("Expected static identity, got {other:?}"),
        }
    }

    #[test]
    fn test_config_file_uses_profile_prefix() {
        let (_dir, files) = write_files(
            "",
            "[profile dev]\naws_access_key_id = AKIADEV\naws_secret_access_key = devsecret\n",
        );
        match files.resolve("dev").unwrap() {
            BaseIdentity::Static { profile, credentials } => {
                assert_eq!(profile, "dev");
                assert_eq!(credentials.access_key_id, "AKIADEV");
            }
            other => panic!("Expected static identity, got {other:?}"),
        }

        // A bare section name is not a profile in the config file
        let (_dir, files) = write_files("", "[dev]\naws_access_key_id = AKIADEV\n");
        assert!(matches!(
            files.resolve("dev"),
            Err(Error::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_default_profile_in_config_file() {
        let (_dir, files) = write_files("", "[default]\nregion = eu-west-1\n");
        assert_eq!(
            files.resolve("default").unwrap(),
            BaseIdentity::Profile("default".to_string())
        );
    }

    #[test]
    fn test_role_profile_is_delegated() {
        let (_dir, files) = write_files(
            "",
            "[profile admin]\nrole_arn = arn:aws:iam::123456789012:role/Admin\nsource_profile = default\n",
        );
        assert_eq!(
            files.resolve("admin").unwrap(),
            BaseIdentity::Profile("admin".to_string())
        );
    }

    #[test]
    fn test_missing_profile_is_reported() {
        let (_dir, files) = write_files("[other]\naws_access_key_id = x\n", "");
        let err = files.resolve("AssumeRole-Test").unwrap_err();
        match err {
            Error::ProfileNotFound { profile, searched } => {
                assert_eq!(profile, "AssumeRole-Test");
                assert_eq!(searched.len(), 2);
            }
            other => panic!("Expected ProfileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_files_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = SharedProfileFiles::new(
            Some(dir.path().join("nope-credentials")),
            Some(dir.path().join("nope-config")),
        );
        assert!(matches!(
            files.resolve("dev"),
            Err(Error::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_base_credentials_debug_hides_secret() {
        let creds = BaseCredentials {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "hidden".to_string(),
            session_token: Some("also-hidden".to_string()),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hidden"));
    }
}
