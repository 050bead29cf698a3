use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ini::{Ini, Properties};
use tracing::debug;

use crate::constants::{
    self, DEFAULT_DESTINATION, DEFAULT_SESSION_DURATION_SECS, DEFAULT_USER_NAME,
};

/// Per-profile defaults read from the settings file
///
/// Every field can be overridden on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub policy: Option<String>,
    pub policy_file: Option<PathBuf>,
    pub destination: String,
    pub session_duration: i32,
    pub user_name: String,
    pub role_arn: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: None,
            policy_file: None,
            destination: DEFAULT_DESTINATION.to_string(),
            session_duration: DEFAULT_SESSION_DURATION_SECS,
            user_name: DEFAULT_USER_NAME.to_string(),
            role_arn: None,
            region: None,
            endpoint: None,
        }
    }
}

impl Config {
    fn from_ini_section(section: &Properties) -> Result<Self> {
        let session_duration = match section.get("session_duration") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("Invalid session_duration '{value}'"))?,
            None => DEFAULT_SESSION_DURATION_SECS,
        };

        Ok(Self {
            policy: section.get("policy").map(str::to_string),
            policy_file: section.get("policy_file").map(PathBuf::from),
            destination: section
                .get("destination")
                .unwrap_or(DEFAULT_DESTINATION)
                .to_string(),
            session_duration,
            user_name: section
                .get("user_name")
                .unwrap_or(DEFAULT_USER_NAME)
                .to_string(),
            role_arn: section.get("role_arn").map(str::to_string),
            region: section.get("region").map(str::to_string),
            endpoint: section.get("endpoint").map(str::to_string),
        })
    }
}

/// Load settings for `profile`, or the `[default]` section when none is given
///
/// A missing file or section yields the built-in defaults.
pub fn load(profile: Option<&str>) -> Result<Config> {
    match constants::get_config_path() {
        Some(path) => load_from(&path, profile),
        None => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path, profile: Option<&str>) -> Result<Config> {
    if !path.exists() {
        debug!("No settings file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let ini = Ini::load_from_file(path)
        .with_context(|| format!("Failed to load settings file {}", path.display()))?;

    let section_name = section_name(profile.unwrap_or("default"));

    match ini.section(Some(section_name.as_str())) {
        Some(section) => Config::from_ini_section(section)
            .with_context(|| format!("Invalid [{section_name}] in {}", path.display())),
        None => {
            debug!("No [{}] in {}, using defaults", section_name, path.display());
            Ok(Config::default())
        }
    }
}

fn section_name(profile: &str) -> String {
    if profile == "default" {
        profile.to_string()
    } else {
        format!("profile {profile}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_config_from_ini_section() {
        let mut props = Properties::new();
        props.insert("policy", r#"{"Version":"2012-10-17","Statement":[]}"#);
        props.insert("destination", "https://console.aws.amazon.com/s3/home");
        props.insert("session_duration", "3600");
        props.insert("user_name", "auditor");
        props.insert("role_arn", "arn:aws:iam::123456789012:role/Audit");
        props.insert("region", "eu-west-1");

        let config = Config::from_ini_section(&props).unwrap();

        assert_eq!(
            config.policy.as_deref(),
            Some(r#"{"Version":"2012-10-17","Statement":[]}"#)
        );
        assert_eq!(config.destination, "https://console.aws.amazon.com/s3/home");
        assert_eq!(config.session_duration, 3600);
        assert_eq!(config.user_name, "auditor");
        assert_eq!(
            config.role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/Audit")
        );
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn test_config_from_ini_section_with_defaults() {
        let config = Config::from_ini_section(&Properties::new()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_out_of_range_duration_is_kept() {
        let mut props = Properties::new();
        props.insert("session_duration", "60");
        let config = Config::from_ini_section(&props).unwrap();
        assert_eq!(config.session_duration, 60);
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        let mut props = Properties::new();
        props.insert("session_duration", "an hour");
        let err = Config::from_ini_section(&props).unwrap_err();
        assert!(err.to_string().contains("an hour"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("config"), Some("dev")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_picks_profile_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(
            &path,
            "[default]\nuser_name = everyone\n\n[profile dev]\nuser_name = developer\nsession_duration = 1800\n",
        )
        .unwrap();

        let dev = load_from(&path, Some("dev")).unwrap();
        assert_eq!(dev.user_name, "developer");
        assert_eq!(dev.session_duration, 1800);

        let default = load_from(&path, None).unwrap();
        assert_eq!(default.user_name, "everyone");

        let other = load_from(&path, Some("other")).unwrap();
        assert_eq!(other, Config::default());
    }

    #[test]
    fn test_section_name() {
        assert_eq!(section_name("default"), "default");
        assert_eq!(section_name("prod"), "profile prod");
    }
}
