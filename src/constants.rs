use std::{env, path::PathBuf};

/// Configuration directory name under `~/.config`
pub const CONFIG_DIR_NAME: &str = "fedsignin";

/// Settings file name inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config";

/// Environment variable overriding the settings file location
pub const CONFIG_FILE_ENV: &str = "FEDSIGNIN_CONFIG_FILE";

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// AWS federation endpoint for the commercial partition
pub const FEDERATION_ENDPOINT: &str = "https://signin.aws.amazon.com/federation";

/// Default console page to land on after sign-in
pub const DEFAULT_DESTINATION: &str = "https://console.aws.amazon.com/";

/// Read-only SNS access, used when no policy is configured
pub const DEFAULT_POLICY: &str = r#"{"Version": "2012-10-17","Statement": [{"Effect": "Allow","Action": ["sns:GetTopicAttributes", "sns:List*"],"Resource": "*"}]}"#;

/// Default federated user name
pub const DEFAULT_USER_NAME: &str = "federated-user";

/// Minimum session duration accepted by STS, in seconds
pub const MIN_SESSION_DURATION_SECS: i32 = 900;

/// Maximum session duration accepted by STS, in seconds
pub const MAX_SESSION_DURATION_SECS: i32 = 43_200;

/// Default session duration, in seconds
pub const DEFAULT_SESSION_DURATION_SECS: i32 = MIN_SESSION_DURATION_SECS;

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Get the settings file path
/// Respects FEDSIGNIN_CONFIG_FILE environment variable if set
pub fn get_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(AWS_CONFIG_DIR_NAME)
            .join(AWS_CREDENTIALS_FILE_NAME)
    })
}
