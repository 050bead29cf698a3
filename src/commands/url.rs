use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail, ensure};
use clap::{Args, ValueEnum};
use reqwest::Client;
use tokio::fs;
use tracing::info;

use crate::{
    ConsoleRequest,
    aws::{
        CredentialSource, FederationEndpoint, SessionRequest, SigninUrlBuilder, Strategy,
        profile::SharedProfileFiles, sts::StsTokenService,
    },
    config::{self, Config},
    constants::DEFAULT_POLICY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// STS GetFederationToken
    Federation,
    /// STS AssumeRole with a session policy
    AssumeRole,
}

#[derive(Debug, Clone, Default, Args)]
pub struct UrlCommand {
    #[arg(long, conflicts_with = "policy_file", help = "Inline IAM policy JSON")]
    pub policy: Option<String>,

    #[arg(long, value_name = "PATH", help = "Read the IAM policy JSON from a file")]
    pub policy_file: Option<PathBuf>,

    #[arg(short = 'd', long, value_name = "URL", help = "Console page to open after sign-in")]
    pub destination: Option<String>,

    #[arg(
        long,
        value_name = "SECONDS",
        allow_negative_numbers = true,
        help = "Session duration in seconds (900-43200)"
    )]
    pub duration: Option<i32>,

    #[arg(short = 'u', long, help = "Federated user name or role session name")]
    pub user_name: Option<String>,

    #[arg(long, value_enum, help = "Credential acquisition strategy")]
    pub strategy: Option<StrategyArg>,

    #[arg(long, value_name = "ARN", help = "Role to assume (implies --strategy assume-role)")]
    pub role_arn: Option<String>,

    #[arg(long, help = "AWS region for STS and the federation endpoint")]
    pub region: Option<String>,

    #[arg(long, value_name = "URL", help = "Override the federation endpoint")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Open the URL in the default browser")]
    pub open: bool,
}

impl UrlCommand {
    pub async fn execute(self, profile: Option<&str>) -> Result<()> {
        let config = config::load(profile).context("Failed to load settings")?;

        let request = ConsoleRequest {
            source: CredentialSource::from_profile(profile.map(str::to_string)),
            strategy: self.strategy(&config)?,
            session: SessionRequest {
                policy: self.policy(&config).await?,
                duration_seconds: self.duration.unwrap_or(config.session_duration),
                user_name: self.user_name.clone().unwrap_or(config.user_name.clone()),
            },
            destination: self
                .destination
                .clone()
                .unwrap_or(config.destination.clone()),
        };

        let region = self.region.clone().or(config.region.clone());
        let endpoint = self.endpoint(&config, region.as_deref())?;

        let resolver = SharedProfileFiles::from_env();
        let token_service = StsTokenService::new(region);
        let signin = SigninUrlBuilder::new(Client::new(), endpoint);

        let url = crate::generate_console_url(&resolver, &token_service, &signin, &request)
            .await
            .context("Failed to generate console sign-in URL")?;

        println!("{url}");

        if self.open {
            open_browser(&url)?;
            info!("Opened AWS Management Console in browser");
        }

        Ok(())
    }

    fn strategy(&self, config: &Config) -> Result<Strategy> {
        let role_arn = self.role_arn.clone().or(config.role_arn.clone());
        match (self.strategy, role_arn) {
            (Some(StrategyArg::Federation), _) => Ok(Strategy::FederationToken),
            (Some(StrategyArg::AssumeRole), None) => {
                bail!("--strategy assume-role requires --role-arn or role_arn in settings")
            }
            (_, Some(role_arn)) => Ok(Strategy::AssumeRole { role_arn }),
            (None, None) => Ok(Strategy::FederationToken),
        }
    }

    /// Command line beats the settings file; the file beats the built-in policy
    async fn policy(&self, config: &Config) -> Result<String> {
        if let Some(policy) = &self.policy {
            return Ok(policy.clone());
        }
        if let Some(path) = &self.policy_file {
            return read_policy(path).await;
        }
        if let Some(policy) = &config.policy {
            return Ok(policy.clone());
        }
        if let Some(path) = &config.policy_file {
            return read_policy(path).await;
        }
        Ok(DEFAULT_POLICY.to_string())
    }

    fn endpoint(&self, config: &Config, region: Option<&str>) -> Result<FederationEndpoint> {
        match self.endpoint.as_deref().or(config.endpoint.as_deref()) {
            Some(endpoint) => {
                FederationEndpoint::parse(endpoint).context("Invalid federation endpoint")
            }
            None => Ok(region.map_or_else(FederationEndpoint::default, FederationEndpoint::for_region)),
        }
    }
}

async fn read_policy(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read policy file: {}", path.display()))
}

/// Launcher for the platform's default browser
///
/// `cmd /c start` would split the URL at `&`, so Windows goes through the
/// URL protocol handler instead.
fn browser_command(url: &str) -> Option<Command> {
    let (program, leading): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("rundll32", &["url.dll,FileProtocolHandler"])
    } else if cfg!(unix) {
        ("xdg-open", &[])
    } else {
        return None;
    };

    let mut command = Command::new(program);
    command.args(leading).arg(url);
    Some(command)
}

fn open_browser(url: &str) -> Result<()> {
    let mut command =
        browser_command(url).context("No browser launcher known for this platform")?;
    let status = command
        .status()
        .with_context(|| format!("Failed to run {}", command.get_program().to_string_lossy()))?;
    ensure!(status.success(), "Browser launcher exited with {status}");
    Ok(())
}
