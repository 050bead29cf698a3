use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_smithy_runtime_api::client::http::SharedHttpClient;
use aws_sdk_sts::{
    Client as StsClient,
    config::Credentials as StaticCredentials,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::Credentials as StsCredentials,
};
use tracing::{debug, info, warn};

use super::{BaseIdentity, CredentialSource, Credentials, ProfileResolver, SessionRequest};
use crate::{
    constants::{DEFAULT_AWS_REGION, MAX_SESSION_DURATION_SECS, MIN_SESSION_DURATION_SECS},
    error::{Error, Result},
};

/// How the temporary credentials are obtained from STS
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Strategy {
    /// `GetFederationToken` signed with the base identity
    #[default]
    FederationToken,
    /// `AssumeRole` with the session policy attached
    AssumeRole { role_arn: String },
}

impl Strategy {
    /// Role credentials let the console session length be chosen at token exchange
    pub fn supports_session_duration(&self) -> bool {
        matches!(self, Self::AssumeRole { .. })
    }
}

/// The subset of the security token service this tool needs
#[async_trait]
pub trait TokenService: Send + Sync {
    async fn get_federation_token(
        &self,
        identity: &BaseIdentity,
        request: &SessionRequest,
    ) -> Result<Credentials>;

    async fn assume_role(
        &self,
        identity: &BaseIdentity,
        role_arn: &str,
        request: &SessionRequest,
    ) -> Result<Credentials>;
}

/// Resolve `source`, then request scoped credentials with `strategy`
///
/// Profile resolution happens first, so a missing profile fails before any
/// request is sent.
pub async fn acquire_credentials<R, T>(
    resolver: &R,
    service: &T,
    source: &CredentialSource,
    strategy: &Strategy,
    request: &SessionRequest,
) -> Result<Credentials>
where
    R: ProfileResolver + ?Sized,
    T: TokenService + ?Sized,
{
    let identity = source.resolve(resolver)?;

    if !(MIN_SESSION_DURATION_SECS..=MAX_SESSION_DURATION_SECS)
        .contains(&request.duration_seconds)
    {
        warn!(
            "Session duration {}s is outside {}..={}s, STS is likely to reject it",
            request.duration_seconds, MIN_SESSION_DURATION_SECS, MAX_SESSION_DURATION_SECS
        );
    }

    match strategy {
        Strategy::FederationToken => service.get_federation_token(&identity, request).await,
        Strategy::AssumeRole { role_arn } => service.assume_role(&identity, role_arn, request).await,
    }
}

/// [`TokenService`] backed by the AWS SDK
#[derive(Debug, Clone, Default)]
pub struct StsTokenService {
    region: Option<Region>,
    http_client: Option<SharedHttpClient>,
}

impl StsTokenService {
    /// Use `region` for STS; without one the SDK's region chain applies,
    /// falling back to DEFAULT_AWS_REGION
    pub fn new(region: Option<String>) -> Self {
        Self {
            region: region.map(Region::new),
            http_client: None,
        }
    }

    /// Send STS requests through `http_client` instead of the SDK default
    pub fn with_http_client(mut self, http_client: SharedHttpClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    async fn client(&self, identity: &BaseIdentity) -> StsClient {
        // Priority: explicit region -> ENV vars -> Config file -> EC2 metadata -> DEFAULT_AWS_REGION
        let loaded = self.load(identity, self.region.clone()).await;
        let config = match loaded.region() {
            Some(region) => {
                info!("Using region: {}", region);
                loaded
            }
            None => {
                info!(
                    "No region configured, using default {} for STS",
                    DEFAULT_AWS_REGION
                );
                self.load(identity, Some(Region::new(DEFAULT_AWS_REGION)))
                    .await
            }
        };
        StsClient::new(&config)
    }

    async fn load(&self, identity: &BaseIdentity, region: Option<Region>) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(region);
        }
        if let Some(http_client) = &self.http_client {
            loader = loader.http_client(http_client.clone());
        }
        match identity {
            BaseIdentity::Ambient => loader.load().await,
            BaseIdentity::Profile(name) => loader.profile_name(name).load().await,
            // Keys come from the file we parsed; region and endpoint settings
            // still come from the profile
            BaseIdentity::Static {
                profile,
                credentials,
            } => {
                loader
                    .profile_name(profile)
                    .credentials_provider(StaticCredentials::new(
                        credentials.access_key_id.clone(),
                        credentials.secret_access_key.clone(),
                        credentials.session_token.clone(),
                        None,
                        "fedsignin-profile",
                    ))
                    .load()
                    .await
            }
        }
    }
}

#[async_trait]
impl TokenService for StsTokenService {
    async fn get_federation_token(
        &self,
        identity: &BaseIdentity,
        request: &SessionRequest,
    ) -> Result<Credentials> {
        info!("Calling AWS STS GetFederationToken");
        debug!("User name: {}", request.user_name);
        debug!("Duration: {} seconds", request.duration_seconds);

        let response = self
            .client(identity)
            .await
            .get_federation_token()
            .name(&request.user_name)
            .duration_seconds(request.duration_seconds)
            .policy(&request.policy)
            .send()
            .await
            .map_err(|e| provider_error("GetFederationToken", e))?;

        let credentials = response
            .credentials()
            .map(convert)
            .ok_or_else(|| Error::Provider {
                operation: "GetFederationToken",
                message: "no credentials in response".to_string(),
            })?;

        info!("Successfully obtained federation token");
        Ok(credentials)
    }

    async fn assume_role(
        &self,
        identity: &BaseIdentity,
        role_arn: &str,
        request: &SessionRequest,
    ) -> Result<Credentials> {
        info!("Calling AWS STS AssumeRole");
        debug!("Role ARN: {}", role_arn);
        debug!("Session name: {}", request.user_name);
        debug!("Duration: {} seconds", request.duration_seconds);

        let response = self
            .client(identity)
            .await
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(&request.user_name)
            .duration_seconds(request.duration_seconds)
            .policy(&request.policy)
            .send()
            .await
            .map_err(|e| provider_error("AssumeRole", e))?;

        let credentials = response
            .credentials()
            .map(convert)
            .ok_or_else(|| Error::Provider {
                operation: "AssumeRole",
                message: "no credentials in response".to_string(),
            })?;

        info!("Successfully assumed role");
        Ok(credentials)
    }
}

fn convert(sts_creds: &StsCredentials) -> Credentials {
    Credentials {
        access_key_id: sts_creds.access_key_id().to_string(),
        secret_access_key: sts_creds.secret_access_key().to_string(),
        session_token: sts_creds.session_token().to_string(),
        expiration: *sts_creds.expiration(),
    }
}

fn provider_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = match err.as_service_error() {
        Some(service) => match (service.code(), service.message()) {
            (Some(code), Some(msg)) => format!("{code}: {msg}"),
            _ => DisplayErrorContext(&err).to_string(),
        },
        None => DisplayErrorContext(&err).to_string(),
    };
    Error::Provider { operation, message }
}
