//! Temporary, policy-restricted AWS console sign-in URLs.
//!
//! The pipeline is two calls long: STS issues scoped temporary credentials,
//! then the federation endpoint trades them for a one-time sign-in token that
//! is folded into a login URL.

pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;

use tracing::info;

use crate::aws::{
    CredentialSource, ProfileResolver, SessionRequest, SigninUrlBuilder, Strategy, TokenService,
    sts,
};
pub use crate::error::{Error, Result};

/// Everything needed for one console URL
#[derive(Debug, Clone)]
pub struct ConsoleRequest {
    pub source: CredentialSource,
    pub strategy: Strategy,
    pub session: SessionRequest,
    /// Console page the browser lands on
    pub destination: String,
}

/// Acquire scoped credentials and turn them into a console login URL
///
/// Either a complete URL is returned or the first failure, nothing in between.
pub async fn generate_console_url<R, T>(
    resolver: &R,
    token_service: &T,
    signin: &SigninUrlBuilder,
    request: &ConsoleRequest,
) -> Result<String>
where
    R: ProfileResolver + ?Sized,
    T: TokenService + ?Sized,
{
    let credentials = sts::acquire_credentials(
        resolver,
        token_service,
        &request.source,
        &request.strategy,
        &request.session,
    )
    .await?;

    let session_duration = request
        .strategy
        .supports_session_duration()
        .then_some(request.session.duration_seconds);
    let signin_token = signin
        .get_signin_token(&credentials, session_duration)
        .await?;

    info!("Built console sign-in URL");
    Ok(signin.login_url(
        &signin_token,
        &request.destination,
        request.session.duration_seconds,
    ))
}
