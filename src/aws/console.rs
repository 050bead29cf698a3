use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use super::Credentials;
use crate::{
    constants::FEDERATION_ENDPOINT,
    error::{Error, Result},
};

/// RFC 3986 unreserved characters stay as they are
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Like UNRESERVED but keeps the scheme and path separators readable.
/// `?`, `&`, `=`, `#` and `%` are still escaped so the destination stays a
/// single parameter.
const DESTINATION: &AsciiSet = &UNRESERVED.remove(b':').remove(b'/');

/// `Session` parameter of the getSigninToken call
fn session_json(creds: &Credentials) -> String {
    json!({
        "sessionId": creds.access_key_id,
        "sessionKey": creds.secret_access_key,
        "sessionToken": creds.session_token,
    })
    .to_string()
}

/// Response from AWS federation getSigninToken API
#[derive(Debug, Deserialize)]
struct SigninTokenResponse {
    #[serde(rename = "SigninToken")]
    signin_token: String,
}

/// Base URL of a federation endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederationEndpoint(Url);

impl FederationEndpoint {
    pub fn parse(endpoint: &str) -> Result<Self> {
        Url::parse(endpoint)
            .map(Self)
            .map_err(|e| Error::Config(format!("invalid federation endpoint '{endpoint}': {e}")))
    }

    /// Federation endpoint of the partition `region` belongs to
    pub fn for_region(region: &str) -> Self {
        let domain = get_console_domain(region);
        Self(
            Url::parse(&format!("https://signin.{domain}/federation"))
                .unwrap_or_else(|_| Self::default().0),
        )
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for FederationEndpoint {
    fn default() -> Self {
        Self(Url::parse(FEDERATION_ENDPOINT).expect("FEDERATION_ENDPOINT is a valid URL"))
    }
}

/// Turns temporary credentials into a console login URL
#[derive(Debug, Clone)]
pub struct SigninUrlBuilder {
    http: Client,
    endpoint: FederationEndpoint,
}

impl SigninUrlBuilder {
    pub fn new(http: Client, endpoint: FederationEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Get signin token from AWS federation endpoint
    ///
    /// `session_duration` is only accepted by AWS for role credentials.
    pub async fn get_signin_token(
        &self,
        creds: &Credentials,
        session_duration: Option<i32>,
    ) -> Result<String> {
        let session = session_json(creds);

        let mut url = self.endpoint.0.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("Action", "getSigninToken");
            if let Some(duration) = session_duration {
                query.append_pair("SessionDuration", &duration.to_string());
            }
            query.append_pair("Session", &session);
        }

        info!("Requesting signin token from {}", self.endpoint.as_str());

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!(
                "federation endpoint returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {e}")))?;

        let token_response: SigninTokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        if token_response.signin_token.is_empty() {
            return Err(Error::MalformedResponse("SigninToken is empty".to_string()));
        }

        debug!("Received signin token");
        Ok(token_response.signin_token)
    }

    /// Build the browser-facing login URL
    pub fn login_url(&self, signin_token: &str, destination: &str, duration_seconds: i32) -> String {
        format!(
            "{}?Action=login&Destination={}&SigninToken={}&SessionDuration={}",
            self.endpoint.as_str(),
            utf8_percent_encode(destination, DESTINATION),
            utf8_percent_encode(signin_token, UNRESERVED),
            duration_seconds
        )
    }
}

/// Get console domain based on region
fn get_console_domain(region: &str) -> &'static str {
    match region {
        r if r.starts_with("us-gov-") => "amazonaws-us-gov.com",
        r if r.starts_with("cn-") => "amazonaws.cn",
        _ => "aws.amazon.com",
    }
}
