//! Burwood Portal API client.
//!
//! A thin, authenticated wrapper around the portal's REST endpoints. It
//! focuses on:
//!
//! - Constructing one HTTP transport with a fixed 10 second timeout
//! - Exchanging Basic credentials for an access token
//! - Attaching `x-access-token` and `content-type: application/json` to
//!   every request
//! - Decoding JSON responses and reporting non-200 statuses verbatim
//!
//! The primary entry point is [`PortalClient`]. Create an authenticated
//! instance with [`PortalClient::connect`], then use the typed endpoint
//! wrappers (for example [`PortalClient::group_hierarchy`]) or the generic
//! [`PortalClient::fetch_list`] / [`PortalClient::submit`] helpers.
//!
//! # Example
//!
//! ```ignore
//! use burwood_api::{Credentials, PortalClient};
//!
//! # async fn run() -> Result<(), burwood_api::PortalError> {
//! let credentials = Credentials::new("ops", "secret");
//! let client = PortalClient::connect("https://api.bcs.burwood.com", &credentials).await?;
//! let groups = client.group_hierarchy().await?;
//! println!("{} groups", groups.len());
//! # Ok(())
//! # }
//! ```

mod endpoints;
mod error;

use std::fmt;
use std::time::{Duration, Instant};

use burwood_types::TokenResponse;
use burwood_util::http::{decode_response, join_url};
use burwood_util::text_processing::REDACTED;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use endpoints::{GROUP_HIERARCHY_ENDPOINT, PROJECT_SCOPE, add_budget_endpoint, project_budgets_endpoint, project_endpoint};
pub use error::PortalError;

/// Production portal host.
pub const DEFAULT_BASE_URL: &str = "https://api.bcs.burwood.com";
/// Header carrying the access token on every request.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";
/// Upper bound for a single request, connect to last body byte.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Endpoint exchanging Basic credentials for a token.
pub const TOKEN_ENDPOINT: &str = "token";

/// Hostnames allowed to use plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Portal username and password.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both values are present.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Configured `reqwest::Client` bound to one portal host and one token.
///
/// The token is fixed at construction and never mutated afterwards, so a
/// client can be cloned and shared freely across tasks.
#[derive(Clone)]
pub struct PortalClient {
    base_url: String,
    http: Client,
    token: String,
}

impl fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.has_token())
            .finish()
    }
}

impl PortalClient {
    /// Build a client without a token. Requests carry an empty
    /// `x-access-token` header.
    pub fn anonymous(base_url: &str) -> Result<Self, PortalError> {
        Self::with_token(base_url, String::new())
    }

    /// Build a client around an already issued token.
    pub fn with_token(base_url: &str, token: impl Into<String>) -> Result<Self, PortalError> {
        let base_url = validate_base_url(base_url)?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            base_url,
            http,
            token: token.into(),
        })
    }

    /// Build a client and sign in with `credentials`.
    pub async fn connect(base_url: &str, credentials: &Credentials) -> Result<Self, PortalError> {
        let anonymous = Self::anonymous(base_url)?;
        let token = anonymous
            .authenticate(&credentials.username, &credentials.password)
            .await?;
        debug!(base_url = %anonymous.base_url, "portal client authenticated");

        Ok(Self { token, ..anonymous })
    }

    /// Normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a token was issued for this client.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Exchange credentials for a new token via `POST /token`.
    ///
    /// Empty credentials are rejected before any request is built.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, PortalError> {
        if username.is_empty() || password.is_empty() {
            return Err(PortalError::MissingCredentials);
        }

        let builder = self
            .request(Method::POST, TOKEN_ENDPOINT)
            .basic_auth(username, Some(password));
        let (status, text) = self.execute(&Method::POST, TOKEN_ENDPOINT, builder).await?;
        let response: TokenResponse = decode_response(&text, Some(status))?;

        Ok(response.token)
    }

    /// Build a request for an API-relative endpoint with the portal headers.
    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = join_url(&self.base_url, endpoint);
        self.http
            .request(method, url)
            .header(ACCESS_TOKEN_HEADER, &self.token)
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// `GET` an endpoint returning a JSON array.
    ///
    /// A body that is not an array fails to decode; `[]` yields an empty
    /// vector.
    pub async fn fetch_list<T>(&self, endpoint: &str) -> Result<Vec<T>, PortalError>
    where
        T: DeserializeOwned,
    {
        self.read_json(Method::GET, endpoint).await
    }

    /// `GET` an endpoint returning a single JSON record.
    pub async fn fetch_one<T>(&self, endpoint: &str) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
    {
        self.read_json(Method::GET, endpoint).await
    }

    /// `POST` a JSON body and decode the response as `R`.
    pub async fn submit<B, R>(&self, endpoint: &str, body: &B) -> Result<R, PortalError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let (status, text) = self.post(endpoint, body).await?;
        Ok(decode_response(&text, Some(status))?)
    }

    /// `POST` a JSON body, ignoring whatever the portal answers with.
    pub async fn submit_discarding<B>(&self, endpoint: &str, body: &B) -> Result<(), PortalError>
    where
        B: Serialize + ?Sized,
    {
        self.post(endpoint, body).await.map(|_| ())
    }

    /// `DELETE` an endpoint and decode the echoed record.
    pub async fn remove<T>(&self, endpoint: &str) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
    {
        self.read_json(Method::DELETE, endpoint).await
    }

    async fn read_json<T>(&self, method: Method, endpoint: &str) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
    {
        let builder = self.request(method.clone(), endpoint);
        let (status, text) = self.execute(&method, endpoint, builder).await?;
        Ok(decode_response(&text, Some(status))?)
    }

    async fn post<B>(&self, endpoint: &str, body: &B) -> Result<(StatusCode, String), PortalError>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body).map_err(PortalError::Encode)?;
        debug!(path = %endpoint, body_len = payload.len(), "http request body prepared");

        let builder = self.request(Method::POST, endpoint).body(payload);
        self.execute(&Method::POST, endpoint, builder).await
    }

    /// Send a prepared request and return the body of a 200 response.
    async fn execute(&self, method: &Method, endpoint: &str, builder: RequestBuilder) -> Result<(StatusCode, String), PortalError> {
        let start = Instant::now();
        debug!(method = %method, path = %endpoint, "http request started");

        let response = builder.send().await.map_err(|error| {
            warn!(
                method = %method,
                path = %endpoint,
                error = %error,
                duration_ms = start.elapsed().as_millis(),
                "http request failed"
            );
            PortalError::Transport(error)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            warn!(
                method = %method,
                path = %endpoint,
                status = %status,
                body_len = text.len(),
                duration_ms = start.elapsed().as_millis(),
                "http request rejected"
            );
            return Err(PortalError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(
            method = %method,
            path = %endpoint,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "http request completed"
        );
        Ok((status, text))
    }
}

/// Validate and normalize a base URL.
///
/// Rules:
/// - the URL must parse, include a host and use `http` or `https`
/// - `localhost` or `127.0.0.1`: either scheme is allowed
/// - otherwise: scheme must be HTTPS
///
/// A trailing `/` is removed from the returned value.
pub fn validate_base_url(base: &str) -> Result<String, PortalError> {
    let trimmed = base.trim().trim_end_matches('/');
    let parsed_base_url = Url::parse(trimmed).map_err(|e| PortalError::invalid_base_url(trimmed, e.to_string()))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| PortalError::invalid_base_url(trimmed, "URL must include a host"))?;

    let scheme = parsed_base_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(PortalError::invalid_base_url(trimmed, format!("unsupported scheme '{scheme}'")));
    }

    let is_local = LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed));
    if !is_local && scheme != "https" {
        return Err(PortalError::invalid_base_url(
            trimmed,
            format!("non-localhost hosts must use https; got '{scheme}://'"),
        ));
    }

    Ok(trimmed.to_string())
}
