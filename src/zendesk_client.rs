//! HTTP client for the Zendesk API.
//!
//! This module provides `ZendeskClient`, which issues the three request
//! shapes the viewer needs (bearer GET, basic-auth GET, basic-auth POST)
//! and classifies every response as a parsed payload or a `ViewerError`,
//! and `TicketApi`, the signed-in ticket source used by the viewer.
//!
//! There is no retry logic here: a failed request is returned as-is and
//! the caller decides whether to re-prompt.
//!
//! # Security
//!
//! Tokens are never logged. Error bodies are sanitized before they are
//! stored in an error, and the `Authorization` header is marked sensitive.

use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::Session;
use crate::config::Credentials;
use crate::error::ViewerError;
use crate::models::CursorPage;
use crate::pager::TicketSource;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum length for HTTP error response bodies kept in errors.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Path of the OAuth client listing.
const OAUTH_CLIENTS_PATH: &str = "/api/v2/oauth/clients.json";

/// Path of the OAuth token endpoint.
const OAUTH_TOKENS_PATH: &str = "/api/v2/oauth/tokens.json";

/// Path of the incremental ticket export with cursor pagination.
const TICKET_CURSOR_PATH: &str = "/api/v2/incremental/tickets/cursor.json";

/// HTTP client for the Zendesk API.
///
/// # Example
///
/// ```ignore
/// let client = ZendeskClient::new("https://acme.zendesk.com")?;
/// let session = auth::resolve(&client, &credentials).await?;
/// let page: CursorPage = client
///     .get_with_bearer(&session.first_page_locator(), &session)
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct ZendeskClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// API root, e.g. `https://acme.zendesk.com`, without trailing slash.
    api_root: String,
}

impl ZendeskClient {
    /// Creates a client for an API root.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::HttpClient` if the HTTP client fails to
    /// initialize, or `ViewerError::Config` if the root is not a URL.
    pub fn new(api_root: &str) -> Result<Self, ViewerError> {
        let api_root = api_root.trim_end_matches('/').to_string();
        Url::parse(&api_root)
            .map_err(|e| ViewerError::invalid_config(format!("invalid API root: {}", e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ViewerError::HttpClient)?;

        Ok(Self { http, api_root })
    }

    /// Returns the API root.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// URL of the OAuth client listing.
    pub fn oauth_clients_url(&self) -> String {
        format!("{}{}", self.api_root, OAUTH_CLIENTS_PATH)
    }

    /// URL of the OAuth token endpoint.
    pub fn oauth_tokens_url(&self) -> String {
        format!("{}{}", self.api_root, OAUTH_TOKENS_PATH)
    }

    /// Base of every ticket locator, ending in `?` so query parameters can
    /// be appended directly.
    pub fn ticket_cursor_base(&self) -> String {
        format!("{}{}?", self.api_root, TICKET_CURSOR_PATH)
    }

    /// Checks that a locator received from the server points back at the
    /// API root before the bearer token is sent to it.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Validation` on a parse failure or a scheme,
    /// host or port mismatch.
    pub fn validate_locator(&self, locator: &str) -> Result<(), ViewerError> {
        let parsed = Url::parse(locator)
            .map_err(|e| ViewerError::validation(format!("invalid page locator: {}", e)))?;
        let root = Url::parse(&self.api_root)
            .map_err(|e| ViewerError::validation(format!("invalid API root: {}", e)))?;

        if parsed.scheme() != root.scheme()
            || parsed.host_str() != root.host_str()
            || parsed.port_or_known_default() != root.port_or_known_default()
        {
            return Err(ViewerError::validation(format!(
                "page locator host mismatch: expected {:?}, got {:?}",
                root.host_str(),
                parsed.host_str()
            )));
        }
        Ok(())
    }

    /// GET with `Authorization: Bearer <token>`.
    pub async fn get_with_bearer<T>(&self, url: &str, session: &Session) -> Result<T, ViewerError>
    where
        T: DeserializeOwned,
    {
        let mut auth = HeaderValue::from_str(session.authorization())
            .map_err(|_| ViewerError::validation("bearer token is not a valid header value"))?;
        auth.set_sensitive(true);

        let req = self.http.get(url).header(AUTHORIZATION, auth);
        self.send(req, format!("GET {}", url), session.token()).await
    }

    /// GET with basic auth `(<email>/token, <api token>)`.
    pub async fn get_with_basic_auth<T>(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> Result<T, ViewerError>
    where
        T: DeserializeOwned,
    {
        let req = self
            .http
            .get(url)
            .basic_auth(credentials.username(), Some(credentials.api_token()));
        self.send(req, format!("GET {}", url), credentials.api_token())
            .await
    }

    /// POST a JSON body with basic auth.
    pub async fn post_with_basic_auth<T, B>(
        &self,
        url: &str,
        body: &B,
        credentials: &Credentials,
    ) -> Result<T, ViewerError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        let req = self
            .http
            .post(url)
            .basic_auth(credentials.username(), Some(credentials.api_token()))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(req, format!("POST {}", url), credentials.api_token())
            .await
    }

    /// Sends a request and parses a successful body as JSON.
    ///
    /// The body is read in full before parsing, so a failure never yields a
    /// partially parsed value.
    async fn send<T>(
        &self,
        req: RequestBuilder,
        operation: String,
        secret: &str,
    ) -> Result<T, ViewerError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(operation = %operation, "Making Zendesk API request");

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                return ViewerError::timeout(
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                    operation.clone(),
                );
            }
            ViewerError::Unreachable(e)
        })?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::handle_http_error(status, response, secret).await);
        }

        let body = response.text().await.map_err(ViewerError::Unreachable)?;

        tracing::trace!(bytes = body.len(), "Zendesk API response");

        serde_json::from_str(&body).map_err(ViewerError::Serialization)
    }

    /// Converts a non-success response into a `ViewerError`.
    async fn handle_http_error(
        status: StatusCode,
        response: reqwest::Response,
        secret: &str,
    ) -> ViewerError {
        let body = response.text().await.unwrap_or_default();
        let body = ViewerError::sanitize_message(&body, secret);
        let body = truncate_body(body);

        tracing::warn!(status = %status, "Zendesk API rejected the request");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ViewerError::Authentication,
            _ => ViewerError::HttpStatus { status, body },
        }
    }
}

/// Truncates an error body on a character boundary.
fn truncate_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body;
    }
    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

/// A signed-in view of the ticket endpoints.
#[derive(Clone)]
pub struct TicketApi {
    client: ZendeskClient,
    session: Session,
}

impl TicketApi {
    /// Pairs a client with the session it resolved.
    pub fn new(client: ZendeskClient, session: Session) -> Self {
        Self { client, session }
    }
}

impl TicketSource for TicketApi {
    fn first_page_locator(&self) -> String {
        self.session.first_page_locator()
    }

    async fn fetch_page(&self, locator: &str) -> Result<CursorPage, ViewerError> {
        self.client.validate_locator(locator)?;
        self.client.get_with_bearer(locator, &self.session).await
    }

    async fn fetch_all(&self) -> Result<CursorPage, ViewerError> {
        let locator = self.session.all_tickets_locator();
        self.client.get_with_bearer(&locator, &self.session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ZendeskClient {
        ZendeskClient::new("https://acme.zendesk.com/").unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let client = test_client();
        assert_eq!(client.api_root(), "https://acme.zendesk.com");
        assert_eq!(
            client.oauth_clients_url(),
            "https://acme.zendesk.com/api/v2/oauth/clients.json"
        );
        assert_eq!(
            client.oauth_tokens_url(),
            "https://acme.zendesk.com/api/v2/oauth/tokens.json"
        );
        assert_eq!(
            client.ticket_cursor_base(),
            "https://acme.zendesk.com/api/v2/incremental/tickets/cursor.json?"
        );
    }

    #[test]
    fn test_new_rejects_invalid_root() {
        assert!(matches!(
            ZendeskClient::new("not a url"),
            Err(ViewerError::Config(_))
        ));
    }

    #[test]
    fn test_validate_locator_same_host() {
        let client = test_client();
        assert!(client
            .validate_locator(
                "https://acme.zendesk.com/api/v2/incremental/tickets/cursor.json?cursor=abc"
            )
            .is_ok());
    }

    #[test]
    fn test_validate_locator_rejects_other_host() {
        let client = test_client();
        let err = client
            .validate_locator("https://evil.example.com/api/v2/incremental/tickets/cursor.json")
            .unwrap_err();
        assert!(err.to_string().contains("host mismatch"));
        assert!(client.validate_locator("http://acme.zendesk.com/x").is_err());
        assert!(client.validate_locator("https://acme.zendesk.com:8443/x").is_err());
        assert!(client.validate_locator("not a url").is_err());
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short".to_string()), "short");

        let long = "é".repeat(MAX_ERROR_BODY_LEN);
        let truncated = truncate_body(long);
        assert!(truncated.ends_with("...[truncated]"));
        assert!(truncated.len() <= MAX_ERROR_BODY_LEN + "...[truncated]".len());
    }
}
