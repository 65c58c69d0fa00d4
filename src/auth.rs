//! Credential exchange.
//!
//! Turns an email address and API token into a bearer-token `Session` via
//! the account's first OAuth client.

use std::fmt;

use crate::config::Credentials;
use crate::error::ViewerError;
use crate::models::{ClientsResponse, TokenRequest, TokenResponse};
use crate::zendesk_client::ZendeskClient;

/// Tickets per page in the paged view.
pub const PAGE_SIZE: u32 = 25;

/// A signed-in session: the ticket locator base and the bearer header.
///
/// Immutable once created; it lives as long as the process.
#[derive(Clone)]
pub struct Session {
    base_url: String,
    authorization: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("authorization", &"Bearer [REDACTED]")
            .finish()
    }
}

impl Session {
    /// Creates a session from a ticket locator base and a bearer token.
    pub fn new(base_url: impl Into<String>, token: &str) -> Self {
        Self {
            base_url: base_url.into(),
            authorization: format!("Bearer {}", token),
        }
    }

    /// The ticket locator base, ending in `?`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The full `Authorization` header value.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// The bare token, for sanitizing error messages only.
    pub(crate) fn token(&self) -> &str {
        self.authorization
            .strip_prefix("Bearer ")
            .unwrap_or(&self.authorization)
    }

    /// Locator of the first page of the paged view.
    pub fn first_page_locator(&self) -> String {
        format!("{}per_page={}&start_time=0", self.base_url, PAGE_SIZE)
    }

    /// Locator of the unpaged query used for single-ticket lookups.
    pub fn all_tickets_locator(&self) -> String {
        format!("{}start_time=0", self.base_url)
    }
}

/// Exchanges credentials for a session.
///
/// Lists the account's OAuth clients, requests a read/write token for the
/// first one, and builds the session around it. There is no retry here;
/// the caller decides whether to ask for new credentials.
///
/// # Errors
///
/// - `ViewerError::Authentication` if the credentials are refused
/// - `ViewerError::NoOAuthClient` if the account has no OAuth client
/// - any transport or parse failure from either request
pub async fn resolve(
    client: &ZendeskClient,
    credentials: &Credentials,
) -> Result<Session, ViewerError> {
    tracing::debug!(subdomain = %credentials.subdomain, "Listing OAuth clients");

    let clients: ClientsResponse = client
        .get_with_basic_auth(&client.oauth_clients_url(), credentials)
        .await?;
    let client_id = clients.first_client_id()?;

    tracing::debug!(client_id = %client_id, "Requesting OAuth token");

    let token: TokenResponse = client
        .post_with_basic_auth(
            &client.oauth_tokens_url(),
            &TokenRequest::for_client(client_id),
            credentials,
        )
        .await?;

    if token.token.full_token.is_empty() {
        return Err(ViewerError::unexpected("token endpoint returned an empty token"));
    }

    tracing::info!("Signed in to Zendesk");

    Ok(Session::new(
        client.ticket_cursor_base(),
        &token.token.full_token,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> Session {
        Session::new(
            "https://acme.zendesk.com/api/v2/incremental/tickets/cursor.json?",
            "tok123",
        )
    }

    #[test]
    fn test_session_locators() {
        let session = test_session();
        assert_eq!(
            session.first_page_locator(),
            "https://acme.zendesk.com/api/v2/incremental/tickets/cursor.json?per_page=25&start_time=0"
        );
        assert_eq!(
            session.all_tickets_locator(),
            "https://acme.zendesk.com/api/v2/incremental/tickets/cursor.json?start_time=0"
        );
    }

    #[test]
    fn test_session_authorization() {
        let session = test_session();
        assert_eq!(session.authorization(), "Bearer tok123");
        assert_eq!(session.token(), "tok123");
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let debug = format!("{:?}", test_session());
        assert!(!debug.contains("tok123"));
        assert!(debug.contains("REDACTED"));
    }
}
