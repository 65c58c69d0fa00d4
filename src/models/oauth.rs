//! OAuth handshake types.
//!
//! The viewer lists the account's OAuth clients, then asks for a token
//! issued to the first one.

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Scopes requested for the viewer's token.
pub const TOKEN_SCOPES: [&str; 2] = ["read", "write"];

/// Response of `GET /api/v2/oauth/clients.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientsResponse {
    /// Registered OAuth clients, oldest first.
    #[serde(default)]
    pub clients: Vec<OAuthClient>,
}

impl ClientsResponse {
    /// Returns the id of the first registered client.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::NoOAuthClient` when the list is empty.
    pub fn first_client_id(&self) -> Result<&str, ViewerError> {
        self.clients
            .first()
            .map(|client| client.id.as_str())
            .ok_or(ViewerError::NoOAuthClient)
    }
}

/// A single OAuth client.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClient {
    /// Client id. Zendesk sends an integer; strings are accepted too.
    #[serde(deserialize_with = "deserialize_string_or_int")]
    pub id: String,
}

/// Body of `POST /api/v2/oauth/tokens.json`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    /// The token being requested.
    pub token: TokenGrant,
}

/// Client and scopes for a token request.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant {
    /// The client id, always sent as a string.
    pub client_id: String,
    /// Requested scopes.
    pub scopes: Vec<String>,
}

impl TokenRequest {
    /// Creates a read/write token request for a client.
    pub fn for_client(client_id: impl Into<String>) -> Self {
        Self {
            token: TokenGrant {
                client_id: client_id.into(),
                scopes: TOKEN_SCOPES.iter().map(|s| s.to_string()).collect(),
            },
        }
    }
}

/// Response of `POST /api/v2/oauth/tokens.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The issued token.
    pub token: IssuedToken,
}

/// An issued OAuth token.
#[derive(Clone, Deserialize)]
pub struct IssuedToken {
    /// The bearer token value.
    /// SECURITY: Never log this value!
    pub full_token: String,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("full_token", &"[REDACTED]")
            .finish()
    }
}

/// Deserializes a value that can be either a string or an integer into a String.
fn deserialize_string_or_int<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct StringOrIntVisitor;

    impl<'de> Visitor<'de> for StringOrIntVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or an integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrIntVisitor)
}
