//! Configuration management for the ticket viewer.
//!
//! Values come from environment variables (a `.env` file is loaded by the
//! binary first). Credentials are optional here: anything missing is asked
//! for interactively during sign-in.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::ViewerError;

/// Default delay between attempts to build the page list.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;

/// Maximum length of a DNS label, which bounds the subdomain.
const MAX_SUBDOMAIN_LEN: usize = 63;

/// Configuration loaded from the environment.
#[derive(Clone)]
pub struct Config {
    /// Zendesk subdomain (`ZENDESK_SUBDOMAIN`).
    pub subdomain: Option<String>,

    /// Agent email address (`ZENDESK_EMAIL`).
    pub email: Option<String>,

    /// API token (`ZENDESK_API_TOKEN`).
    /// This value must never be logged or included in error messages.
    api_token: Option<String>,

    /// API root override (`ZENDESK_API_URL`), without trailing slash.
    pub api_url: Option<String>,

    /// Delay between attempts to build the page list.
    pub retry_delay: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("subdomain", &self.subdomain)
            .field("email", &self.email)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ZENDESK_SUBDOMAIN`, `ZENDESK_EMAIL`, `ZENDESK_API_TOKEN`: optional
    ///   credentials, prompted for when absent
    /// - `ZENDESK_API_URL`: optional API root override
    /// - `TICKET_VIEWER_RETRY_DELAY_SECS`: optional retry delay in seconds
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Config` if a present value fails validation.
    pub fn from_env() -> Result<Self, ViewerError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ViewerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let subdomain = get("ZENDESK_SUBDOMAIN")
            .map(|s| validate_subdomain(&s).map(|_| s))
            .transpose()?;
        let email = get("ZENDESK_EMAIL")
            .map(|e| validate_email(&e).map(|_| e))
            .transpose()?;
        let api_token = get("ZENDESK_API_TOKEN")
            .map(|t| validate_api_token(&t).map(|_| t))
            .transpose()?;
        let api_url = get("ZENDESK_API_URL")
            .map(validate_api_url)
            .transpose()?;

        let retry_delay = match get("TICKET_VIEWER_RETRY_DELAY_SECS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ViewerError::invalid_config(
                    "TICKET_VIEWER_RETRY_DELAY_SECS must be a whole number of seconds",
                )
            })?,
            None => Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        };

        Ok(Config {
            subdomain,
            email,
            api_token,
            api_url,
            retry_delay,
        })
    }

    /// Returns the API token from the environment, if any.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    /// Returns the complete credentials if all three were configured.
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            subdomain: self.subdomain.clone()?,
            email: self.email.clone()?,
            api_token: self.api_token.clone()?,
        })
    }

    /// Returns the API root for a subdomain, honoring `ZENDESK_API_URL`.
    pub fn api_root(&self, subdomain: &str) -> String {
        match &self.api_url {
            Some(url) => url.clone(),
            None => format!("https://{}.zendesk.com", subdomain),
        }
    }
}

/// Credentials used for the OAuth handshake.
#[derive(Clone)]
pub struct Credentials {
    /// Zendesk subdomain, e.g. `acme` for `acme.zendesk.com`.
    pub subdomain: String,
    /// Agent email address.
    pub email: String,
    api_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("subdomain", &self.subdomain)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Validates and bundles a set of credentials.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Config` if any value is malformed.
    pub fn new(
        subdomain: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, ViewerError> {
        let subdomain = subdomain.into().trim().to_string();
        let email = email.into().trim().to_string();
        let api_token = api_token.into().trim().to_string();

        validate_subdomain(&subdomain)?;
        validate_email(&email)?;
        validate_api_token(&api_token)?;

        Ok(Self {
            subdomain,
            email,
            api_token,
        })
    }

    /// The basic-auth username: `<email>/token`.
    pub fn username(&self) -> String {
        format!("{}/token", self.email)
    }

    /// The API token.
    /// SECURITY: Never log this value!
    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

/// Validates a subdomain as a single DNS label.
fn validate_subdomain(subdomain: &str) -> Result<(), ViewerError> {
    let valid = !subdomain.is_empty()
        && subdomain.len() <= MAX_SUBDOMAIN_LEN
        && subdomain
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !subdomain.starts_with('-')
        && !subdomain.ends_with('-');

    if !valid {
        return Err(ViewerError::invalid_config(
            "subdomain must contain only letters, digits and inner hyphens",
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ViewerError> {
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ViewerError::invalid_config(
            "email must look like name@example.com",
        )),
    }
}

/// Validates the API token is not empty or a placeholder value.
fn validate_api_token(token: &str) -> Result<(), ViewerError> {
    if token.is_empty() {
        return Err(ViewerError::invalid_config("API token must not be empty"));
    }

    let token_lower = token.to_lowercase();
    let placeholder_patterns = [
        "your_api_token",
        "your_token",
        "placeholder",
        "xxx",
        "changeme",
    ];

    for pattern in placeholder_patterns {
        if token_lower.contains(pattern) {
            return Err(ViewerError::invalid_config(
                "ZENDESK_API_TOKEN appears to be a placeholder value",
            ));
        }
    }

    Ok(())
}

/// Validates and normalizes the API root override.
fn validate_api_url(url: String) -> Result<String, ViewerError> {
    let url = url.trim().trim_end_matches('/').to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ViewerError::invalid_config(
            "ZENDESK_API_URL must start with http:// or https://",
        ));
    }

    Ok(url)
}
