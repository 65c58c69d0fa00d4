//! # Ticket Viewer
//!
//! A terminal viewer for Zendesk tickets. It signs in with an email address
//! and API token, walks the incremental ticket export page by page, and lets
//! the user browse the pages or look up a single ticket by id.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types and the messages shown for them
//! - [`zendesk_client`] - HTTP client for the Zendesk API
//! - [`auth`] - OAuth token exchange producing a [`auth::Session`]
//! - [`pager`] - Cursor pagination and page navigation
//! - [`table`] - Ticket tables built from raw records
//! - [`prompt`] - Menu and credential prompts
//! - [`viewer`] - The interactive loop
//! - [`app`] - Sign-in and wiring for the binary
//! - [`models`] - Wire types for the Zendesk API
//!
//! ## Configuration
//!
//! Optional environment variables (a `.env` file is honored):
//!
//! - `ZENDESK_SUBDOMAIN`, `ZENDESK_EMAIL`, `ZENDESK_API_TOKEN`: credentials;
//!   anything missing is asked for at startup
//! - `ZENDESK_API_URL`: API root override
//! - `TICKET_VIEWER_RETRY_DELAY_SECS`: pause between page list attempts
//! - `RUST_LOG`: log level (e.g., `ticket_viewer=debug`)
//!
//! ## Example
//!
//! ```ignore
//! use ticket_viewer::{auth, config::Credentials, zendesk_client::ZendeskClient};
//!
//! async fn example() -> Result<(), ticket_viewer::error::ViewerError> {
//!     let credentials = Credentials::new("acme", "agent@acme.com", "api-token")?;
//!     let client = ZendeskClient::new("https://acme.zendesk.com")?;
//!     let session = auth::resolve(&client, &credentials).await?;
//!     println!("first page: {}", session.first_page_locator());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pager;
pub mod prompt;
pub mod table;
pub mod viewer;
pub mod zendesk_client;
