//! Data models for the Zendesk API.
//!
//! This module contains the wire types for the OAuth handshake, the
//! incremental cursor endpoint, and the projected `Ticket` record.

mod oauth;
mod ticket;

pub use oauth::*;
pub use ticket::*;
