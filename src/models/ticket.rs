//! Ticket models for the Zendesk incremental export API.
//!
//! Ticket records arrive as loosely shaped JSON objects. `CursorPage`
//! keeps them raw so the table builder can project the fields it needs
//! and report exactly which record is malformed.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ViewerError;

/// One page of `GET /api/v2/incremental/tickets/cursor.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct CursorPage {
    /// Raw ticket records, in server order.
    #[serde(default)]
    pub tickets: Vec<Value>,

    /// True on the last page of the stream.
    pub end_of_stream: bool,

    /// Locator of the next page.
    #[serde(default)]
    pub after_url: Option<String>,
}

impl CursorPage {
    /// Returns the locator of the following page, or `None` on the last page.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::UnexpectedResponse` if the stream continues but
    /// no `after_url` was sent.
    pub fn next_locator(&self) -> Result<Option<&str>, ViewerError> {
        if self.end_of_stream {
            return Ok(None);
        }
        match self.after_url.as_deref() {
            Some(url) if !url.is_empty() => Ok(Some(url)),
            _ => Err(ViewerError::unexpected(
                "page is not the end of the stream but has no after_url",
            )),
        }
    }
}

/// A ticket projected to the columns the viewer shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Unique ticket id.
    pub id: u64,

    /// Ticket type (`problem`, `incident`, ...). Often null.
    pub ticket_type: Option<String>,

    /// Subject line.
    pub subject: String,

    /// Status (`new`, `open`, `pending`, `solved`, ...), kept opaque.
    pub status: String,

    /// Id of the requesting user.
    pub requester_id: u64,
}

impl Ticket {
    /// Projects a raw record onto the ticket columns.
    ///
    /// `index` is the record's position in the response and is only used
    /// for error reporting.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::MissingField` when a column is absent and
    /// `ViewerError::InvalidField` when it has the wrong shape.
    pub fn from_record(record: &Value, index: usize) -> Result<Self, ViewerError> {
        let object = record.as_object().ok_or_else(|| ViewerError::InvalidField {
            field: "record",
            index,
            reason: "expected a JSON object".to_string(),
        })?;

        let id = field(object, "id", index)?;
        let id = id.as_u64().ok_or_else(|| ViewerError::InvalidField {
            field: "id",
            index,
            reason: format!("expected a non-negative integer, got {}", id),
        })?;

        Ok(Ticket {
            id,
            ticket_type: nullable_string(field(object, "type", index)?, "type", index)?,
            subject: nullable_string(field(object, "subject", index)?, "subject", index)?
                .unwrap_or_default(),
            status: nullable_string(field(object, "status", index)?, "status", index)?
                .unwrap_or_default(),
            requester_id: coerce_id(field(object, "requester_id", index)?, "requester_id", index)?,
        })
    }

    /// Returns the type, or the text `None` when unset.
    pub fn display_type(&self) -> &str {
        self.ticket_type.as_deref().unwrap_or("None")
    }
}

fn field<'a>(
    object: &'a Map<String, Value>,
    name: &'static str,
    index: usize,
) -> Result<&'a Value, ViewerError> {
    object
        .get(name)
        .ok_or(ViewerError::MissingField { field: name, index })
}

fn nullable_string(
    value: &Value,
    name: &'static str,
    index: usize,
) -> Result<Option<String>, ViewerError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(ViewerError::InvalidField {
            field: name,
            index,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

/// Coerces an integer or a numeric string into an id.
fn coerce_id(value: &Value, name: &'static str, index: usize) -> Result<u64, ViewerError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ViewerError::InvalidField {
        field: name,
        index,
        reason: format!("expected a numeric id, got {}", value),
    })
}
