//! Ticket tables.
//!
//! A `TicketTable` holds the projected tickets of one response in server
//! order, indexed by id for single-ticket lookups, and renders them as a
//! fixed-width text table.

use std::collections::HashMap;

use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::ViewerError;
use crate::models::Ticket;

/// Display width of the type column.
pub const TYPE_WIDTH: usize = 10;
/// Display width of the subject column.
pub const SUBJECT_WIDTH: usize = 40;
/// Display width of the status column.
pub const STATUS_WIDTH: usize = 8;

const COLUMN_GAP: &str = "  ";

/// Tickets of one response, unique by id.
#[derive(Debug, Clone, Default)]
pub struct TicketTable {
    rows: Vec<Ticket>,
    index: HashMap<u64, usize>,
}

impl TicketTable {
    /// Builds a table from raw ticket records.
    ///
    /// Rows keep the input order. If an id occurs more than once, the later
    /// record's values replace the earlier ones and the row stays where the
    /// id first appeared.
    ///
    /// # Errors
    ///
    /// Fails on the first record that is missing a column or has one of the
    /// wrong shape; see [`Ticket::from_record`].
    pub fn build(records: &[Value]) -> Result<Self, ViewerError> {
        let mut table = TicketTable {
            rows: Vec::with_capacity(records.len()),
            index: HashMap::with_capacity(records.len()),
        };

        for (i, record) in records.iter().enumerate() {
            let ticket = Ticket::from_record(record, i)?;
            match table.index.get(&ticket.id) {
                Some(&row) => {
                    tracing::debug!(id = ticket.id, "Duplicate ticket id, keeping the later record");
                    table.rows[row] = ticket;
                }
                None => {
                    table.index.insert(ticket.id, table.rows.len());
                    table.rows.push(ticket);
                }
            }
        }

        Ok(table)
    }

    /// Number of tickets.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no tickets.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.rows.iter().map(|t| t.id)
    }

    /// Looks up a single ticket.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::NotFound` if no ticket has this id.
    pub fn view_single(&self, id: u64) -> Result<&Ticket, ViewerError> {
        self.index
            .get(&id)
            .map(|&row| &self.rows[row])
            .ok_or(ViewerError::NotFound { id })
    }

    /// Renders every row under a header.
    pub fn render(&self) -> String {
        render_rows(&self.rows.iter().collect::<Vec<_>>())
    }
}

/// Renders one ticket as a single-row table.
pub fn render_single(ticket: &Ticket) -> String {
    render_rows(&[ticket])
}

fn render_rows(tickets: &[&Ticket]) -> String {
    let id_width = tickets
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(0)
        .max("id".len());

    let mut output = format_line(id_width, "id", "type", "subject", "status", "requester_id");
    for ticket in tickets {
        output.push_str(&format_line(
            id_width,
            &ticket.id.to_string(),
            ticket.display_type(),
            &ticket.subject,
            &ticket.status,
            &ticket.requester_id.to_string(),
        ));
    }
    output
}

fn format_line(
    id_width: usize,
    id: &str,
    ticket_type: &str,
    subject: &str,
    status: &str,
    requester: &str,
) -> String {
    let mut line = format!("{:>width$}", id, width = id_width);
    for (cell, width) in [
        (ticket_type, TYPE_WIDTH),
        (subject, SUBJECT_WIDTH),
        (status, STATUS_WIDTH),
    ] {
        line.push_str(COLUMN_GAP);
        line.push_str(&pad_to_width(&truncate_to_width(&single_line(cell), width), width));
    }
    line.push_str(COLUMN_GAP);
    line.push_str(requester);
    line.push('\n');
    line
}

/// Replaces control characters so a cell never breaks the row.
fn single_line(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Cuts `s` to `max_width` display columns, ending in `…` when cut.
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

/// Pads `s` with spaces to `width` display columns.
fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}
