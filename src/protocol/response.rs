//! Response definitions
//!
//! A reply to one command: zero or more records followed by a status line.
//!
//! ```text
//! sgid=6 name=Server\sAdmin type=1|sgid=8 name=Guest type=1     <- record list
//! error id=0 msg=ok                                            <- status line
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use super::escape::decode;
use super::record::Record;

/// Code reserved for statuses synthesized by the client itself
pub const SYNTHESIZED_CODE: i64 = -1;

/// Outcome of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Server error id (`0` on success, `-1` when synthesized or unparseable)
    pub code: i64,

    /// Decoded message
    pub message: String,
}

impl Status {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `error id=0 msg=ok`
    pub fn ok() -> Self {
        Self::new(0, "ok")
    }

    pub fn is_success(&self) -> bool {
        self.message == "ok" || self.code == SYNTHESIZED_CODE
    }

    /// Batch summary for an operation fanned out over several targets
    ///
    /// Nothing attempted is reported as its own message rather than a ratio.
    pub fn aggregate(attempted: usize, failed: usize) -> Self {
        if attempted == 0 {
            return Self::new(SYNTHESIZED_CODE, "No clients to poke (0 failed)");
        }
        let failed = failed.min(attempted);
        let percent = (attempted - failed) * 100 / attempted;
        Self::new(
            SYNTHESIZED_CODE,
            format!("{}% of clients successfully poked ({} failed)", percent, failed),
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id={})", self.message, self.code)
    }
}

/// A parsed reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub records: Vec<Record>,
    pub status: Status,
}

impl Response {
    pub fn new(records: Vec<Record>, status: Status) -> Self {
        Self { records, status }
    }

    /// Reply without records
    pub fn status_only(status: Status) -> Self {
        Self::new(Vec::new(), status)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// First record, if any
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }
}

/// Data returned alongside the status it came with
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub status: Status,
    pub data: T,
}

impl<T> Outcome<T> {
    pub fn new(status: Status, data: T) -> Self {
        Self { status, data }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            status: self.status,
            data: f(self.data),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Non-success status with empty data
    pub fn failed(status: Status) -> Self {
        Self::new(status, T::default())
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

/// True for a line carrying `error id=.. msg=..`
pub fn is_status_line(line: &str) -> bool {
    let line = line.trim();
    line == "error" || line.starts_with("error ")
}

/// Split a complete reply into records and status
///
/// The last non-blank line must be the status line; without it the read was
/// short or garbled, which is a transport fault. With two or more lines the
/// first is the record list and anything in between is ignored.
pub fn parse_response(text: &str) -> Result<Response> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.trim_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect();

    let status_line = match lines.last() {
        Some(line) if is_status_line(line) => *line,
        Some(line) => {
            return Err(QueryError::Transport(format!(
                "reply ended without a status line: {:?}",
                truncate(line, 64)
            )))
        }
        None => return Err(QueryError::Transport("empty reply".to_string())),
    };

    let status = parse_status_line(status_line)?;
    let records = if lines.len() >= 2 {
        parse_record_list(lines[0])
    } else {
        Vec::new()
    };

    Ok(Response::new(records, status))
}

/// Split a record list line on `|`
///
/// An empty line yields no records, not one empty record.
pub fn parse_record_list(line: &str) -> Vec<Record> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    line.split('|').map(Record::parse).collect()
}

/// Parse `error id=<int> msg=<escaped>`
///
/// Tokens are positional. An `id` that does not parse becomes `-1`; a missing
/// `msg` leaves the message empty. Either way the status is still returned.
pub fn parse_status_line(line: &str) -> Result<Status> {
    let line = line.trim();
    if !is_status_line(line) {
        return Err(QueryError::Transport(format!(
            "not a status line: {:?}",
            truncate(line, 64)
        )));
    }

    let parts: Vec<&str> = line.split(' ').collect();
    let code = parts
        .get(1)
        .and_then(|token| token.strip_prefix("id="))
        .and_then(|id| id.parse::<i64>().ok())
        .unwrap_or(SYNTHESIZED_CODE);
    let message = parts
        .get(2)
        .and_then(|token| token.strip_prefix("msg="))
        .map(decode)
        .unwrap_or_default();

    Ok(Status { code, message })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
