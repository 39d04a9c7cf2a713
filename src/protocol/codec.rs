//! Protocol codec
//!
//! Stream helpers that move commands and replies over a byte stream.
//!
//! ## Wire Format
//!
//! ### Command
//! ```text
//! servergroupaddclient sgid=6 cldbid=42\n
//! ```
//!
//! ### Reply
//! ```text
//! [record|record|...]\n\r        (optional)
//! error id=<int> msg=<escaped>\n\r
//! ```
//!
//! Lines starting with `notify` are asynchronous events and never part of a
//! reply. The server terminates lines with `\n\r`; the stray `\r` ends up at
//! the start of the following line and is trimmed away.

use std::io::{BufRead, Read, Write};

use crate::error::{QueryError, Result};
use super::response::{is_status_line, parse_response};
use super::{Command, Response};

/// Maximum accepted reply size (16 MB)
pub const MAX_REPLY_SIZE: usize = 16 * 1024 * 1024;

/// Prefix of the first greeting line
pub const GREETING_PREFIX: &str = "TS3";

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(command.to_wire().as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read lines up to and including the status line, then parse them
///
/// EOF before the status line is a transport fault.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let mut reply = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        // One byte past the limit is enough to detect an oversized reply
        let budget = (MAX_REPLY_SIZE - reply.len()) as u64 + 1;
        let read = reader.by_ref().take(budget).read_line(&mut line)?;
        if read == 0 {
            return Err(QueryError::Transport(format!(
                "connection closed before status line ({} bytes received)",
                reply.len()
            )));
        }

        if reply.len() + line.len() > MAX_REPLY_SIZE {
            return Err(QueryError::Transport(format!(
                "reply too large: more than {} bytes",
                MAX_REPLY_SIZE
            )));
        }

        let trimmed = line.trim_matches(|c| c == '\r' || c == '\n');
        if trimmed.starts_with("notify") {
            tracing::trace!("Skipping event: {}", trimmed);
            continue;
        }

        reply.push_str(trimmed);
        reply.push('\n');

        if reply.len() > MAX_REPLY_SIZE {
            return Err(QueryError::Transport(format!(
                "reply too large: {} bytes (max {})",
                reply.len(),
                MAX_REPLY_SIZE
            )));
        }

        if is_status_line(trimmed) {
            break;
        }
    }

    parse_response(&reply)
}

/// Read the two-line greeting sent on connect
///
/// Returns the welcome line.
pub fn read_greeting<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut banner = String::new();
    if reader.read_line(&mut banner)? == 0 {
        return Err(QueryError::Transport("connection closed during greeting".to_string()));
    }

    let banner = banner.trim();
    if !banner.starts_with(GREETING_PREFIX) {
        return Err(QueryError::Transport(format!(
            "not a ServerQuery interface (greeting {:?})",
            banner
        )));
    }

    let mut welcome = String::new();
    reader.read_line(&mut welcome)?;
    Ok(welcome.trim().to_string())
}
