//! Protocol Module
//!
//! Encoding and decoding of the ServerQuery text protocol. Everything here is
//! pure: no I/O except the stream helpers in `codec`, which operate on any
//! `BufRead`/`Write`.
//!
//! ## Protocol Format
//!
//! ### Request
//! ```text
//! <verb> <key>=<escaped value> <key>=<escaped value>...\n
//! ```
//!
//! ### Reply
//! ```text
//! <k=v k=v>|<k=v k=v>|...      record list (optional)
//! error id=<int> msg=<escaped>  status line
//! ```
//!
//! ### Status
//! - `msg=ok`: success
//! - anything else: protocol failure, reported as a non-success [`Status`]
//! - `id=-1`: synthesized by the client (aggregates), always success

mod command;
mod record;
mod response;
mod codec;
pub mod escape;

pub use command::{Command, ParamValue, Scope};
pub use record::{collect_records, FieldEncoding, FromRecord, Record};
pub use response::{
    is_status_line, parse_record_list, parse_response, parse_status_line, Outcome, Response,
    Status, SYNTHESIZED_CODE,
};
pub use codec::{read_greeting, read_response, write_command, GREETING_PREFIX, MAX_REPLY_SIZE};
pub use escape::{decode, encode, form_decode, form_encode};
