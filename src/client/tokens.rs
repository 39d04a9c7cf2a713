//! Privilege keys
//!
//! A privilege key grants a group membership to whoever redeems it. Custom
//! fields attached to the key are copied to the redeeming client and can be
//! searched later with [`Client::user_find_by_custom_search`].
//!
//! Custom fields travel as a record list nested inside a single value:
//!
//! ```text
//! tokencustomset=ident=forum_user\svalue=dante\pident=forum_id\svalue=123
//!                └──────── one escaped value: "ident=.. value=..|ident=.." ───┘
//! ```

use std::collections::BTreeMap;

use crate::error::{QueryError, Result};
use crate::network::Transport;
use crate::protocol::{collect_records, encode, parse_record_list, Command, FromRecord, Outcome, Record, Status};
use super::Client;

/// What a privilege key grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTarget {
    /// Membership in a server group
    ServerGroup { group_id: i64 },
    /// Membership in a channel group for one channel
    ChannelGroup { group_id: i64, channel_id: i64 },
}

impl TokenTarget {
    /// `(tokentype, tokenid1, tokenid2)`
    fn wire_ids(&self) -> (i64, i64, i64) {
        match *self {
            TokenTarget::ServerGroup { group_id } => (0, group_id, 0),
            TokenTarget::ChannelGroup {
                group_id,
                channel_id,
            } => (1, group_id, channel_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeKey {
    pub token: String,
    pub target: TokenTarget,
    pub description: String,
    /// Unix timestamp; unknown for keys just created
    pub created: Option<i64>,
    pub custom_fields: BTreeMap<String, String>,
}

impl FromRecord for PrivilegeKey {
    fn from_record(record: &Record) -> Result<Self> {
        let group_id = record.int("token_id1")?;
        let target = match record.int("token_type")? {
            0 => TokenTarget::ServerGroup { group_id },
            1 => TokenTarget::ChannelGroup {
                group_id,
                channel_id: record.int("token_id2")?,
            },
            other => {
                return Err(QueryError::malformed(
                    "token_type",
                    &other.to_string(),
                    "expected 0 or 1",
                ))
            }
        };

        let custom_fields = match record.opt_string("token_customset")? {
            Some(set) => parse_custom_set(&set)?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            token: record.string("token")?,
            target,
            description: record.opt_string("token_description")?.unwrap_or_default(),
            created: record.opt_int("token_created")?,
            custom_fields,
        })
    }
}

/// Build the decoded `tokencustomset` value
fn format_custom_set(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(ident, value)| format!("ident={} value={}", encode(ident), encode(value)))
        .collect::<Vec<_>>()
        .join("|")
}

/// Parse a decoded `token_customset` value
fn parse_custom_set(set: &str) -> Result<BTreeMap<String, String>> {
    parse_record_list(set)
        .iter()
        .map(|entry| Ok((entry.string("ident")?, entry.string("value")?)))
        .collect()
}

impl<T: Transport> Client<T> {
    /// Create a privilege key
    pub fn tokens_add(
        &mut self,
        target: TokenTarget,
        description: &str,
        custom_fields: &BTreeMap<String, String>,
    ) -> Result<Outcome<Option<PrivilegeKey>>> {
        let (token_type, id1, id2) = target.wire_ids();
        let mut command = Command::new("tokenadd")
            .param("tokentype", token_type)
            .param("tokenid1", id1)
            .param("tokenid2", id2)
            .param("tokendescription", description);
        if !custom_fields.is_empty() {
            command = command.param("tokencustomset", format_custom_set(custom_fields));
        }

        let response = self.execute(&command)?;
        let key = match response.first() {
            Some(record) if response.is_success() => Some(PrivilegeKey {
                token: record.string("token")?,
                target,
                description: description.to_string(),
                created: None,
                custom_fields: custom_fields.clone(),
            }),
            _ => None,
        };
        Ok(Outcome::new(response.status, key))
    }

    pub fn tokens_delete(&mut self, token: &str) -> Result<Status> {
        self.run(Command::new("privilegekeydelete").param("token", token))
    }

    pub fn tokens_list(&mut self) -> Result<Outcome<Vec<PrivilegeKey>>> {
        let response = self.execute(&Command::new("privilegekeylist"))?;
        if !response.is_success() {
            return Ok(Outcome::failed(response.status));
        }
        let keys = collect_records(&response.records);
        Ok(Outcome::new(response.status, keys))
    }
}
