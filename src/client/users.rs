//! Client lookup and pokes

use std::collections::HashMap;

use crate::error::Result;
use crate::network::Transport;
use crate::protocol::{Command, Outcome, Record, Status};
use super::Client;

/// A client database entry plus its currently connected sessions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    /// Client database id (CLDBID)
    pub cldbid: i64,
    /// Unique client identity
    pub uid: String,
    pub nickname: String,
    /// Unix timestamp of account creation
    pub created: Option<i64>,
    /// Unix timestamp of the last connection
    pub last_connected: Option<i64>,
    pub total_connections: Option<i64>,
    pub last_ip: Option<String>,
    pub description: Option<String>,
    /// Session ids (CLIDs) of every connection this user currently has open
    pub active_session_ids: Vec<i64>,
}

impl User {
    /// Build from a `clientdbinfo` record
    ///
    /// `clientdbinfo` echoes the database id, but not every server version
    /// does; `cldbid` is used when the record lacks it.
    fn from_dbinfo(record: &Record, cldbid: i64) -> Result<Self> {
        Ok(Self {
            cldbid: record.opt_int("client_database_id")?.unwrap_or(cldbid),
            uid: record.string("client_unique_identifier")?,
            nickname: record.string("client_nickname")?,
            created: record.opt_int("client_created")?,
            last_connected: record.opt_int("client_lastconnected")?,
            total_connections: record.opt_int("client_totalconnections")?,
            last_ip: record.opt_string("client_lastip")?,
            description: record.opt_string("client_description")?,
            active_session_ids: Vec::new(),
        })
    }
}

impl<T: Transport> Client<T> {
    /// Connected sessions grouped by database id
    ///
    /// `cldbid -> [clid, ...]`; one account can be connected several times.
    pub fn active_clients(&mut self) -> Result<Outcome<HashMap<i64, Vec<i64>>>> {
        let response = self.execute(&Command::new("clientlist"))?;
        if !response.is_success() {
            return Ok(Outcome::failed(response.status));
        }

        let mut sessions: HashMap<i64, Vec<i64>> = HashMap::new();
        for record in &response.records {
            match (record.int("client_database_id"), record.int("clid")) {
                (Ok(cldbid), Ok(clid)) => sessions.entry(cldbid).or_default().push(clid),
                (Err(e), _) | (_, Err(e)) => tracing::warn!("Skipping clientlist record: {}", e),
            }
        }

        Ok(Outcome::new(response.status, sessions))
    }

    /// Look up a client by database id
    pub fn user_find_by_db_id(&mut self, cldbid: i64) -> Result<Outcome<Option<User>>> {
        let response = self.execute(&Command::new("clientdbinfo").param("cldbid", cldbid))?;
        let user = match response.first() {
            Some(record) if response.is_success() => Some(User::from_dbinfo(record, cldbid)?),
            _ => None,
        };
        Ok(Outcome::new(response.status, user))
    }

    /// Look up a client by a custom field attached through a privilege key
    ///
    /// Only one `ident`/`value` pair can be searched at a time. `value` is a
    /// pattern; `%` matches anything.
    pub fn user_find_by_custom_search(
        &mut self,
        ident: &str,
        value: &str,
    ) -> Result<Outcome<Option<User>>> {
        let response = self.execute(
            &Command::new("customsearch")
                .param("ident", ident)
                .param("pattern", value),
        )?;
        if !response.is_success() {
            return Ok(Outcome::failed(response.status));
        }

        let cldbid = match response.first() {
            Some(record) => record.int("cldbid")?,
            None => return Ok(Outcome::new(response.status, None)),
        };
        self.user_find_by_db_id(cldbid)
    }

    /// Poke one session
    pub fn user_poke(&mut self, clid: i64, message: &str) -> Result<Status> {
        self.run(
            Command::new("clientpoke")
                .param("clid", clid)
                .param("msg", message),
        )
    }

    /// Resolve database ids to users with their active sessions attached
    ///
    /// Users that cannot be looked up or parsed are logged and skipped.
    pub(crate) fn resolve_members(
        &mut self,
        status: Status,
        records: &[Record],
    ) -> Result<Outcome<Vec<User>>> {
        let sessions = self.active_clients()?;
        if !sessions.is_success() {
            return Ok(Outcome::failed(sessions.status));
        }
        let sessions = sessions.data;

        let mut members = Vec::with_capacity(records.len());
        for record in records {
            let cldbid = match record.int("cldbid") {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Skipping member record: {}", e);
                    continue;
                }
            };

            match self.user_find_by_db_id(cldbid) {
                Ok(Outcome {
                    data: Some(mut user),
                    ..
                }) => {
                    user.active_session_ids = sessions.get(&cldbid).cloned().unwrap_or_default();
                    members.push(user);
                }
                Ok(outcome) => {
                    tracing::warn!("Failed to look up cldbid {}: {}", cldbid, outcome.status)
                }
                Err(e) if e.is_field_error() => {
                    tracing::warn!("Failed to look up cldbid {}: {}", cldbid, e)
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Outcome::new(status, members))
    }

    /// Poke every active session of `members`
    ///
    /// Never fails because a single poke failed; the result is a
    /// synthesized status with the success ratio.
    pub(crate) fn poke_sessions(&mut self, members: &[User], message: &str) -> Status {
        let mut attempted = 0;
        let mut failed = 0;

        for user in members {
            for &clid in &user.active_session_ids {
                attempted += 1;
                match self.user_poke(clid, message) {
                    Ok(status) if status.is_success() => {}
                    Ok(status) => {
                        failed += 1;
                        tracing::warn!("Failed to poke {} (clid {}): {}", user.nickname, clid, status);
                    }
                    Err(e) => {
                        failed += 1;
                        tracing::warn!("Failed to poke {} (clid {}): {}", user.nickname, clid, e);
                    }
                }
            }
        }

        Status::aggregate(attempted, failed)
    }
}
