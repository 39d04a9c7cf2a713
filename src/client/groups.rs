//! Server group and channel group membership

use crate::error::{QueryError, Result};
use crate::network::Transport;
use crate::protocol::{collect_records, Command, FromRecord, Outcome, Record, Status};
use super::{Client, User};

/// Name of the channel group clients are reset to
pub const DEFAULT_CHANNEL_GROUP: &str = "Guest";

/// Kind of a server or channel group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    /// Template for new virtual servers
    Template = 0,
    Regular = 1,
    /// Only for ServerQuery clients
    Query = 2,
}

impl TryFrom<i64> for GroupType {
    type Error = i64;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(GroupType::Template),
            1 => Ok(GroupType::Regular),
            2 => Ok(GroupType::Query),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerGroup {
    pub id: i64,
    pub name: String,
    pub group_type: GroupType,
    pub icon_id: Option<i64>,
    pub sort_id: Option<i64>,
}

impl FromRecord for ServerGroup {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.int("sgid")?,
            name: record.string("name")?,
            group_type: record.int_enum("type")?,
            icon_id: record.opt_int("iconid")?,
            sort_id: record.opt_int("sortid")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub id: i64,
    pub name: String,
    pub group_type: GroupType,
}

impl FromRecord for ChannelGroup {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.int("cgid")?,
            name: record.string("name")?,
            group_type: record.int_enum("type")?,
        })
    }
}

impl<T: Transport> Client<T> {
    // -------------------------------------------------------------------------
    // Server Groups
    // -------------------------------------------------------------------------

    pub fn server_groups(&mut self) -> Result<Outcome<Vec<ServerGroup>>> {
        self.list(Command::new("servergrouplist"))
    }

    pub fn server_group_add_client(&mut self, sgid: i64, cldbid: i64) -> Result<Status> {
        self.run(
            Command::new("servergroupaddclient")
                .param("sgid", sgid)
                .param("cldbid", cldbid),
        )
    }

    pub fn server_group_remove_client(&mut self, sgid: i64, cldbid: i64) -> Result<Status> {
        self.run(
            Command::new("servergroupdelclient")
                .param("sgid", sgid)
                .param("cldbid", cldbid),
        )
    }

    /// Members of a server group, with their active sessions
    pub fn server_group_members(&mut self, sgid: i64) -> Result<Outcome<Vec<User>>> {
        let response = self.execute(&Command::new("servergroupclientlist").param("sgid", sgid))?;
        if !response.is_success() {
            return Ok(Outcome::failed(response.status));
        }
        self.resolve_members(response.status, &response.records)
    }

    /// Poke every connected member of a server group
    pub fn server_group_poke(&mut self, sgid: i64, message: &str) -> Result<Status> {
        let members = self.server_group_members(sgid)?;
        if !members.is_success() {
            return Ok(members.status);
        }
        Ok(self.poke_sessions(&members.data, message))
    }

    // -------------------------------------------------------------------------
    // Channel Groups
    // -------------------------------------------------------------------------

    pub fn channel_groups(&mut self) -> Result<Outcome<Vec<ChannelGroup>>> {
        self.list(Command::new("channelgrouplist"))
    }

    /// Put a client into a channel group for one channel
    pub fn set_channel_group(&mut self, cgid: i64, cid: i64, cldbid: i64) -> Result<Status> {
        self.run(
            Command::new("setclientchannelgroup")
                .param("cgid", cgid)
                .param("cid", cid)
                .param("cldbid", cldbid),
        )
    }

    /// Put a client back into the regular `Guest` channel group
    pub fn reset_channel_group(&mut self, cid: i64, cldbid: i64) -> Result<Status> {
        let groups = self.channel_groups()?;
        if !groups.is_success() {
            return Ok(groups.status);
        }

        let cgid = groups
            .data
            .iter()
            .find(|g| g.name == DEFAULT_CHANNEL_GROUP && g.group_type == GroupType::Regular)
            .map(|g| g.id)
            .ok_or_else(|| {
                QueryError::NotFound(format!(
                    "regular channel group named {:?}",
                    DEFAULT_CHANNEL_GROUP
                ))
            })?;

        self.set_channel_group(cgid, cid, cldbid)
    }

    /// Members of a channel group in one channel, with their active sessions
    pub fn channel_group_members(&mut self, cgid: i64, cid: i64) -> Result<Outcome<Vec<User>>> {
        let response = self.execute(
            &Command::new("channelgroupclientlist")
                .param("cid", cid)
                .param("cgid", cgid),
        )?;
        if !response.is_success() {
            return Ok(Outcome::failed(response.status));
        }
        self.resolve_members(response.status, &response.records)
    }

    /// Poke every connected member of a channel group in one channel
    pub fn channel_group_poke(&mut self, cgid: i64, cid: i64, message: &str) -> Result<Status> {
        let members = self.channel_group_members(cgid, cid)?;
        if !members.is_success() {
            return Ok(members.status);
        }
        Ok(self.poke_sessions(&members.data, message))
    }

    fn list<R: FromRecord>(&mut self, command: Command) -> Result<Outcome<Vec<R>>> {
        let response = self.execute(&command)?;
        if !response.is_success() {
            return Ok(Outcome::failed(response.status));
        }
        let items = collect_records(&response.records);
        Ok(Outcome::new(response.status, items))
    }
}
