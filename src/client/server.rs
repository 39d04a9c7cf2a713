//! Virtual server control

use crate::error::Result;
use crate::network::Transport;
use crate::protocol::{collect_records, Command, FromRecord, Outcome, Record, Status};
use super::Client;

/// Run state of a virtual server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Online,
    Offline,
    /// e.g. `none`, `virtual online`, `other_instance`
    Other(String),
}

impl From<&str> for ServerStatus {
    fn from(value: &str) -> Self {
        match value {
            "online" => ServerStatus::Online,
            "offline" => ServerStatus::Offline,
            other => ServerStatus::Other(other.to_string()),
        }
    }
}

/// One entry of `serverlist`
///
/// Offline servers do not report the online-only counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualServer {
    pub id: i64,
    pub port: i64,
    pub status: ServerStatus,
    pub clients_online: Option<i64>,
    pub query_clients_online: Option<i64>,
    pub max_clients: Option<i64>,
    /// Seconds
    pub uptime: Option<i64>,
    pub name: String,
    pub autostart: bool,
}

impl FromRecord for VirtualServer {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.int("virtualserver_id")?,
            port: record.int("virtualserver_port")?,
            status: ServerStatus::from(record.string("virtualserver_status")?.as_str()),
            clients_online: record.opt_int("virtualserver_clientsonline")?,
            query_clients_online: record.opt_int("virtualserver_queryclientsonline")?,
            max_clients: record.opt_int("virtualserver_maxclients")?,
            uptime: record.opt_int("virtualserver_uptime")?,
            name: record.string("virtualserver_name")?,
            autostart: record.flag("virtualserver_autostart")?,
        })
    }
}

/// Reply to `version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVersion {
    pub version: String,
    pub build: i64,
    pub platform: String,
}

impl FromRecord for ServerVersion {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            version: record.string("version")?,
            build: record.int("build")?,
            platform: record.string("platform")?,
        })
    }
}

impl<T: Transport> Client<T> {
    /// Server software version
    pub fn version(&mut self) -> Result<Outcome<Option<ServerVersion>>> {
        let response = self.execute(&Command::global("version"))?;
        let version = match response.first() {
            Some(record) if response.is_success() => Some(ServerVersion::from_record(record)?),
            _ => None,
        };
        Ok(Outcome::new(response.status, version))
    }

    /// Send a text message to every client on every virtual server
    pub fn global_message(&mut self, message: &str) -> Result<Status> {
        self.run(Command::global("gm").param("msg", message))
    }

    pub fn server_start(&mut self, sid: u64) -> Result<Status> {
        self.run(Command::global("serverstart").param("sid", sid))
    }

    pub fn server_stop(&mut self, sid: u64) -> Result<Status> {
        self.run(Command::global("serverstop").param("sid", sid))
    }

    /// All virtual servers of the instance
    pub fn server_list(&mut self) -> Result<Outcome<Vec<VirtualServer>>> {
        let response = self.execute(&Command::global("serverlist"))?;
        if !response.is_success() {
            return Ok(Outcome::failed(response.status));
        }
        let servers = collect_records(&response.records);
        Ok(Outcome::new(response.status, servers))
    }
}
