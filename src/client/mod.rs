//! Client Module
//!
//! Domain operations built on the protocol core. Every operation is a
//! [`Command`] plus the interpretation of its [`Response`]; the transport is
//! a type parameter so the same code serves ServerQuery and WebQuery.
//!
//! ## Return Conventions
//! - `Result<Status>`: commands without data
//! - `Result<Outcome<T>>`: data plus the status it arrived with
//! - `Err(_)`: the exchange never completed (transport fault) or a single
//!   entity could not be parsed
//!
//! A non-ok status is never an `Err`; listing operations return empty data
//! alongside it.

mod server;
mod groups;
mod users;
mod tokens;

use std::time::Duration;

pub use server::{ServerStatus, ServerVersion, VirtualServer};
pub use groups::{ChannelGroup, GroupType, ServerGroup, DEFAULT_CHANNEL_GROUP};
pub use users::User;
pub use tokens::{PrivilegeKey, TokenTarget};

use crate::config::{Config, HttpConfig};
use crate::error::{QueryError, Result};
use crate::network::{HttpTransport, KeepAlive, QueryConnection, SharedTransport, Transport};
use crate::protocol::{Command, Response, Status};

/// High-level client over any transport
pub struct Client<T: Transport> {
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Execute a raw command, logging non-ok replies
    pub fn execute(&mut self, command: &Command) -> Result<Response> {
        let response = self.transport.execute(command)?;
        if !response.is_success() {
            tracing::warn!("`{}` failed: {}", command.verb(), response.status);
        }
        Ok(response)
    }

    /// Execute a command whose reply carries no data
    pub(crate) fn run(&mut self, command: Command) -> Result<Status> {
        Ok(self.execute(&command)?.status)
    }

    /// Authenticate the query session
    pub fn login(&mut self, username: &str, password: &str) -> Result<Status> {
        self.run(
            Command::global("login")
                .param("client_login_name", username)
                .param("client_login_password", password),
        )
    }

    /// Drop the authenticated identity without closing the connection
    pub fn logout(&mut self) -> Result<Status> {
        self.run(Command::global("logout"))
    }

    /// Select the virtual server subsequent commands apply to
    pub fn use_server(&mut self, sid: u64) -> Result<Status> {
        let status = self.transport.select_virtual_server(sid)?;
        if status.is_success() {
            tracing::info!("Virtual server {} selected", sid);
        } else {
            tracing::warn!("Failed to select virtual server {}: {}", sid, status);
        }
        Ok(status)
    }

    /// Move to a shared, lockable transport
    pub fn into_shared(self) -> Client<SharedTransport<T>> {
        Client::new(SharedTransport::new(self.transport))
    }
}

impl Client<QueryConnection> {
    /// Connect, log in (when credentials are configured) and select the
    /// configured virtual server
    pub fn connect(config: &Config) -> Result<Self> {
        let mut client = Self::new(QueryConnection::connect(config)?);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            let status = client.login(username, password)?;
            if !status.is_success() {
                return Err(QueryError::Rejected {
                    command: "login".to_string(),
                    status,
                });
            }
        }

        let status = client.use_server(config.virtual_server)?;
        if !status.is_success() {
            return Err(QueryError::Rejected {
                command: "use".to_string(),
                status,
            });
        }

        Ok(client)
    }

    /// Send `quit` and close the connection
    pub fn disconnect(self) -> Result<()> {
        self.transport.disconnect()
    }
}

impl Client<SharedTransport<QueryConnection>> {
    /// Like [`Client::connect`], but shareable across threads
    ///
    /// A keep-alive thread is started when `keepalive_interval_ms` is
    /// non-zero. Stop it before [`disconnect`](Self::disconnect).
    pub fn connect_shared(config: &Config) -> Result<(Self, Option<KeepAlive>)> {
        let client = Client::<QueryConnection>::connect(config)?.into_shared();
        let keepalive = (config.keepalive_interval_ms > 0)
            .then(|| client.keep_alive(Duration::from_millis(config.keepalive_interval_ms)));
        Ok((client, keepalive))
    }

    /// Send `quit` and close the connection
    ///
    /// Fails while another handle (e.g. a running keep-alive) still holds it.
    pub fn disconnect(self) -> Result<()> {
        match self.transport.try_into_inner() {
            Ok(connection) => connection.disconnect(),
            Err(_) => Err(QueryError::Transport(
                "connection is still shared".to_string(),
            )),
        }
    }
}

impl Client<HttpTransport> {
    /// Client over the WebQuery HTTP interface
    pub fn http(config: HttpConfig) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport + Send + 'static> Client<SharedTransport<T>> {
    /// Keep the session alive from a background thread
    pub fn keep_alive(&self, interval: Duration) -> KeepAlive {
        KeepAlive::spawn(self.transport.clone(), interval)
    }
}
