//! ServerQuery connection
//!
//! A single TCP session to the query port.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{QueryError, Result};
use crate::protocol::{read_greeting, read_response, write_command, Command, Response};
use super::Transport;

/// A connected ServerQuery session
pub struct QueryConnection {
    /// TCP stream reader (buffered for line reads)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Second greeting line
    welcome: String,

    /// Set after a failed exchange; the next reply on the wire may belong
    /// to an earlier command
    broken: bool,
}

impl std::fmt::Debug for QueryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryConnection")
            .field("peer_addr", &self.peer_addr)
            .field("welcome", &self.welcome)
            .field("broken", &self.broken)
            .finish()
    }
}

impl QueryConnection {
    /// Dial the server and consume its greeting
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let address = config.socket_address();
        let dial_timeout = Duration::from_millis(config.dial_timeout_ms);

        let mut last_err = None;
        let mut stream = None;
        for addr in address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, dial_timeout) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => {
                    tracing::debug!("Dial {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        let stream = match (stream, last_err) {
            (Some(s), _) => s,
            (None, Some(e)) => {
                tracing::error!("Failed to establish a TCP connection to {}: {}", address, e);
                return Err(e.into());
            }
            (None, None) => {
                return Err(QueryError::Transport(format!("{} did not resolve", address)))
            }
        };

        let mut connection = Self::from_stream(stream)?;
        connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
        Ok(connection)
    }

    /// Wrap an already connected stream and read the greeting
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Commands are small; don't wait to coalesce them
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut reader = BufReader::new(read_stream);
        let welcome = read_greeting(&mut reader)?;

        tracing::info!("Connected to ServerQuery @ {}", peer_addr);

        Ok(Self {
            reader,
            writer: BufWriter::new(write_stream),
            peer_addr,
            welcome,
            broken: false,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_timeout = (read_ms > 0).then(|| Duration::from_millis(read_ms));
        let write_timeout = (write_ms > 0).then(|| Duration::from_millis(write_ms));

        self.reader.get_ref().set_read_timeout(read_timeout)?;
        self.writer.get_ref().set_write_timeout(write_timeout)?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Welcome line sent by the server on connect
    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    /// True once an exchange failed midway; every later `execute` is refused
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Send `quit` and close the socket
    pub fn disconnect(mut self) -> Result<()> {
        if let Err(e) = self.execute(&Command::new("quit")) {
            tracing::warn!("Failed to send quit to {}: {}", self.peer_addr, e);
        }

        tracing::info!("Closing connection to {}", self.peer_addr);
        match self.writer.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Server may already have closed its side after `quit`
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Transport for QueryConnection {
    fn execute(&mut self, command: &Command) -> Result<Response> {
        if self.broken {
            return Err(QueryError::Transport(
                "connection is no longer synchronized".to_string(),
            ));
        }

        if let Err(e) = write_command(&mut self.writer, command) {
            tracing::error!("Failed to send `{}` to {}: {}", command.verb(), self.peer_addr, e);
            self.broken = true;
            return Err(e);
        }

        let response = match read_response(&mut self.reader) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    "Failed to read reply to `{}` from {}: {}",
                    command.verb(),
                    self.peer_addr,
                    e
                );
                self.broken = true;
                return Err(e);
            }
        };

        tracing::debug!("Executed command: {} -> {}", command, response.status);
        Ok(response)
    }
}
