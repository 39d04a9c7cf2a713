//! Network Module
//!
//! Transports that carry commands to a server.
//!
//! ## Architecture
//! - `Transport` trait: one command in, one parsed reply out
//! - `QueryConnection`: raw ServerQuery over TCP
//! - `HttpTransport`: WebQuery over HTTP
//! - `SharedTransport` / `KeepAlive`: serialized multi-thread use of one session

mod transport;
mod connection;
mod http;
mod shared;
mod keepalive;

pub use transport::Transport;
pub use connection::QueryConnection;
pub use http::{decode_envelope, query_string, HttpTransport};
pub use shared::SharedTransport;
pub use keepalive::KeepAlive;
