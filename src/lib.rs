//! # ts3query
//!
//! A client library for the TeamSpeak 3 ServerQuery protocol:
//! - Escaping codec for the ServerQuery wire format
//! - Record tokenizer and name-indexed field parser
//! - Status model with client-synthesized batch summaries
//! - TCP (ServerQuery) and HTTP (WebQuery) transports behind one trait
//! - Group, user, privilege key and server operations
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Client<T>                            │
//! │        (groups, users, tokens, server control)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command ▼      ▲ Response
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Transport trait                           │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │ QueryConnection │                │  HttpTransport  │
//!   │  (TCP, escape)  │                │ (JSON, form-enc)│
//!   └────────┬────────┘                └────────┬────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────────────────────────────────────────┐
//!   │       protocol: escape · record · response          │
//!   └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ts3query::{Client, Config};
//!
//! # fn main() -> ts3query::Result<()> {
//! let config = Config::builder()
//!     .address("ts.example.com")
//!     .credentials("serveradmin", "secret")
//!     .build();
//!
//! let mut client = Client::connect(&config)?;
//! let groups = client.server_groups()?;
//! for group in &groups.data {
//!     println!("{} {}", group.id, group.name);
//! }
//! client.disconnect()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{QueryError, Result};
pub use config::{Config, HttpConfig};
pub use client::Client;
pub use protocol::{Command, Outcome, Record, Response, Status};
pub use network::{HttpTransport, QueryConnection, Transport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ts3query
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
