//! WebQuery (HTTP) transport
//!
//! Tunnels the same commands over HTTP GET:
//!
//! ```text
//! GET http://<base>/<sid>/<verb>?<key>=<form-encoded value>&...
//! x-api-key: <key>
//!
//! {"status": {"code": 0, "message": "ok"}, "body": [{...}, {...}]}
//! ```
//!
//! Global commands drop the `<sid>/` segment. Values use URL form encoding,
//! never the ServerQuery escape table.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::config::HttpConfig;
use crate::error::{QueryError, Result};
use crate::protocol::{form_encode, Command, Record, Response, Scope, Status};
use super::Transport;

/// WebQuery reply envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    status: Status,
    #[serde(default)]
    body: Option<Value>,
}

/// HTTP transport for WebQuery
pub struct HttpTransport {
    config: HttpConfig,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.config.base_url)
            .field("use_https", &self.config.use_https)
            .field("virtual_server", &self.config.virtual_server)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        tracing::info!("HTTP config set for {}://{}", config.scheme(), config.base_url);
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Full request URL for a command
    pub fn url_for(&self, command: &Command) -> String {
        let mut url = format!("{}://{}/", self.config.scheme(), self.config.base_url);
        if command.scope() == Scope::VirtualServer {
            url.push_str(&self.config.virtual_server.to_string());
            url.push('/');
        }
        url.push_str(command.verb());

        let query = query_string(command);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

impl Transport for HttpTransport {
    fn execute(&mut self, command: &Command) -> Result<Response> {
        let url = self.url_for(command);

        let reply = self
            .client
            .get(&url)
            .header("x-api-key", &self.config.api_key)
            .send()
            .and_then(|r| r.text());

        let body = match reply {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error executing HTTP request `{}`: {}", command.verb(), e);
                return Err(e.into());
            }
        };

        let response = decode_envelope(&body)?;
        tracing::debug!("Executed command: {} -> {}", command, response.status);
        Ok(response)
    }

    /// WebQuery addresses the virtual server in the URL; nothing is sent
    fn select_virtual_server(&mut self, sid: u64) -> Result<Status> {
        self.config.virtual_server = sid;
        tracing::info!("Virtual server {} selected", sid);
        Ok(Status::ok())
    }
}

/// `k1=v1&k2=v2` in parameter order, form-encoded
pub fn query_string(command: &Command) -> String {
    command
        .params()
        .iter()
        .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode a WebQuery JSON envelope into a response
///
/// `body` may be an array of objects, a single object, or absent.
pub fn decode_envelope(text: &str) -> Result<Response> {
    let envelope: Envelope = serde_json::from_str(text)?;

    let records = match envelope.body {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => Ok(Record::from_json(map)),
                other => Err(QueryError::Transport(format!(
                    "expected JSON object in body, got {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Object(map)) => vec![Record::from_json(&map)],
        Some(other) => {
            return Err(QueryError::Transport(format!(
                "unexpected WebQuery body: {}",
                other
            )))
        }
    };

    Ok(Response::new(records, envelope.status))
}
