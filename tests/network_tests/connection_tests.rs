//! Tests for the ServerQuery TCP connection
//!
//! A loopback listener plays the server side. These tests verify:
//! - Greeting handling on connect
//! - Login and virtual server selection during `Client::connect`
//! - Reply reading with server line endings and notify events
//! - Transport faults on truncated replies and refused connections
//! - No reuse of a connection after a failed exchange
//! - Keep-alive started from the configuration

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ts3query::protocol::Command;
use ts3query::{Client, Config, QueryConnection, QueryError, Transport};

// =============================================================================
// Helper Functions
// =============================================================================

const GREETING: &str = "TS3\n\rWelcome to the TeamSpeak 3 ServerQuery interface, type \"help\" for a list of commands and \"help <command>\" for information on a specific command.\n\r";

/// Serve one connection: send `greeting`, then answer each command line with
/// `respond(line)`. `None` closes the connection. Returns every line received.
fn spawn_server(
    greeting: &'static str,
    respond: fn(&str) -> Option<String>,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);
        let mut received = Vec::new();

        writer.write_all(greeting.as_bytes()).unwrap();

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            let line = line.trim_end().to_string();
            received.push(line.clone());

            match respond(&line) {
                Some(reply) => {
                    if writer.write_all(reply.as_bytes()).is_err() {
                        break;
                    }
                }
                None => break,
            }
            if line == "quit" {
                break;
            }
        }
        received
    });

    (address, handle)
}

fn admin_server(line: &str) -> Option<String> {
    let verb = line.split(' ').next().unwrap_or("");
    Some(match verb {
        "login" if line.contains("client_login_password=secret") => "error id=0 msg=ok\n\r".to_string(),
        "login" => "error id=520 msg=invalid\\sloginname\\sor\\spassword\n\r".to_string(),
        "use" => "error id=0 msg=ok\n\r".to_string(),
        "version" => "version=3.13.7 build=1655727713 platform=Linux\n\rerror id=0 msg=ok\n\r".to_string(),
        "servergrouplist" => concat!(
            "notifytextmessage targetmode=3 msg=hello invokerid=1\n\r",
            "sgid=6 name=Server\\sAdmin type=1|sgid=8 name=Guest type=1\n\r",
            "error id=0 msg=ok\n\r"
        )
        .to_string(),
        "quit" => "error id=0 msg=ok\n\r".to_string(),
        _ => "error id=256 msg=command\\snot\\sfound\n\r".to_string(),
    })
}

/// Answers `clientlist` only after the client's read timeout has passed
fn slow_client_list(line: &str) -> Option<String> {
    if line == "clientlist" {
        thread::sleep(Duration::from_millis(400));
        return Some("first=1\n\rerror id=0 msg=ok\n\r".to_string());
    }
    admin_server(line)
}

fn config(address: &str) -> Config {
    Config::builder()
        .address(address)
        .credentials("serveradmin", "secret")
        .virtual_server(1)
        .read_timeout_ms(2000)
        .build()
}

// =============================================================================
// Connection Tests
// =============================================================================

#[test]
fn test_connect_login_use_and_list() {
    let (address, server) = spawn_server(GREETING, admin_server);

    let mut client = Client::connect(&config(&address)).unwrap();
    assert!(client.transport().welcome().starts_with("Welcome"));

    let groups = client.server_groups().unwrap();
    assert!(groups.is_success());
    assert_eq!(groups.data.len(), 2);
    assert_eq!(groups.data[0].name, "Server Admin");

    client.disconnect().unwrap();

    let received = server.join().unwrap();
    assert_eq!(
        received,
        vec![
            "login client_login_name=serveradmin client_login_password=secret",
            "use sid=1",
            "servergrouplist",
            "quit",
        ]
    );
}

#[test]
fn test_connect_rejected_login() {
    let (address, server) = spawn_server(GREETING, admin_server);

    let config = Config::builder()
        .address(&address)
        .credentials("serveradmin", "wrong")
        .build();

    match Client::connect(&config) {
        Err(QueryError::Rejected { command, status }) => {
            assert_eq!(command, "login");
            assert_eq!(status.code, 520);
            assert_eq!(status.message, "invalid loginname or password");
        }
        other => panic!("Expected Rejected, got {:?}", other.map(|_| ())),
    }

    drop(server);
}

#[test]
fn test_protocol_failure_keeps_connection_usable() {
    let (address, server) = spawn_server(GREETING, admin_server);

    let mut connection = QueryConnection::connect(&config(&address)).unwrap();
    let response = connection.execute(&Command::new("bogus")).unwrap();
    assert!(!response.is_success());
    assert_eq!(response.status.message, "command not found");

    let response = connection.execute(&Command::new("servergrouplist")).unwrap();
    assert_eq!(response.records.len(), 2);

    connection.disconnect().unwrap();
    server.join().unwrap();
}

#[test]
fn test_truncated_reply_is_transport_fault() {
    fn truncating(_line: &str) -> Option<String> {
        None
    }
    let (address, server) = spawn_server(GREETING, truncating);

    let mut connection = QueryConnection::connect(&config(&address)).unwrap();
    let err = connection.execute(&Command::new("clientlist")).unwrap_err();
    assert!(err.is_transport_fault());

    server.join().unwrap();
}

#[test]
fn test_non_query_greeting_rejected() {
    let (address, server) = spawn_server("SSH-2.0-OpenSSH_9.6\r\n", admin_server);

    let err = QueryConnection::connect(&config(&address)).unwrap_err();
    assert!(matches!(err, QueryError::Transport(_)));

    drop(server);
}

#[test]
fn test_connection_refused() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let err = QueryConnection::connect(&config(&address)).unwrap_err();
    assert!(err.is_transport_fault());
}

#[test]
fn test_from_stream() {
    let (address, server) = spawn_server(GREETING, admin_server);

    let stream = TcpStream::connect(&address).unwrap();
    let mut connection = QueryConnection::from_stream(stream).unwrap();
    assert_eq!(connection.peer_addr(), address);
    assert!(connection.execute(&Command::new("use").param("sid", 1)).unwrap().is_success());

    connection.disconnect().unwrap();
    server.join().unwrap();
}

#[test]
fn test_connection_unusable_after_read_timeout() {
    let (address, server) = spawn_server(GREETING, slow_client_list);

    let config = Config::builder().address(&address).read_timeout_ms(100).build();
    let mut connection = QueryConnection::connect(&config).unwrap();

    let err = connection.execute(&Command::new("clientlist")).unwrap_err();
    assert!(err.is_transport_fault());
    assert!(connection.is_broken());

    // The late reply to `clientlist` is now waiting in the socket
    thread::sleep(Duration::from_millis(500));
    let err = connection.execute(&Command::new("servergrouplist")).unwrap_err();
    assert!(matches!(err, QueryError::Transport(ref m) if m.contains("no longer synchronized")));

    drop(connection);
    assert_eq!(server.join().unwrap(), vec!["clientlist"]);
}

#[test]
fn test_connection_debug_output() {
    let (address, server) = spawn_server(GREETING, admin_server);

    let connection = QueryConnection::connect(&config(&address)).unwrap();
    let shown = format!("{:?}", connection);
    assert!(shown.contains(&address));
    assert!(shown.contains("Welcome"));

    connection.disconnect().unwrap();
    server.join().unwrap();
}

// =============================================================================
// Keep-Alive Tests
// =============================================================================

#[test]
fn test_connect_shared_starts_keepalive() {
    let (address, server) = spawn_server(GREETING, admin_server);

    let config = Config::builder()
        .address(&address)
        .credentials("serveradmin", "secret")
        .keepalive_interval_ms(20)
        .build();
    let (mut client, keepalive) = Client::connect_shared(&config).unwrap();
    let keepalive = keepalive.expect("keep-alive should be running");

    thread::sleep(Duration::from_millis(150));
    assert!(keepalive.is_running());
    assert!(client.server_groups().unwrap().is_success());

    keepalive.stop();
    client.disconnect().unwrap();

    let received = server.join().unwrap();
    assert_eq!(
        received[..2].to_vec(),
        vec![
            "login client_login_name=serveradmin client_login_password=secret",
            "use sid=1"
        ]
    );
    assert!(received.iter().filter(|line| *line == "version").count() >= 2);
    assert!(received.iter().any(|line| line == "servergrouplist"));
    assert_eq!(received.last().map(String::as_str), Some("quit"));
}

#[test]
fn test_connect_shared_zero_interval_disables_keepalive() {
    let (address, server) = spawn_server(GREETING, admin_server);

    let config = Config::builder()
        .address(&address)
        .keepalive_interval_ms(0)
        .build();
    let (client, keepalive) = Client::connect_shared(&config).unwrap();
    assert!(keepalive.is_none());

    client.disconnect().unwrap();
    assert_eq!(server.join().unwrap(), vec!["use sid=1", "quit"]);
}

#[test]
fn test_shared_disconnect_refused_while_keepalive_runs() {
    let (address, server) = spawn_server(GREETING, admin_server);

    let config = Config::builder()
        .address(&address)
        .keepalive_interval_ms(60_000)
        .build();
    let (client, keepalive) = Client::connect_shared(&config).unwrap();
    assert!(keepalive.is_some());

    let err = client.disconnect().unwrap_err();
    assert!(matches!(err, QueryError::Transport(_)));

    drop(keepalive);
    server.join().unwrap();
}
