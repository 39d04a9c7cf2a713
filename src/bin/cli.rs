//! ts3query CLI Client
//!
//! Command-line interface for administering a TeamSpeak 3 server over
//! ServerQuery (TCP) or WebQuery (HTTP).

use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use ts3query::client::{TokenTarget, User};
use ts3query::{Client, Config, HttpConfig, Result, Status, Transport};

/// ts3query CLI
#[derive(Parser, Debug)]
#[command(name = "ts3query-cli")]
#[command(about = "CLI for the TeamSpeak 3 ServerQuery interface")]
#[command(version)]
struct Args {
    /// Transport to use
    #[arg(short, long, value_enum, default_value = "query")]
    transport: TransportKind,

    /// ServerQuery address (host or host:port)
    #[arg(short, long, default_value = "127.0.0.1:10011")]
    server: String,

    /// ServerQuery login name
    #[arg(short, long, env = "TS3_USER")]
    user: Option<String>,

    /// ServerQuery login password
    #[arg(short, long, env = "TS3_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// WebQuery base URL (host:port, no scheme)
    #[arg(long, default_value = "127.0.0.1:10080")]
    http_url: String,

    /// WebQuery API key
    #[arg(long, env = "TS3_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Use https for WebQuery
    #[arg(long)]
    https: bool,

    /// Virtual server id
    #[arg(long, default_value = "1")]
    sid: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    /// Raw ServerQuery over TCP
    Query,
    /// WebQuery over HTTP
    Http,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List virtual servers
    Servers,

    /// List server groups
    Groups,

    /// List channel groups
    ChannelGroups,

    /// List members of a server group
    Members {
        /// Server group id
        sgid: i64,
    },

    /// List members of a channel group in a channel
    ChannelMembers {
        /// Channel group id
        cgid: i64,
        /// Channel id
        cid: i64,
    },

    /// Poke every connected member of a server group
    PokeGroup {
        /// Server group id
        sgid: i64,
        /// Poke message
        message: String,
    },

    /// Poke every connected member of a channel group in a channel
    PokeChannelGroup {
        /// Channel group id
        cgid: i64,
        /// Channel id
        cid: i64,
        /// Poke message
        message: String,
    },

    /// Send a global text message
    Message {
        /// Message text
        message: String,
    },

    /// List privilege keys
    Tokens,

    /// Create a server group privilege key
    TokenAdd {
        /// Server group id
        sgid: i64,

        /// Key description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Custom field as ident=value (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Delete a privilege key
    TokenDelete {
        /// The key to delete
        token: String,
    },

    /// Look up a client by database id
    FindUser {
        /// Client database id
        cldbid: i64,
    },

    /// Look up a client by custom field
    Search {
        /// Custom field name
        ident: String,
        /// Value pattern
        value: String,
    },
}

fn parse_field(arg: &str) -> std::result::Result<(String, String), String> {
    arg.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected ident=value, got {:?}", arg))
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ts3query=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let result = match args.transport {
        TransportKind::Query => {
            let mut builder = Config::builder().address(&args.server).virtual_server(args.sid);
            if let (Some(user), Some(password)) = (&args.user, &args.password) {
                builder = builder.credentials(user, password);
            }

            Client::connect(&builder.build()).and_then(|mut client| {
                let status = execute(&mut client, &args.command);
                if let Err(e) = client.disconnect() {
                    tracing::warn!("Disconnect failed: {}", e);
                }
                status
            })
        }
        TransportKind::Http => {
            let config = HttpConfig::builder()
                .api_key(args.api_key.clone().unwrap_or_default())
                .base_url(&args.http_url)
                .use_https(args.https)
                .virtual_server(args.sid)
                .build();

            Client::http(config).and_then(|mut client| execute(&mut client, &args.command))
        }
    };

    match result {
        Ok(status) if status.is_success() => ExitCode::SUCCESS,
        Ok(status) => {
            eprintln!("error: {}", status);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one subcommand and print its data; returns the final status
fn execute<T: Transport>(client: &mut Client<T>, command: &Commands) -> Result<Status> {
    match command {
        Commands::Servers => {
            let servers = client.server_list()?;
            for s in &servers.data {
                println!(
                    "{:>4}  {:>5}  {:<8}  {:>3}/{:<3}  {}",
                    s.id,
                    s.port,
                    format!("{:?}", s.status).to_lowercase(),
                    s.clients_online.map_or("-".to_string(), |c| c.to_string()),
                    s.max_clients.map_or("-".to_string(), |c| c.to_string()),
                    s.name
                );
            }
            Ok(servers.status)
        }
        Commands::Groups => {
            let groups = client.server_groups()?;
            for g in &groups.data {
                println!("{:>4}  {:<9}  {}", g.id, format!("{:?}", g.group_type), g.name);
            }
            Ok(groups.status)
        }
        Commands::ChannelGroups => {
            let groups = client.channel_groups()?;
            for g in &groups.data {
                println!("{:>4}  {:<9}  {}", g.id, format!("{:?}", g.group_type), g.name);
            }
            Ok(groups.status)
        }
        Commands::Members { sgid } => {
            let members = client.server_group_members(*sgid)?;
            print_users(&members.data);
            Ok(members.status)
        }
        Commands::ChannelMembers { cgid, cid } => {
            let members = client.channel_group_members(*cgid, *cid)?;
            print_users(&members.data);
            Ok(members.status)
        }
        Commands::PokeGroup { sgid, message } => {
            let status = client.server_group_poke(*sgid, message)?;
            println!("{}", status.message);
            Ok(status)
        }
        Commands::PokeChannelGroup { cgid, cid, message } => {
            let status = client.channel_group_poke(*cgid, *cid, message)?;
            println!("{}", status.message);
            Ok(status)
        }
        Commands::Message { message } => client.global_message(message),
        Commands::Tokens => {
            let keys = client.tokens_list()?;
            for key in &keys.data {
                let target = match key.target {
                    TokenTarget::ServerGroup { group_id } => format!("sgid={}", group_id),
                    TokenTarget::ChannelGroup {
                        group_id,
                        channel_id,
                    } => format!("cgid={} cid={}", group_id, channel_id),
                };
                println!("{}  {}  {}  {:?}", key.token, target, key.description, key.custom_fields);
            }
            Ok(keys.status)
        }
        Commands::TokenAdd {
            sgid,
            description,
            fields,
        } => {
            let fields: BTreeMap<String, String> = fields.iter().cloned().collect();
            let key = client.tokens_add(TokenTarget::ServerGroup { group_id: *sgid }, description, &fields)?;
            if let Some(key) = &key.data {
                println!("{}", key.token);
            }
            Ok(key.status)
        }
        Commands::TokenDelete { token } => client.tokens_delete(token),
        Commands::FindUser { cldbid } => {
            let user = client.user_find_by_db_id(*cldbid)?;
            print_users(user.data.as_slice());
            Ok(user.status)
        }
        Commands::Search { ident, value } => {
            let user = client.user_find_by_custom_search(ident, value)?;
            print_users(user.data.as_slice());
            Ok(user.status)
        }
    }
}

fn print_users(users: &[User]) {
    for u in users {
        println!(
            "{:>6}  {}  {:<24}  sessions={:?}",
            u.cldbid, u.uid, u.nickname, u.active_session_ids
        );
    }
}
