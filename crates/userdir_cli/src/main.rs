//! Command-line host for the user directory.
//!
//! # Responsibility
//! - Bootstrap config, logging and the SQLite store.
//! - Map one subcommand to one directory use-case and print its JSON reply.
//!
//! # Exit codes
//! - `0` success, `1` fatal startup failure, `2` request failure.

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use ortho_config::OrthoConfig;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use userdir_core::api::{self, ApiReply, ErrorResponse};
use userdir_core::db::open_db_with_timeout;
use userdir_core::{
    init_logging, CreateUserRequest, DirectoryConfig, SqliteUserRepository, UpdateUserRequest,
    UserService,
};

/// User directory CLI
#[derive(Parser, Debug)]
#[command(name = "userdir")]
#[command(version = userdir_core::core_version())]
#[command(about = "Create, read, update and delete directory users", long_about = None)]
struct Cli {
    /// SQLite database file (overrides USERDIR_DB_PATH)
    #[arg(long = "db")]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides USERDIR_LOG_LEVEL)
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (overrides USERDIR_LOG_DIR)
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,

    /// Wait on a locked database, in ms (overrides USERDIR_BUSY_TIMEOUT_MS)
    #[arg(long = "busy-timeout-ms")]
    busy_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a user
    Create(CreateArgs),
    /// Show one user
    Get {
        /// User id
        id: String,
    },
    /// List all users
    List,
    /// Change selected fields of a user
    Update {
        /// User id
        id: String,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete a user
    Delete {
        /// User id
        id: String,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Raw JSON request body instead of field flags
    #[arg(long, conflicts_with_all = ["name", "surname", "email", "phone_number"])]
    json: Option<String>,
    #[arg(long, required_unless_present = "json")]
    name: Option<String>,
    #[arg(long, required_unless_present = "json")]
    surname: Option<String>,
    #[arg(long, required_unless_present = "json")]
    email: Option<String>,
    #[arg(long = "phone-number", required_unless_present = "json")]
    phone_number: Option<String>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Raw JSON request body instead of field flags
    #[arg(long, conflicts_with_all = ["name", "surname", "email", "phone_number"])]
    json: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    surname: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long = "phone-number")]
    phone_number: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(message) => return fatal(&message),
    };

    if let Some(log_dir) = config.log_dir() {
        if let Err(err) = init_logging(config.log_level(), log_dir) {
            return fatal(&err.to_string());
        }
    }

    let conn = match open_db_with_timeout(config.db_path(), config.busy_timeout()) {
        Ok(conn) => conn,
        Err(err) => return fatal(&format!("failed to open database: {err}")),
    };
    info!("event=cli_start module=cli status=ok");

    let service = UserService::new(SqliteUserRepository::new(&conn));
    let reply = dispatch(&service, cli.command);

    match serde_json::to_string_pretty(&reply.body) {
        Ok(text) => println!("{text}"),
        Err(err) => return fatal(&format!("failed to render reply: {err}")),
    }

    if reply.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn resolve_config(cli: &Cli) -> Result<DirectoryConfig, String> {
    DirectoryConfig::load_from_iter(config_args(cli))
        .map_err(|err| format!("invalid configuration: {err}"))
}

/// Re-spells the global flags for the config loader, which owns precedence.
fn config_args(cli: &Cli) -> Vec<OsString> {
    let flags = [
        ("--db-path", cli.db.clone().map(OsString::from)),
        ("--log-level", cli.log_level.clone().map(OsString::from)),
        ("--log-dir", cli.log_dir.clone().map(OsString::from)),
        (
            "--busy-timeout-ms",
            cli.busy_timeout_ms.map(|ms| OsString::from(ms.to_string())),
        ),
    ];

    let mut args = vec![OsString::from("userdir")];
    for (flag, value) in flags {
        if let Some(value) = value {
            args.push(OsString::from(flag));
            args.push(value);
        }
    }
    args
}

fn dispatch(service: &UserService<SqliteUserRepository<'_>>, command: Command) -> ApiReply {
    match command {
        Command::Create(args) => match create_request(args) {
            Ok(request) => api::create_user(service, &request),
            Err(err) => err.into(),
        },
        Command::Get { id } => match api::parse_user_id(&id) {
            Ok(id) => api::find_user(service, id),
            Err(err) => err.into(),
        },
        Command::List => api::list_users(service),
        Command::Update { id, fields } => {
            let parsed = api::parse_user_id(&id)
                .and_then(|id| update_request(fields).map(|request| (id, request)));
            match parsed {
                Ok((id, request)) => api::update_user(service, id, &request),
                Err(err) => err.into(),
            }
        }
        Command::Delete { id } => match api::parse_user_id(&id) {
            Ok(id) => api::delete_user(service, id),
            Err(err) => err.into(),
        },
    }
}

fn create_request(args: CreateArgs) -> Result<CreateUserRequest, ErrorResponse> {
    if let Some(body) = args.json {
        return api::parse_body(&body);
    }
    Ok(CreateUserRequest {
        name: args.name.unwrap_or_default(),
        surname: args.surname.unwrap_or_default(),
        email: args.email.unwrap_or_default(),
        phone_number: args.phone_number.unwrap_or_default(),
    })
}

fn update_request(fields: UpdateArgs) -> Result<UpdateUserRequest, ErrorResponse> {
    if let Some(body) = fields.json {
        return api::parse_body(&body);
    }
    Ok(UpdateUserRequest {
        name: fields.name,
        surname: fields.surname,
        email: fields.email,
        phone_number: fields.phone_number,
    })
}

fn fatal(message: &str) -> ExitCode {
    error!("event=cli_start module=cli status=error error={message}");
    eprintln!("userdir: {message}");
    ExitCode::from(1)
}
