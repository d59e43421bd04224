//! Purpose: `seafile` CLI entry point.
//! Role: Binary crate root; parses args, runs one API operation, emits JSON on stdout.
//! Invariants: Success output is a single JSON value on stdout (pretty on a TTY).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal};

use clap::{Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod connection;
mod resource_json;

use connection::ConnectionArgs;
use seafile::api::{Error, ErrorKind, LibraryType, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `seafile --help`."));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command, &cli.connection)
}

#[derive(Parser)]
#[command(
    name = "seafile",
    version,
    about = "Browse Seafile libraries, directories and history from the command line",
    after_help = r#"EXAMPLES
  $ export SEAFILE_SERVER=https://cloud.example.com
  $ seafile login --username me@example.com --password '...'
  $ seafile libraries --type mine
  $ seafile ls -l Work /reports --files
  $ seafile history"#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LibraryTypeArg {
    Mine,
    Shared,
    Group,
    Org,
}

impl From<LibraryTypeArg> for LibraryType {
    fn from(value: LibraryTypeArg) -> Self {
        match value {
            LibraryTypeArg::Mine => LibraryType::Mine,
            LibraryTypeArg::Shared => LibraryType::Shared,
            LibraryTypeArg::Group => LibraryType::Group,
            LibraryTypeArg::Org => LibraryType::Org,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Check that the server answers (with --auth, that the token works)")]
    Ping {
        #[arg(long, help = "Also verify the API token")]
        auth: bool,
    },
    #[command(about = "Exchange account credentials for an API token")]
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SEAFILE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    #[command(about = "List libraries visible to the account")]
    Libraries {
        #[arg(long = "type", value_enum, help = "Only libraries of this ownership class")]
        kind: Option<LibraryTypeArg>,
    },
    #[command(about = "Show one library by name (default library when omitted)")]
    Library { name: Option<String> },
    #[command(about = "Print the id of the default library")]
    DefaultLibrary,
    #[command(about = "List a directory inside a library")]
    Ls {
        #[arg(short = 'l', long, help = "Library name (default library when omitted)")]
        library: Option<String>,
        #[arg(help = "Directory path (default /)")]
        path: Option<String>,
        #[arg(long, conflicts_with_all = ["dirs", "recursive"], help = "Files only")]
        files: bool,
        #[arg(long, help = "Directories only")]
        dirs: bool,
        #[arg(long, help = "All directories in the subtree (implies --dirs)")]
        recursive: bool,
    },
    #[command(about = "Create a directory inside a library")]
    Mkdir {
        #[arg(short = 'l', long, help = "Library name (default library when omitted)")]
        library: Option<String>,
        path: String,
    },
    #[command(about = "Show the most recent page of a library's commit history")]
    History {
        #[arg(short = 'l', long, help = "Library name (default library when omitted)")]
        library: Option<String>,
    },
    #[command(about = "Fetch a one-shot upload URL for a library")]
    UploadLink {
        #[arg(short = 'l', long, help = "Library name (default library when omitted)")]
        library: Option<String>,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Transport\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Transport => "request failed".to_string(),
        ErrorKind::Decode => "unexpected response".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::OperationFailed => "operation failed".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    if let Some(body) = err.body() {
        inner.insert("body".to_string(), json!(body));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(status) = err.status() {
        lines.push(format!("status: {status}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {path}"));
    }
    if let Some(body) = err.body().filter(|body| !body.trim().is_empty()) {
        lines.push(format!("body: {}", body.trim()));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
