//! Purpose: Resolve server URL and API token for the `seafile` CLI.
//! Exports: `ConnectionArgs`.
//! Role: Single place where flags, environment and token files turn into a `Client`.
//! Invariants: Flag beats environment (clap `env`); `--token` beats `--token-file`.
//! Invariants: Token file contents are trimmed; an empty token is a usage error.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueHint};
use seafile::api::{Client, Error, ErrorKind, HttpTransport};

#[derive(Args, Clone, Debug, Default)]
pub(crate) struct ConnectionArgs {
    #[arg(
        long,
        global = true,
        env = "SEAFILE_SERVER",
        help = "Seafile server root URL, e.g. https://cloud.example.com",
        value_hint = ValueHint::Url
    )]
    pub(crate) server: Option<String>,
    #[arg(
        long,
        global = true,
        env = "SEAFILE_TOKEN",
        hide_env_values = true,
        help = "API token (see `seafile login`)"
    )]
    pub(crate) token: Option<String>,
    #[arg(
        long,
        global = true,
        env = "SEAFILE_TOKEN_FILE",
        help = "Read the API token from this file",
        value_hint = ValueHint::FilePath
    )]
    pub(crate) token_file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "SEAFILE_TIMEOUT_SECS",
        default_value_t = 30,
        help = "Per-request timeout in seconds"
    )]
    pub(crate) timeout_secs: u64,
}

impl ConnectionArgs {
    /// Transport without credentials; enough for `ping` and `login`.
    pub(crate) fn transport(&self) -> Result<HttpTransport, Error> {
        let Some(server) = self.server.as_deref() else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("no server configured")
                .with_hint("Pass --server or set SEAFILE_SERVER."));
        };
        Ok(HttpTransport::new(server)?.with_timeout(Duration::from_secs(self.timeout_secs)))
    }

    pub(crate) fn client(&self) -> Result<Client, Error> {
        let token = self.resolve_token()?;
        Ok(Client::new(self.transport()?.with_token(token)))
    }

    fn resolve_token(&self) -> Result<String, Error> {
        if let Some(token) = &self.token {
            return non_empty_token(token.trim().to_string());
        }
        if let Some(path) = &self.token_file {
            let contents = std::fs::read_to_string(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read token file")
                    .with_path(path.display().to_string())
                    .with_source(err)
            })?;
            return non_empty_token(contents.trim().to_string());
        }
        Err(Error::new(ErrorKind::Usage)
            .with_message("no API token configured")
            .with_hint("Pass --token or --token-file, or run `seafile login` to obtain one."))
    }
}

fn non_empty_token(token: String) -> Result<String, Error> {
    if token.is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("API token is empty"));
    }
    Ok(token)
}
