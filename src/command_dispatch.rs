//! Purpose: Hold top-level CLI command dispatch for `seafile`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command performs the library-level calls it names and nothing else.
//! Invariants: A missing `-l` resolves the default library through `get_library("")`.

use super::*;
use crate::resource_json::{commit_json, entry_json, library_json};
use seafile::api::{Client, Library, ListOptions};

pub(super) fn dispatch_command(
    command: Command,
    connection: &ConnectionArgs,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Ping { auth } => {
            if auth {
                connection.client()?.auth_ping()?;
            } else {
                Client::new(connection.transport()?).ping()?;
            }
            emit_json(json!({ "ok": true, "auth": auth }));
            Ok(RunOutcome::ok())
        }
        Command::Login { username, password } => {
            let token = connection.transport()?.obtain_token(&username, &password)?;
            emit_json(json!({ "token": token }));
            Ok(RunOutcome::ok())
        }
        Command::Libraries { kind } => {
            let client = connection.client()?;
            let libraries = client.list_libraries(kind.map(LibraryType::from))?;
            let values = libraries.iter().map(library_json).collect::<Vec<_>>();
            emit_json(json!({ "libraries": values }));
            Ok(RunOutcome::ok())
        }
        Command::Library { name } => {
            let library = resolve_library(connection, name.as_deref())?;
            emit_json(json!({ "library": library_json(&library) }));
            Ok(RunOutcome::ok())
        }
        Command::DefaultLibrary => {
            let id = connection.client()?.default_library_id()?;
            emit_json(json!({ "repo_id": id }));
            Ok(RunOutcome::ok())
        }
        Command::Ls {
            library,
            path,
            files,
            dirs,
            recursive,
        } => {
            let library = resolve_library(connection, library.as_deref())?;
            let path = path.unwrap_or_else(|| "/".to_string());
            let options = if recursive {
                ListOptions::dirs_recursive()
            } else if dirs {
                ListOptions::dirs()
            } else if files {
                ListOptions::files()
            } else {
                ListOptions::all()
            };
            let entries = library.list_entries(&path, options)?;
            let values = entries.iter().map(entry_json).collect::<Vec<_>>();
            emit_json(json!({
                "library": library.id,
                "path": path,
                "entries": values,
            }));
            Ok(RunOutcome::ok())
        }
        Command::Mkdir { library, path } => {
            let library = resolve_library(connection, library.as_deref())?;
            library.create_directory(&path)?;
            emit_json(json!({ "library": library.id, "created": path }));
            Ok(RunOutcome::ok())
        }
        Command::History { library } => {
            let library = resolve_library(connection, library.as_deref())?;
            let commits = library.history()?;
            let values = commits.iter().map(commit_json).collect::<Vec<_>>();
            emit_json(json!({ "library": library.id, "commits": values }));
            Ok(RunOutcome::ok())
        }
        Command::UploadLink { library } => {
            let library = resolve_library(connection, library.as_deref())?;
            let link = library.upload_link()?;
            emit_json(json!({ "library": library.id, "upload_link": link }));
            Ok(RunOutcome::ok())
        }
    }
}

fn resolve_library(connection: &ConnectionArgs, name: Option<&str>) -> Result<Library, Error> {
    connection.client()?.get_library(name.unwrap_or(""))
}
