//! Purpose: List libraries, resolve the default library, and look libraries up by name.
//! Exports: `Library`, `LibraryType`.
//! Role: Entry point to per-library calls; every returned `Library` carries the client.
//! Invariants: The API has no get-by-id/name endpoint, so lookups list then scan (O(n)).
//! Invariants: An unset default library is `NotFound`, never an empty id.
//! Invariants: `Library` values are snapshots; only listing/resolution constructs them.
#![allow(clippy::result_large_err)]

use super::client::Client;
use super::decode::{ApiResult, decode_array, decode_envelope, decode_string};
use super::directory::{DirectoryEntry, ListOptions, encode_query};
use crate::core::dispatch::Request;
use crate::core::error::{Error, ErrorKind};
use serde::Deserialize;
use std::fmt;

/// Ownership class used to filter library listings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LibraryType {
    Mine,
    Shared,
    Group,
    Org,
}

impl LibraryType {
    pub fn as_str(self) -> &'static str {
        match self {
            LibraryType::Mine => "mine",
            LibraryType::Shared => "shared",
            LibraryType::Group => "group",
            LibraryType::Org => "org",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "mine" => Some(LibraryType::Mine),
            "shared" => Some(LibraryType::Shared),
            "group" => Some(LibraryType::Group),
            "org" => Some(LibraryType::Org),
            _ => None,
        }
    }
}

/// A remote repository, bound to the client that listed it.
///
/// The bound client is a capability handle for calls scoped to this library
/// (history, upload link, directories); it does not own the connection.
#[derive(Clone)]
pub struct Library {
    pub id: String,
    pub name: String,
    /// Wire `type`; the server reports the ownership class as free text.
    pub library_type: String,
    pub root: String,
    pub owner: String,
    pub permission: String,
    pub encrypted: bool,
    pub is_virtual: bool,
    pub version: i64,
    pub mtime: i64,
    pub size: i64,
    pub mtime_relative: String,
    pub head_commit_id: String,
    pub size_formatted: String,
    client: Client,
}

#[derive(Deserialize)]
struct RemoteLibrary {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    library_type: Option<String>,
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    permission: Option<String>,
    #[serde(default)]
    encrypted: bool,
    #[serde(rename = "virtual", default)]
    is_virtual: bool,
    #[serde(default)]
    version: i64,
    #[serde(default)]
    mtime: i64,
    #[serde(default)]
    size: i64,
    #[serde(default)]
    mtime_relative: Option<String>,
    #[serde(default)]
    head_commit_id: Option<String>,
    #[serde(default)]
    size_formatted: Option<String>,
}

#[derive(Deserialize)]
struct DefaultRepoEnvelope {
    exists: bool,
    #[serde(default)]
    repo_id: Option<String>,
}

impl Client {
    /// `None` lists every library visible to the caller.
    pub fn list_libraries(&self, filter: Option<LibraryType>) -> ApiResult<Vec<Library>> {
        let uri = match filter {
            Some(kind) => format!("/repos/?{}", encode_query(&[("type", kind.as_str())])),
            None => "/repos/".to_string(),
        };
        let response = self.send(Request::get(uri.clone()))?;
        let remote: Vec<RemoteLibrary> = decode_array(response, &uri)?;
        Ok(remote
            .into_iter()
            .map(|library| library_from_remote(library, self.clone()))
            .collect())
    }

    pub fn list_all_libraries(&self) -> ApiResult<Vec<Library>> {
        self.list_libraries(None)
    }

    pub fn list_owned_libraries(&self) -> ApiResult<Vec<Library>> {
        self.list_libraries(Some(LibraryType::Mine))
    }

    pub fn list_shared_libraries(&self) -> ApiResult<Vec<Library>> {
        self.list_libraries(Some(LibraryType::Shared))
    }

    pub fn list_group_libraries(&self) -> ApiResult<Vec<Library>> {
        self.list_libraries(Some(LibraryType::Group))
    }

    pub fn list_org_libraries(&self) -> ApiResult<Vec<Library>> {
        self.list_libraries(Some(LibraryType::Org))
    }

    pub fn default_library_id(&self) -> ApiResult<String> {
        let uri = "/default-repo/";
        let response = self.send(Request::get(uri))?;
        let envelope: DefaultRepoEnvelope = decode_envelope(response, uri)?;
        if !envelope.exists {
            return Err(Error::new(ErrorKind::NotFound)
                .with_message("default library does not exist")
                .with_path(uri)
                .with_hint("Set a default library in the web UI, or pass a library name."));
        }
        Ok(envelope.repo_id.unwrap_or_default())
    }

    /// Resolves a library by name, or the default library when `name` is empty.
    ///
    /// Lists every visible library and scans it linearly; the first match wins.
    pub fn get_library(&self, name: &str) -> ApiResult<Library> {
        let default_id = if name.is_empty() {
            Some(self.default_library_id()?)
        } else {
            None
        };

        let libraries = self.list_all_libraries()?;
        let found = match &default_id {
            Some(id) => libraries.into_iter().find(|library| &library.id == id),
            None => libraries.into_iter().find(|library| library.name == name),
        };

        found.ok_or_else(|| {
            let hint = match &default_id {
                Some(id) => format!("default library id {id} is not in the listing"),
                None => format!("no library named {name:?}"),
            };
            Error::new(ErrorKind::NotFound)
                .with_message("library not found")
                .with_hint(hint)
        })
    }

    pub fn get_default_library(&self) -> ApiResult<Library> {
        self.get_library("")
    }
}

impl Library {
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the one-shot upload URL, with the JSON quotes removed.
    pub fn upload_link(&self) -> ApiResult<String> {
        let uri = self.uri("/upload-link/");
        let response = self.client.send(Request::get(uri.clone()))?;
        decode_string(response, &uri)
    }

    pub fn list_entries(&self, path: &str, options: ListOptions) -> ApiResult<Vec<DirectoryEntry>> {
        self.client.list_entries(&self.id, path, options)
    }

    pub fn list_all_entries(&self, path: &str) -> ApiResult<Vec<DirectoryEntry>> {
        self.client.list_all_entries(&self.id, path)
    }

    pub fn list_file_entries(&self, path: &str) -> ApiResult<Vec<DirectoryEntry>> {
        self.client.list_file_entries(&self.id, path)
    }

    pub fn list_dir_entries(&self, path: &str) -> ApiResult<Vec<DirectoryEntry>> {
        self.client.list_dir_entries(&self.id, path)
    }

    pub fn list_dirs_recursive(&self, path: &str) -> ApiResult<Vec<DirectoryEntry>> {
        self.client.list_dirs_recursive(&self.id, path)
    }

    pub fn create_directory(&self, path: &str) -> ApiResult<()> {
        self.client.create_directory(&self.id, path)
    }

    pub(crate) fn uri(&self, suffix: &str) -> String {
        format!("/repos/{}{suffix}", self.id)
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("library_type", &self.library_type)
            .field("owner", &self.owner)
            .field("permission", &self.permission)
            .field("encrypted", &self.encrypted)
            .field("is_virtual", &self.is_virtual)
            .field("size", &self.size)
            .field("mtime", &self.mtime)
            .field("head_commit_id", &self.head_commit_id)
            .finish_non_exhaustive()
    }
}

fn library_from_remote(remote: RemoteLibrary, client: Client) -> Library {
    Library {
        id: remote.id,
        name: remote.name,
        library_type: remote.library_type.unwrap_or_default(),
        root: remote.root.unwrap_or_default(),
        owner: remote.owner.unwrap_or_default(),
        permission: remote.permission.unwrap_or_default(),
        encrypted: remote.encrypted,
        is_virtual: remote.is_virtual,
        version: remote.version,
        mtime: remote.mtime,
        size: remote.size,
        mtime_relative: remote.mtime_relative.unwrap_or_default(),
        head_commit_id: remote.head_commit_id.unwrap_or_default(),
        size_formatted: remote.size_formatted.unwrap_or_default(),
        client,
    }
}
