//! Purpose: List and create directories inside a library.
//! Exports: `DirectoryEntry`, `EntryKind`, `EntryTypeFilter`, `ListOptions`.
//! Role: Composes `p`/`t`/`recursive` query parameters over one listing primitive.
//! Invariants: Empty path means `/`; query keys are emitted in sorted order.
//! Invariants: `recursive` is only sent together with the directory filter.
//! Invariants: Listings decode as a bare array, in server order.
#![allow(clippy::result_large_err)]

use super::client::Client;
use super::decode::{ApiResult, decode_array, expect_status};
use crate::core::dispatch::Request;
use crate::core::error::{Error, ErrorKind};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Any `type` value other than `file` or `dir`.
    #[serde(other)]
    Other,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "dir",
            EntryKind::Other => "other",
        }
    }
}

/// One file or subdirectory. Carries no reference to its library; keep the id yourself.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct DirectoryEntry {
    /// Content hash, or a zero placeholder for some directories.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub permission: String,
    #[serde(default)]
    pub mtime: i64,
    /// Only present on recursive listings, where it holds the full ancestry.
    #[serde(default)]
    pub parent_dir: String,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EntryTypeFilter {
    #[default]
    None,
    File,
    Dir,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ListOptions {
    pub filter: EntryTypeFilter,
    /// Whole subtree of directories instead of one level. Requires `EntryTypeFilter::Dir`.
    pub recursive: bool,
}

impl ListOptions {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn files() -> Self {
        Self {
            filter: EntryTypeFilter::File,
            recursive: false,
        }
    }

    pub fn dirs() -> Self {
        Self {
            filter: EntryTypeFilter::Dir,
            recursive: false,
        }
    }

    pub fn dirs_recursive() -> Self {
        Self {
            filter: EntryTypeFilter::Dir,
            recursive: true,
        }
    }
}

impl Client {
    pub fn list_entries(
        &self,
        library_id: &str,
        path: &str,
        options: ListOptions,
    ) -> ApiResult<Vec<DirectoryEntry>> {
        let query = listing_query(path, options)?;
        let uri = dir_uri(library_id, &query);
        let response = self.send(Request::get(uri.clone()))?;
        decode_array(response, &uri)
    }

    pub fn list_all_entries(&self, library_id: &str, path: &str) -> ApiResult<Vec<DirectoryEntry>> {
        self.list_entries(library_id, path, ListOptions::all())
    }

    pub fn list_file_entries(
        &self,
        library_id: &str,
        path: &str,
    ) -> ApiResult<Vec<DirectoryEntry>> {
        self.list_entries(library_id, path, ListOptions::files())
    }

    pub fn list_dir_entries(&self, library_id: &str, path: &str) -> ApiResult<Vec<DirectoryEntry>> {
        self.list_entries(library_id, path, ListOptions::dirs())
    }

    pub fn list_dirs_recursive(
        &self,
        library_id: &str,
        path: &str,
    ) -> ApiResult<Vec<DirectoryEntry>> {
        self.list_entries(library_id, path, ListOptions::dirs_recursive())
    }

    /// Creates `path` in the library. Succeeds only on `201 Created`.
    ///
    /// When `path` already exists the server creates a renamed sibling instead of
    /// failing, and the response does not say so.
    pub fn create_directory(&self, library_id: &str, path: &str) -> ApiResult<()> {
        if path.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("directory path must not be empty")
                .with_hint("Pass an absolute path such as /photos/2024."));
        }
        let query = encode_query(&[("p", path)]);
        let uri = dir_uri(library_id, &query);
        let request = Request::post(uri.clone()).with_form(&[("operation", "mkdir")]);
        let response = self.send(request)?;
        expect_status(response, 201, &uri).map(|_| ())
    }
}

fn dir_uri(library_id: &str, query: &str) -> String {
    format!("/repos/{library_id}/dir/?{query}")
}

fn listing_query(path: &str, options: ListOptions) -> ApiResult<String> {
    if options.recursive && options.filter != EntryTypeFilter::Dir {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("recursive listing requires the directory filter")
            .with_hint("Use ListOptions::dirs_recursive()."));
    }
    let path = if path.is_empty() { "/" } else { path };
    let mut pairs = vec![("p", path)];
    if options.recursive {
        pairs.push(("recursive", "1"));
    }
    match options.filter {
        EntryTypeFilter::None => {}
        EntryTypeFilter::File => pairs.push(("t", "f")),
        EntryTypeFilter::Dir => pairs.push(("t", "d")),
    }
    Ok(encode_query(&pairs))
}

pub(crate) fn encode_query(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
