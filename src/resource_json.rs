//! Purpose: JSON serializers for libraries, directory entries and commits on CLI stdout.
//! Exports: `library_json`, `entry_json`, `commit_json`.
//! Role: Keep output key names identical to the server's wire names.
//! Role: A commit's owning library is reported under `library`, apart from its wire `repo_id`.
//! Invariants: Stable key names; optional commit fields are emitted as null when absent.

use seafile::api::{DirectoryEntry, Library, LibraryCommit};
use serde_json::{Value, json};

pub(crate) fn library_json(library: &Library) -> Value {
    json!({
        "id": library.id,
        "name": library.name,
        "type": library.library_type,
        "owner": library.owner,
        "permission": library.permission,
        "encrypted": library.encrypted,
        "virtual": library.is_virtual,
        "size": library.size,
        "size_formatted": library.size_formatted,
        "mtime": library.mtime,
        "mtime_relative": library.mtime_relative,
        "version": library.version,
        "root": library.root,
        "head_commit_id": library.head_commit_id,
    })
}

pub(crate) fn entry_json(entry: &DirectoryEntry) -> Value {
    json!({
        "id": entry.id,
        "type": entry.kind.as_str(),
        "name": entry.name,
        "size": entry.size,
        "permission": entry.permission,
        "mtime": entry.mtime,
        "parent_dir": entry.parent_dir,
    })
}

pub(crate) fn commit_json(commit: &LibraryCommit) -> Value {
    json!({
        "id": commit.id,
        "desc": commit.desc,
        "ctime": commit.ctime,
        "creator": commit.creator,
        "creator_name": commit.creator_name,
        "conflict": commit.conflict,
        "new_merge": commit.new_merge,
        "root_id": commit.root_id,
        "parent_id": commit.parent_id,
        "second_parent_id": commit.second_parent_id,
        "rev_file_size": commit.rev_file_size,
        "rev_file_id": commit.rev_file_id,
        "rev_renamed_old_path": commit.rev_renamed_old_path,
        "repo_id": commit.repo_id,
        "library": commit.library_id(),
    })
}
