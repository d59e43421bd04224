//! Purpose: Fetch a library's commit log.
//! Exports: `LibraryCommit`.
//! Role: Decodes the `{page_next, commits}` envelope and binds commits to their library.
//! Invariants: Commits keep server order (newest first); nothing is re-sorted.
//! Invariants: One request per call; `page_next` is observed, never followed.
#![allow(clippy::result_large_err)]

use super::decode::{ApiResult, decode_envelope};
use super::library::Library;
use crate::core::dispatch::Request;
use serde::Deserialize;
use tracing::debug;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct LibraryCommit {
    pub id: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub ctime: i64,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub creator_name: String,
    #[serde(default)]
    pub conflict: bool,
    #[serde(default)]
    pub new_merge: bool,
    #[serde(default)]
    pub root_id: Option<String>,
    #[serde(default)]
    pub repo_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Set on merge commits.
    #[serde(default)]
    pub second_parent_id: Option<String>,
    #[serde(default)]
    pub rev_file_size: Option<i64>,
    #[serde(default)]
    pub rev_file_id: Option<String>,
    #[serde(default)]
    pub rev_renamed_old_path: Option<String>,
    #[serde(skip)]
    library_id: String,
}

impl LibraryCommit {
    /// Id of the library whose history produced this commit.
    pub fn library_id(&self) -> &str {
        &self.library_id
    }
}

#[derive(Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    page_next: bool,
    #[serde(rename = "Commits", alias = "commits", default)]
    commits: Vec<LibraryCommit>,
}

impl Library {
    /// First page of the commit log. Further pages are not requested.
    pub fn history(&self) -> ApiResult<Vec<LibraryCommit>> {
        let uri = self.uri("/history");
        let response = self.client().send(Request::get(uri.clone()))?;
        let envelope: HistoryEnvelope = decode_envelope(response, &uri)?;
        if envelope.page_next {
            debug!(library = %self.id, "history has more pages; returning first page only");
        }
        Ok(envelope
            .commits
            .into_iter()
            .map(|mut commit| {
                commit.library_id = self.id.clone();
                commit
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::client::Client;
    use crate::api::library::Library;
    use crate::core::dispatch::scripted::ScriptedDispatch;
    use crate::core::error::ErrorKind;
    use std::sync::Arc;

    const LISTING: &str = r#"[{"id": "lib9", "name": "Notes"}]"#;

    fn library(dispatch: &Arc<ScriptedDispatch>) -> Library {
        Client::from_shared(dispatch.clone())
            .get_library("Notes")
            .expect("library")
    }

    #[test]
    fn history_returns_commits_in_order_without_paging() {
        let body = r#"{"page_next": true, "Commits": [{"id":"c1"}, {"id":"c2"}]}"#;
        let dispatch = Arc::new(ScriptedDispatch::new().reply(200, LISTING).reply(200, body));
        let commits = library(&dispatch).history().expect("history");
        let ids: Vec<_> = commits.iter().map(|commit| commit.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert!(commits.iter().all(|commit| commit.library_id() == "lib9"));
        assert_eq!(
            dispatch.paths(),
            vec!["/repos/".to_string(), "/repos/lib9/history".to_string()]
        );
    }

    #[test]
    fn history_accepts_lowercase_key_and_merge_fields() {
        let body = r#"{"page_next": false, "commits": [{
            "id": "m1", "desc": "Merged", "ctime": 1700000000, "creator": "0f",
            "creator_name": "ann@example.com", "conflict": false, "new_merge": true,
            "parent_id": "p1", "second_parent_id": "p2", "root_id": "r",
            "repo_id": "lib9", "rev_file_size": -1, "rev_file_id": null,
            "rev_renamed_old_path": null
        }]}"#;
        let dispatch = Arc::new(ScriptedDispatch::new().reply(200, LISTING).reply(200, body));
        let commits = library(&dispatch).history().expect("history");
        assert_eq!(commits.len(), 1);
        let merge = &commits[0];
        assert!(merge.new_merge);
        assert_eq!(merge.parent_id.as_deref(), Some("p1"));
        assert_eq!(merge.second_parent_id.as_deref(), Some("p2"));
        assert_eq!(merge.rev_file_id, None);
        assert_eq!(merge.rev_file_size, Some(-1));
        assert_eq!(merge.creator_name, "ann@example.com");
    }

    #[test]
    fn history_bare_array_is_decode_error() {
        let dispatch = Arc::new(
            ScriptedDispatch::new()
                .reply(200, LISTING)
                .reply(200, r#"[{"id":"c1"}]"#),
        );
        let err = library(&dispatch).history().expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.body(), Some(r#"[{"id":"c1"}]"#));
    }
}
