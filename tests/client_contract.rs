//! Purpose: Contract tests for the typed client over a scripted dispatcher.
//! Exports: None (integration test module).
//! Role: Pin request composition (paths, queries, bodies) and decode/error behavior.
//! Invariants: No network; every reply is scripted and every request is recorded.

use seafile::api::{
    Client, Dispatch, Error, ErrorKind, Library, Method, Request, Response,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorder {
    replies: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<Request>>,
}

impl Recorder {
    fn with_replies(replies: &[(u16, &str)]) -> Arc<Self> {
        let recorder = Recorder::default();
        {
            let mut queue = recorder.replies.lock().unwrap();
            for (status, body) in replies {
                queue.push_back(Response::new(*status, *body));
            }
        }
        Arc::new(recorder)
    }

    fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.path.clone())
            .collect()
    }

    fn last(&self) -> Request {
        self.requests.lock().unwrap().last().cloned().expect("request")
    }
}

impl Dispatch for Recorder {
    fn dispatch(&self, request: Request) -> Result<Response, Error> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::new(ErrorKind::Transport).with_message("no reply queued"))
    }
}

const LIBRARIES: &str = r#"[
    {"id": "11111111-aaaa", "name": "Photos", "type": "repo", "permission": "rw",
     "encrypted": false, "virtual": false, "size": 1, "mtime": 1, "head_commit_id": "h1"},
    {"id": "22222222-bbbb", "name": "My Library", "type": "repo", "permission": "rw",
     "encrypted": false, "virtual": false, "size": 2, "mtime": 2, "head_commit_id": "h2"},
    {"id": "33333333-cccc", "name": "Shared", "type": "srepo", "permission": "r",
     "encrypted": false, "virtual": true, "size": 3, "mtime": 3, "head_commit_id": "h3"}
]"#;

fn library_named(name: &str, replies: &[(u16, &str)]) -> (Library, Arc<Recorder>) {
    let mut all = vec![(200, LIBRARIES)];
    all.extend_from_slice(replies);
    let recorder = Recorder::with_replies(&all);
    let library = Client::from_shared(recorder.clone())
        .get_library(name)
        .expect("library");
    (library, recorder)
}

#[test]
fn listing_conveniences_emit_fixed_queries_for_any_path() {
    for path in ["/", "/a b/c", "/deep/er/"] {
        let recorder = Recorder::with_replies(&[(200, "[]"), (200, "[]"), (200, "[]"), (200, "[]")]);
        let client = Client::from_shared(recorder.clone());
        client.list_all_entries("L", path).expect("all");
        client.list_file_entries("L", path).expect("files");
        client.list_dir_entries("L", path).expect("dirs");
        client.list_dirs_recursive("L", path).expect("recursive");

        let suffixes: Vec<String> = recorder
            .paths()
            .iter()
            .map(|uri| {
                let query = uri.split_once('?').expect("query").1;
                query
                    .split('&')
                    .filter(|pair| !pair.starts_with("p="))
                    .collect::<Vec<_>>()
                    .join("&")
            })
            .collect();
        assert_eq!(suffixes, vec!["", "t=f", "t=d", "recursive=1&t=d"]);
        assert!(recorder.paths().iter().all(|uri| uri.starts_with("/repos/L/dir/?p=")));
    }
}

#[test]
fn empty_listing_path_requests_root() {
    let recorder = Recorder::with_replies(&[(200, "[]")]);
    Client::from_shared(recorder.clone())
        .list_dir_entries("L", "")
        .expect("dirs");
    assert_eq!(recorder.paths(), vec!["/repos/L/dir/?p=%2F&t=d"]);
    assert_eq!(recorder.last().method, Method::Get);
}

#[test]
fn default_library_absent_is_not_found_whatever_repo_id() {
    for body in [
        r#"{"exists": false, "repo_id": "22222222-bbbb"}"#,
        r#"{"exists": false, "repo_id": ""}"#,
        r#"{"exists": false}"#,
    ] {
        let recorder = Recorder::with_replies(&[(200, body)]);
        let err = Client::from_shared(recorder)
            .default_library_id()
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

#[test]
fn empty_name_picks_the_default_library() {
    let recorder = Recorder::with_replies(&[
        (200, r#"{"exists": true, "repo_id": "22222222-bbbb"}"#),
        (200, LIBRARIES),
    ]);
    let library = Client::from_shared(recorder)
        .get_default_library()
        .expect("library");
    assert_eq!(library.id, "22222222-bbbb");
    assert_eq!(library.name, "My Library");
}

#[test]
fn default_id_missing_from_listing_is_not_found() {
    let recorder = Recorder::with_replies(&[
        (200, r#"{"exists": true, "repo_id": "99999999-zzzz"}"#),
        (200, LIBRARIES),
    ]);
    let err = Client::from_shared(recorder)
        .get_library("")
        .expect_err("err");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn unknown_name_is_not_found() {
    let recorder = Recorder::with_replies(&[(200, LIBRARIES)]);
    let err = Client::from_shared(recorder)
        .get_library("nonexistent")
        .expect_err("err");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn upload_link_is_returned_without_quotes() {
    let (library, recorder) =
        library_named("Photos", &[(200, "\"https://example.com/up/token\"")]);
    assert_eq!(library.upload_link().expect("link"), "https://example.com/up/token");
    assert_eq!(recorder.last().path, "/repos/11111111-aaaa/upload-link/");
}

#[test]
fn create_directory_succeeds_only_on_created() {
    let (library, recorder) = library_named("Photos", &[(201, "\"success\"")]);
    library.create_directory("/2024").expect("created");
    let request = recorder.last();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/repos/11111111-aaaa/dir/?p=%2F2024");
    assert_eq!(request.body.as_deref(), Some(&b"operation=mkdir"[..]));

    for (status, body) in [(400, "bad request"), (403, r#"{"error_msg": "Permission denied."}"#)] {
        let (library, _) = library_named("Photos", &[(status, body)]);
        let err = library.create_directory("/2024").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::OperationFailed);
        assert_eq!(err.status(), Some(status));
        assert_eq!(err.body(), Some(body));
    }
}

#[test]
fn history_returns_first_page_only() {
    let body = r#"{"page_next": true, "Commits": [{"id":"c1"}, {"id":"c2"}]}"#;
    let (library, recorder) = library_named("Shared", &[(200, body)]);
    let commits = library.history().expect("history");
    let ids: Vec<_> = commits.iter().map(|commit| commit.id.clone()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert_eq!(commits[0].library_id(), "33333333-cccc");
    assert_eq!(
        recorder.paths(),
        vec!["/repos/", "/repos/33333333-cccc/history"]
    );
}

#[test]
fn library_outlives_the_client_that_listed_it() {
    let recorder = Recorder::with_replies(&[(200, LIBRARIES), (200, "\"https://u\"")]);
    let library = {
        let client = Client::from_shared(recorder.clone());
        client.get_library("Photos").expect("library")
    };
    assert_eq!(library.upload_link().expect("link"), "https://u");
}

#[test]
fn client_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
    assert_send_sync::<Library>();
}
