//! Purpose: Define the request-dispatch seam every API operation is built on.
//! Exports: `Dispatch`, `Method`, `Request`, `Response`.
//! Role: One authenticated HTTP round trip per call; implemented by `HttpTransport`
//! in production and by scripted fakes in tests.
//! Invariants: Implementations return non-2xx statuses as `Response`, not `Error`.
//! Invariants: `Response::body` is fully read; no open stream outlives `dispatch`.
use super::error::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path relative to the API root (e.g. `/repos/`), or an absolute `http(s)://` URL.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Form-encoded body plus the matching content type.
    pub fn with_form(self, pairs: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one already-authenticated round trip.
///
/// Errors are reserved for failures below HTTP; any status the server sends back,
/// including 4xx/5xx, is a successful dispatch.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, request: Request) -> Result<Response, Error>;
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::{Dispatch, Request, Response};
    use crate::core::error::{Error, ErrorKind};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued responses in order and records every request it sees.
    #[derive(Default)]
    pub(crate) struct ScriptedDispatch {
        replies: Mutex<VecDeque<Result<Response, ErrorKind>>>,
        seen: Mutex<Vec<Request>>,
    }

    impl ScriptedDispatch {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply(self, status: u16, body: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Ok(Response::new(status, body)));
            self
        }

        pub(crate) fn fail(self, kind: ErrorKind) -> Self {
            self.replies.lock().unwrap().push_back(Err(kind));
            self
        }

        pub(crate) fn requests(&self) -> Vec<Request> {
            self.seen.lock().unwrap().clone()
        }

        pub(crate) fn paths(&self) -> Vec<String> {
            self.requests().into_iter().map(|req| req.path).collect()
        }
    }

    impl Dispatch for ScriptedDispatch {
        fn dispatch(&self, request: Request) -> Result<Response, Error> {
            self.seen.lock().unwrap().push(request);
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(kind)) => Err(Error::new(kind).with_message("scripted failure")),
                None => Err(Error::new(ErrorKind::Transport).with_message("no scripted reply")),
            }
        }
    }
}
