//! Purpose: Blocking HTTP implementation of `Dispatch` for a Seafile server.
//! Exports: `HttpTransport`.
//! Role: Resolves API-relative paths against `<server>/api2/` and injects the token.
//! Invariants: Any HTTP status is returned as a `Response`; only sub-HTTP failures error.
//! Invariants: Bodies are read to completion before `dispatch` returns.
//! Invariants: Absolute `http(s)://` paths bypass the API prefix.
#![allow(clippy::result_large_err)]

use super::decode::{ApiResult, decode_envelope, expect_status};
use crate::core::dispatch::{Dispatch, Request, Response};
use crate::core::error::{Error, ErrorKind};
use serde::Deserialize;
use std::fmt;
use std::io::Read;
use std::time::Duration;
use tracing::debug;
use url::Url;

const API_PREFIX: &str = "api2";

#[derive(Clone)]
pub struct HttpTransport {
    base_url: Url,
    token: Option<String>,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct TokenEnvelope {
    token: String,
}

impl HttpTransport {
    /// `server` is the site root, e.g. `https://cloud.example.com` or
    /// `https://example.com/seafile`; the `api2` prefix is added when missing.
    pub fn new(server: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(server.into())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self {
            base_url,
            token: None,
            agent,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Overall per-request timeout (connect + read + write).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::AgentBuilder::new().timeout(timeout).build();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Exchanges account credentials for an API token.
    pub fn obtain_token(&self, username: &str, password: &str) -> ApiResult<String> {
        let uri = "/auth-token/";
        let request =
            Request::post(uri).with_form(&[("username", username), ("password", password)]);
        let response = self
            .dispatch(request)
            .map_err(|err| err.with_path(uri))?;
        let response = expect_status(response, 200, uri)?;
        let envelope: TokenEnvelope = decode_envelope(response, uri)?;
        Ok(envelope.token)
    }

    fn resolve(&self, path: &str) -> ApiResult<Url> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            let relative = path.trim_start_matches('/');
            format!("{}{relative}", self.base_url)
        };
        Url::parse(&raw).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("invalid request url")
                .with_path(path)
                .with_source(err)
        })
    }
}

impl Dispatch for HttpTransport {
    fn dispatch(&self, request: Request) -> Result<Response, Error> {
        let url = self.resolve(&request.path)?;
        let mut call = self
            .agent
            .request(request.method.as_str(), url.as_str())
            .set("Accept", "application/json");
        if let Some(token) = &self.token {
            call = call.set("Authorization", &format!("Token {token}"));
        }
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        let result = match &request.body {
            Some(body) => call.send_bytes(body),
            None => call.call(),
        };
        match result {
            Ok(resp) => read_response(resp),
            Err(ureq::Error::Status(code, resp)) => {
                debug!(status = code, url = %url, "server returned error status");
                read_response(resp)
            }
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Transport)
                .with_message("request failed")
                .with_source(err)),
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

fn read_response(response: ureq::Response) -> ApiResult<Response> {
    let status = response.status();
    let mut body = String::new();
    response.into_reader().read_to_string(&mut body).map_err(|err| {
        Error::new(ErrorKind::Transport)
            .with_message("failed to read response body")
            .with_status(status)
            .with_source(err)
    })?;
    Ok(Response::new(status, body))
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid server url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("server url must use http or https scheme"));
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Usage).with_message("server url cannot be a base"));
    }
    let trimmed = url.path().trim_end_matches('/').to_string();
    let path = if trimmed.ends_with(&format!("/{API_PREFIX}")) {
        format!("{trimmed}/")
    } else {
        format!("{trimmed}/{API_PREFIX}/")
    };
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
