//! Purpose: Hold the dispatch capability that every API operation is issued through.
//! Exports: `Client`.
//! Role: Explicit context for library, directory and history operations; no globals.
//! Invariants: `Client` is a cheap `Arc` handle; clones share one dispatcher.
//! Invariants: Holds no mutable state and caches nothing between calls.
#![allow(clippy::result_large_err)]

use super::decode::{ApiResult, decode_string};
use crate::core::dispatch::{Dispatch, Request, Response};
use crate::core::error::{Error, ErrorKind};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Client {
    dispatch: Arc<dyn Dispatch>,
}

impl Client {
    pub fn new(dispatch: impl Dispatch + 'static) -> Self {
        Self {
            dispatch: Arc::new(dispatch),
        }
    }

    pub fn from_shared(dispatch: Arc<dyn Dispatch>) -> Self {
        Self { dispatch }
    }

    /// Checks that the server answers at all. No authentication involved.
    pub fn ping(&self) -> ApiResult<()> {
        self.expect_pong("/ping/")
    }

    /// Checks that the configured token is accepted.
    pub fn auth_ping(&self) -> ApiResult<()> {
        self.expect_pong("/auth/ping/")
    }

    pub(crate) fn send(&self, request: Request) -> ApiResult<Response> {
        let method = request.method;
        let path = request.path.clone();
        debug!(method = method.as_str(), path = %path, "dispatching request");
        let response = self
            .dispatch
            .dispatch(request)
            .map_err(|err| err.with_path(path.clone()))?;
        debug!(
            method = method.as_str(),
            path = %path,
            status = response.status,
            "received response"
        );
        tracing::trace!(body = %response.body, "response body");
        Ok(response)
    }

    fn expect_pong(&self, path: &str) -> ApiResult<()> {
        let response = self.send(Request::get(path))?;
        let status = response.status;
        let reply = decode_string(response, path)?;
        if reply != "pong" {
            return Err(Error::new(ErrorKind::Decode)
                .with_message("unexpected ping reply")
                .with_status(status)
                .with_path(path)
                .with_body(reply));
        }
        Ok(())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
