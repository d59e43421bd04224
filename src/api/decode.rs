//! Purpose: Turn dispatched responses into typed values or typed errors.
//! Exports: `decode_array`, `decode_envelope`, `decode_string`, `expect_status`.
//! Role: Shared by every endpoint; the caller picks the decode path for its endpoint.
//! Invariants: Shape is chosen by endpoint, never sniffed from the payload.
//! Invariants: Decode failures keep the status and the raw body for diagnosis.
use crate::core::dispatch::Response;
use crate::core::error::{Error, ErrorKind};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub(crate) type ApiResult<T> = Result<T, Error>;

#[derive(Deserialize)]
struct RemoteError {
    error_msg: String,
}

/// Bodies that are a bare JSON array (`/repos/`, `/repos/{id}/dir/`).
pub(crate) fn decode_array<T>(response: Response, path: &str) -> ApiResult<Vec<T>>
where
    T: DeserializeOwned,
{
    decode_body(response, path, "expected a json array")
}

/// Bodies that wrap the payload in named fields (`/default-repo/`, `/history`).
pub(crate) fn decode_envelope<E>(response: Response, path: &str) -> ApiResult<E>
where
    E: DeserializeOwned,
{
    decode_body(response, path, "expected a json object")
}

/// Bodies that are a quoted JSON string (`/upload-link/`, `/ping/`).
pub(crate) fn decode_string(response: Response, path: &str) -> ApiResult<String> {
    decode_body(response, path, "expected a json string")
}

/// Accepts only `expected`; anything else becomes `OperationFailed` with status and body.
pub(crate) fn expect_status(response: Response, expected: u16, path: &str) -> ApiResult<Response> {
    if response.status == expected {
        return Ok(response);
    }
    let mut err = Error::new(ErrorKind::OperationFailed)
        .with_message(format!(
            "expected status {expected}, got {}",
            response.status
        ))
        .with_status(response.status)
        .with_path(path);
    if let Some(remote) = remote_error_message(&response.body) {
        err = err.with_hint(remote);
    }
    Err(err.with_body(response.body))
}

fn decode_body<R>(response: Response, path: &str, expectation: &str) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    match serde_json::from_str(&response.body) {
        Ok(value) => Ok(value),
        Err(source) => {
            let mut err = Error::new(ErrorKind::Decode)
                .with_message(format!("invalid response json: {expectation}"))
                .with_status(response.status)
                .with_path(path);
            if let Some(remote) = remote_error_message(&response.body) {
                err = err.with_hint(remote);
            }
            Err(err.with_body(response.body).with_source(source))
        }
    }
}

fn remote_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<RemoteError>(body)
        .ok()
        .map(|remote| remote.error_msg)
}
