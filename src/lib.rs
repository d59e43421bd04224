//! Purpose: Typed blocking client for the Seafile HTTP API, shared by the `seafile` CLI and tests.
//! Exports: `api` (client, transport, resources, errors), `core` (dispatch seam, error type).
//! Role: Library crate backing the binary; `api` is the stable surface.
//! Invariants: Stateless request/decode pipeline; no caching and no retries.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
