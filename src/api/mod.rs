//! Purpose: Define the public Rust API for talking to a Seafile server.
//! Exports: `Client`, `HttpTransport`, the library/directory/commit types, and errors.
//! Role: Typed operations layered over one `Dispatch` primitive.
//! Invariants: Every operation takes its dispatcher from an explicit `Client`; no globals.
//! Invariants: Decode shape is chosen per endpoint (bare array, envelope, or string).

mod client;
mod commit;
mod decode;
mod directory;
mod library;
mod transport;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::dispatch::{Dispatch, Method, Request, Response};
pub use crate::core::error::{Error, ErrorKind};
pub use client::Client;
pub use commit::LibraryCommit;
pub use directory::{DirectoryEntry, EntryKind, EntryTypeFilter, ListOptions};
pub use library::{Library, LibraryType};
pub use transport::HttpTransport;
