//! Shared infrastructure for twig tools.
//!
//! - **Fetching** - retrieve a document over HTTP(S) or from a `data:` URL,
//!   as an asynchronous task kept apart from the synchronous parser

pub mod net;

pub use net::{DataUrl, FetchError, decode_text, fetch_bytes, fetch_bytes_blocking, fetch_text};
