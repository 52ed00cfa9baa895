//! Feed service client.
//!
//! Talks to a Miniflux instance over its REST API: one call to fetch the
//! unread batch at startup and one to mark entries read.

mod client;
mod types;

pub use client::{ClientError, MinifluxClient};
pub use types::{ApiEntry, ApiFeed, EntriesResponse, UpdateEntriesRequest};
