// fedimux: one client surface for Mastodon-style and Misskey-style servers
//
// Two concrete clients with identical method sets translate between each
// server dialect's native wire shapes and one unified entity model. Where a
// dialect has no equivalent for an operation, the call rejects with
// `Error::NotSupported` before any network I/O.

pub mod capability;
pub mod entities;
pub mod error;
pub mod mastodon;
pub mod misskey;
pub mod paging;
pub mod params;
pub mod streaming;
pub mod transport;

pub use capability::Operation;
pub use error::Error;
pub use paging::Pagination;
pub use params::{PostPollParams, PostStatusParams};
pub use streaming::{ReconnectConfig, StreamState, StreamingEvent, StreamingHandle, Subscription};
pub use transport::TransportConfig;
