// Mastodon-dialect client modules
//
// Hand-written client for the Mastodon-style REST API: bearer-token auth,
// snake_case JSON, per-resource endpoints under /api/v1, and a URL-addressed
// streaming WebSocket. Every operation in the unified set has a native
// equivalent here, so the capability table is empty.

pub mod accounts;
pub mod client;
pub(crate) mod convert;
pub mod entities;
pub mod lists;
pub mod media;
pub mod moderation;
pub mod statuses;
pub(crate) mod streaming;
pub mod timelines;

pub use client::Client;
