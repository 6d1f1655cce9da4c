// Misskey-dialect client modules
//
// Hand-written client for the Misskey-style RPC API: every call is a POST
// with the token in the body, JSON is camelCase, several mutations return
// nothing and need a follow-up read, and the streaming WebSocket multiplexes
// channels over one socket. Operations with no native equivalent are listed
// in the capability table and reject before any I/O.

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
