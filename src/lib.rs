//! Warden - sandboxed static file server
//!
//! Core library for request handling and content resolution.

pub mod config;
pub mod content;
pub mod http;
pub mod server;
