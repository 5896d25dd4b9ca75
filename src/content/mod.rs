//! Static content served from the sandbox.
//!
//! This module turns a parsed request into a response:
//!
//! - **`resolver`**: maps a request target onto the sandbox and classifies it
//! - **`listing`**: builds and renders directory listings
//! - **`responder`**: picks between file bytes, a listing, and the 400 page

pub mod listing;
pub mod resolver;
pub mod responder;

pub use listing::{DirectoryEntry, DirectoryListing, EntryKind};
pub use resolver::{PathKind, ResolveError, ResolvedPath, Sandbox};
pub use responder::respond;
