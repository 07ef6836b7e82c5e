//! # snipguess relay
//!
//! Browser-facing HTTP relay for the snipguess front end. Forwards catalog
//! requests (`/api/random`, `/api/audio/<path>`) so the browser never talks
//! cross-origin, streams audio bytes through, and serves the static front
//! end for every other path.

pub mod handlers;
pub mod server;
