//! # snipguess core library
//!
//! Game logic for the snippet-guessing music trivia game:
//! - Title normalization and guess evaluation
//! - Album classification and the user's album filter
//! - Song cache over the remote catalog API
//! - Snippet playback control (timed state machine)
//! - Per-song game sessions and the long-lived game engine
//! - Settings persistence (SQLite key-value store)
//!
//! Rendering is out of scope: the embedding layer implements
//! [`playback::AudioSource`] over its real audio backend and observes state
//! through the session's accessors and progress channel.

pub mod album;
pub mod cache;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod guess;
pub mod normalize;
pub mod playback;
pub mod session;
pub mod settings;

pub use engine::GameEngine;
pub use error::{Error, Result};
pub use session::{GameOutcome, GameSession, GuessOutcome, SkipOutcome};
