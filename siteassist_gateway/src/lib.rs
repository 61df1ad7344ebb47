#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Front-end-facing operation surface.
//!
//! Transport-agnostic: handlers are pure async functions returning typed
//! results that a thin adapter (web endpoint, CLI) serializes. Every
//! request carries a user identity and a per-session anti-forgery token,
//! both validated before any session state is touched.

mod error;
mod handler;
mod token;

pub use error::{Error, Result};
pub use handler::{reset_conversation, submit_message, ChatReply, ChatRequest, ResetRequest};
pub use token::TokenValidator;
