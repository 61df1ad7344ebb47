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

//! Per-user conversation orchestration.
//!
//! The [`ChatManager`] is the only component with business logic: it
//! bootstraps sessions lazily, appends turns to both histories, forwards the
//! full LLM context to the assistant backend, and persists the session only
//! when the backend produced a reply. The [`Provisioner`] handles the
//! one-shot activation check and the deactivation sweep.

mod error;
mod manager;
mod provision;
mod readiness;

pub use error::ChatError;
pub use manager::ChatManager;
pub use provision::{DeactivationReport, Provisioner};
pub use readiness::SiteReadiness;

#[cfg(test)]
pub(crate) mod testutil;
