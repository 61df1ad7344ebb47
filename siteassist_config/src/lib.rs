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

//! Deployment configuration: backend credentials, site identity, bootstrap
//! content, and the session database location.

mod schema;

pub use schema::{BackendSettings, ChatSettings, Config, DatabaseConfig, SiteSettings};
