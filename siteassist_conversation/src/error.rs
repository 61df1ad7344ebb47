use siteassist_core::AssistantError;
use thiserror::Error;

/// Errors a chat or reset request can surface to the transport layer.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("site is not provisioned yet")]
    NotReady,

    #[error("assistant backend error: {0}")]
    Backend(#[from] AssistantError),

    #[error("session store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl ChatError {
    /// Short message safe to render to the end user. Diagnostic detail stays
    /// in the server-side log.
    #[must_use]
    pub const fn user_facing_message(&self) -> &'static str {
        match self {
            Self::NotReady => "The assistant is not set up for this site yet.",
            Self::Backend(AssistantError::Unauthorized) => {
                "The assistant is misconfigured. Please contact the site administrator."
            }
            Self::Backend(AssistantError::Unreachable(_)) => {
                "The assistant could not be reached. Please try again."
            }
            Self::Backend(_) | Self::Store(_) => {
                "The assistant ran into a problem answering. Please try again later."
            }
        }
    }
}
