use siteassist_conversation::ChatError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request carries no authenticated user identity")]
    Unauthenticated,

    #[error("invalid anti-forgery token")]
    InvalidToken,

    #[error(transparent)]
    Chat(#[from] ChatError),
}
