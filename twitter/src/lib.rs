//! Minimal Twitter API v1.1 client: media upload and status updates,
//! authenticated with OAuth 1.0a user credentials.
mod client;
mod endpoint;
mod error;
mod sign;

pub use client::{MediaHandle, PublishedPostId, Publisher, TwitterClient};
pub use endpoint::Endpoint;
pub use error::Error;
pub use reqwest::StatusCode;
pub use sign::{Credentials, Signer};

pub type Result<T> = std::result::Result<T, Error>;
