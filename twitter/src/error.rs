use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Media upload failed:\nStatusCode: {0}\nText: {1}")]
    UploadFailed(reqwest::StatusCode, String),

    #[error("Publishing failed:\nStatusCode: {0}\nText: {1}")]
    PublishFailed(reqwest::StatusCode, String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to generate timestamp")]
    Timestamp(#[from] std::time::SystemTimeError),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Failed to deserialize response: {0}")]
    Deserialize(String),
}
