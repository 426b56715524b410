use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation to {0} timed out")]
    NavigationTimeout(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Failed to close browser: {0}")]
    Close(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
