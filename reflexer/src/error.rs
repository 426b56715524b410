use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No data: {0}")]
    DataUnavailable(String),

    #[error("Spot price unavailable: {0}")]
    PriceUnavailable(String),

    #[error("Malformed stat {field}: {value}")]
    MalformedStat { field: String, value: String },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
