use crate::{Error, Result};
use log::info;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use strum_macros::Display;

/// Twitter API endpoints used by the bot, displayed as their API path.
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endpoint {
    #[strum(serialize = "media/upload")]
    MediaUpload,
    #[strum(serialize = "statuses/update")]
    StatusesUpdate,
}

impl Endpoint {
    pub fn url(self) -> &'static str {
        match self {
            Endpoint::MediaUpload => "https://upload.twitter.com/1.1/media/upload.json",
            Endpoint::StatusesUpdate => "https://api.twitter.com/1.1/statuses/update.json",
        }
    }

    pub(crate) fn rejected(self, status: StatusCode, body: String) -> Error {
        match self {
            Endpoint::MediaUpload => Error::UploadFailed(status, body),
            Endpoint::StatusesUpdate => Error::PublishFailed(status, body),
        }
    }

    /// Checks the status of a reply from this endpoint and decodes its body.
    pub(crate) fn parse_response<T: DeserializeOwned>(
        self,
        status: StatusCode,
        text: String,
    ) -> Result<T> {
        if !status.is_success() {
            return Err(self.rejected(status, text));
        }

        info!("Twitter API post {self} success: {}", status.as_u16());
        serde_json::from_str(&text).map_err(|_| Error::Deserialize(text))
    }
}
