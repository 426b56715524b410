use crate::endpoint::Endpoint;
use crate::sign::{form_body, Credentials, Signer};
use crate::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use derive_more::{Deref, Display, From, Into};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Id of an uploaded image, attachable to a single subsequent post.
#[derive(Debug, Clone, PartialEq, Eq, Display, Deref, From, Into)]
pub struct MediaHandle(String);

#[derive(Debug, Clone, PartialEq, Eq, Display, Deref, From, Into)]
pub struct PublishedPostId(String);

#[derive(Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    id_str: String,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn upload_media(&self, image: &[u8]) -> Result<MediaHandle>;

    async fn publish_post(&self, text: &str, media: Option<&MediaHandle>) -> Result<PublishedPostId>;
}

pub struct TwitterClient {
    client: reqwest::Client,
    signer: Signer,
}

impl TwitterClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            signer: Signer::new(credentials),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Credentials::from_env()?))
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: Endpoint, params: &[(&str, &str)]) -> Result<T> {
        let url = endpoint.url();
        let authorization = self.signer.authorization("POST", url, params)?;

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form_body(params))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        endpoint.parse_response(status, text)
    }
}

#[async_trait]
impl Publisher for TwitterClient {
    async fn upload_media(&self, image: &[u8]) -> Result<MediaHandle> {
        let media_data = BASE64.encode(image);
        let response: MediaUploadResponse = self
            .post(Endpoint::MediaUpload, &[("media_data", media_data.as_str())])
            .await?;
        Ok(MediaHandle(response.media_id_string))
    }

    async fn publish_post(&self, text: &str, media: Option<&MediaHandle>) -> Result<PublishedPostId> {
        let mut params = vec![("status", text)];
        if let Some(media) = media {
            params.push(("media_ids", media.as_str()));
        }

        let response: StatusResponse = self.post(Endpoint::StatusesUpdate, &params).await?;
        Ok(PublishedPostId(response.id_str))
    }
}
