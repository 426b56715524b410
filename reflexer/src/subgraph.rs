use crate::stats::RateFieldKind;
use crate::{Error, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde_json::{json, Value};

/// The `data` object of a GraphQL response, kept as raw JSON.
///
/// Individual numeric fields are parsed later by [`crate::aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawIndexResponse(pub Value);

impl RawIndexResponse {
    /// Looks up a nested field by its dotted path, e.g. `uniswapPair.token1Price`.
    pub fn field(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.0, |value, key| value.get(key))
    }
}

#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn fetch_index(&self) -> Result<RawIndexResponse>;
}

pub struct SubgraphClient {
    client: reqwest::Client,
    url: String,
    query: String,
}

impl SubgraphClient {
    pub fn new(url: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            query: query.into(),
        }
    }

    pub async fn query(&self) -> Result<RawIndexResponse> {
        debug!("Querying subgraph {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "query": self.query }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Subgraph responded {}", status.as_u16());

        parse_response(status, &text)
    }
}

/// Turns a raw subgraph HTTP reply into the `data` object.
///
/// Non-success statuses keep the body in the error message.
pub fn parse_response(status: StatusCode, text: &str) -> Result<RawIndexResponse> {
    if !status.is_success() {
        return Err(Error::DataUnavailable(format!("{status}: {text}")));
    }

    let body: Value = serde_json::from_str(text)
        .map_err(|e| Error::DataUnavailable(format!("invalid JSON body: {e}")))?;
    extract_data(body)
}

#[async_trait]
impl IndexSource for SubgraphClient {
    async fn fetch_index(&self) -> Result<RawIndexResponse> {
        self.query().await
    }
}

/// Unwraps the `{ "data": { ... } }` envelope of a GraphQL response.
///
/// A missing or null `data` is fatal. GraphQL `errors`, if any, end up in the message.
pub fn extract_data(body: Value) -> Result<RawIndexResponse> {
    let Value::Object(mut envelope) = body else {
        return Err(Error::DataUnavailable("response is not an object".into()));
    };

    match envelope.remove("data") {
        Some(data) if !data.is_null() => Ok(RawIndexResponse(data)),
        _ => {
            let reason = envelope
                .get("errors")
                .map(Value::to_string)
                .unwrap_or_else(|| "missing data envelope".into());
            Err(Error::DataUnavailable(reason))
        }
    }
}

/// Renders the stats query for a Uniswap pair and redemption rate field.
pub fn build_query(pair_address: &str, rate_field: RateFieldKind) -> String {
    let rate_field = rate_field.field_name();
    format!(
        r#"{{
  systemState(id: "current") {{
    currentRedemptionPrice {{
      value
    }}
    currentRedemptionRate {{
      {rate_field}
    }}
    currentCoinMedianizerUpdate {{
      value
    }}
  }}
  uniswapPair(id: "{pair_address}") {{
    token1Price
  }}
}}"#
    )
}
