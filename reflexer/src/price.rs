use crate::{Error, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

pub const COINGECKO_SIMPLE_PRICE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

#[async_trait]
pub trait SpotPriceSource: Send + Sync {
    async fn spot_price(&self) -> Result<f64>;
}

/// CoinGecko `/simple/price` lookup for a single asset.
pub struct CoingeckoClient {
    client: reqwest::Client,
    base: Url,
    asset: String,
    currency: String,
}

impl CoingeckoClient {
    pub fn new(base: &str, asset: impl Into<String>, currency: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            base: Url::parse(base)?,
            asset: asset.into(),
            currency: currency.into(),
        })
    }

    fn url(&self) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("ids", &self.asset)
            .append_pair("vs_currencies", &self.currency);
        url
    }
}

#[async_trait]
impl SpotPriceSource for CoingeckoClient {
    async fn spot_price(&self) -> Result<f64> {
        let url = self.url();
        debug!("Requesting spot price {url}");

        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Spot price API responded {}", status.as_u16());

        parse_response(status, &text, &self.asset, &self.currency)
    }
}

/// Turns a raw `/simple/price` HTTP reply into the spot price.
pub fn parse_response(
    status: StatusCode,
    text: &str,
    asset: &str,
    currency: &str,
) -> Result<f64> {
    if !status.is_success() {
        return Err(Error::PriceUnavailable(format!("{status}: {text}")));
    }

    let body: Value = serde_json::from_str(text)
        .map_err(|e| Error::PriceUnavailable(format!("invalid JSON body: {e}")))?;
    parse_spot_price(&body, asset, currency)
}

/// Reads `{ "<asset>": { "<currency>": <price> } }`.
///
/// Numeric strings are accepted as well as JSON numbers.
pub fn parse_spot_price(body: &Value, asset: &str, currency: &str) -> Result<f64> {
    let field = body
        .get(asset)
        .and_then(|quotes| quotes.get(currency))
        .ok_or_else(|| Error::PriceUnavailable(format!("{asset}.{currency} missing")))?;

    let price = match field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    price
        .filter(|p| p.is_finite())
        .ok_or_else(|| Error::PriceUnavailable(format!("{asset}.{currency} is not numeric: {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numeric_price() {
        let body = json!({ "ethereum": { "usd": 2500.0 } });
        assert_eq!(parse_spot_price(&body, "ethereum", "usd").unwrap(), 2500.0);
    }

    #[test]
    fn parses_string_price() {
        let body = json!({ "ethereum": { "usd": "1834.12" } });
        assert_eq!(parse_spot_price(&body, "ethereum", "usd").unwrap(), 1834.12);
    }

    #[test]
    fn missing_asset_is_unavailable() {
        let body = json!({ "bitcoin": { "usd": 60000 } });
        assert!(matches!(
            parse_spot_price(&body, "ethereum", "usd"),
            Err(Error::PriceUnavailable(_))
        ));
    }

    #[test]
    fn non_numeric_price_is_unavailable() {
        for value in [json!("n/a"), json!(null), json!({ "v": 1 })] {
            let body = json!({ "ethereum": { "usd": value } });
            assert!(matches!(
                parse_spot_price(&body, "ethereum", "usd"),
                Err(Error::PriceUnavailable(_))
            ));
        }
    }

    #[test]
    fn rate_limited_reply_is_unavailable() {
        let reply = parse_response(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"status":{"error_code":429}}"#,
            "ethereum",
            "usd",
        );
        match reply {
            Err(Error::PriceUnavailable(reason)) => assert!(reason.contains("429")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn success_reply_yields_price() {
        let text = r#"{"ethereum":{"usd":2500.5}}"#;
        let price = parse_response(StatusCode::OK, text, "ethereum", "usd").unwrap();
        assert_eq!(price, 2500.5);
    }

    #[test]
    fn url_carries_asset_and_currency() {
        let client = CoingeckoClient::new(COINGECKO_SIMPLE_PRICE_URL, "ethereum", "usd").unwrap();
        assert_eq!(
            client.url().as_str(),
            "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd"
        );
    }
}
