use crate::subgraph::RawIndexResponse;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const REDEMPTION_PRICE: &str = "systemState.currentRedemptionPrice.value";
const ORACLE_PRICE: &str = "systemState.currentCoinMedianizerUpdate.value";
const PAIR_PRICE: &str = "uniswapPair.token1Price";

/// Which redemption rate the subgraph is asked for.
///
/// Both kinds go through the same `(rate - 1) * 100` transform, so a
/// `Periodic` rate yields the percentage change over eight hours, not a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateFieldKind {
    #[default]
    Annualized,
    Periodic,
}

impl RateFieldKind {
    pub fn field_name(self) -> &'static str {
        match self {
            RateFieldKind::Annualized => "annualizedRate",
            RateFieldKind::Periodic => "eightHourlyRate",
        }
    }

    fn path(self) -> String {
        format!("systemState.currentRedemptionRate.{}", self.field_name())
    }
}

impl fmt::Display for RateFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateFieldKind::Annualized => f.write_str("annualized"),
            RateFieldKind::Periodic => f.write_str("periodic"),
        }
    }
}

impl FromStr for RateFieldKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "annualized" => Ok(RateFieldKind::Annualized),
            "periodic" => Ok(RateFieldKind::Periodic),
            other => Err(format!("unknown rate field kind `{other}`, expected `annualized` or `periodic`")),
        }
    }
}

/// Stats ready for display, every field rendered with four decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRecord {
    pub market_price: String,
    pub oracle_price: String,
    pub redemption_price: String,
    pub annualized_rate: String,
}

/// Combines the index response with the spot price of the pair's quote asset.
pub fn aggregate(raw: &RawIndexResponse, spot_price: f64, rate_field: RateFieldKind) -> Result<StatsRecord> {
    let pair_price = read_stat(raw, PAIR_PRICE)?;
    let redemption_price = read_stat(raw, REDEMPTION_PRICE)?;
    let rate = read_stat(raw, &rate_field.path())?;
    let oracle_price = read_stat(raw, ORACLE_PRICE)?;

    Ok(StatsRecord {
        market_price: to_fixed(pair_price * spot_price),
        redemption_price: to_fixed(redemption_price),
        annualized_rate: to_fixed((rate - 1.0) * 100.0),
        oracle_price: to_fixed(oracle_price),
    })
}

fn read_stat(raw: &RawIndexResponse, path: &str) -> Result<f64> {
    let malformed = |value: String| Error::MalformedStat {
        field: path.to_string(),
        value,
    };

    let value = raw.field(path).ok_or_else(|| malformed("missing".into()))?;
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| malformed(value.to_string()))
}

fn to_fixed(value: f64) -> String {
    format!("{value:.4}")
}
