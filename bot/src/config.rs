use crate::cli::Args;
use crate::compose::Template;
use clap::ValueEnum;
use log::warn;
use reflexer::{RateFieldKind, COINGECKO_SIMPLE_PRICE_URL};
use snapshot::{Region, ViewportSize};
use strum_macros::Display;

pub(crate) const REFLEXER_SUBGRAPH_URL: &str =
    "https://subgraph.reflexer.finance/subgraphs/name/reflexer-labs/rai";
pub(crate) const RAI_ETH_PAIR: &str = "0x8ae720a71622e824f576b4a8c03031066548a3b1";
pub(crate) const STATS_DASHBOARD_URL: &str = "https://stats.reflexer.finance/";

const DASHBOARD_REGION: Region = Region {
    x: 0,
    y: 175,
    width: 600,
    height: 340,
};
const DASHBOARD_VIEWPORT: ViewportSize = ViewportSize {
    width: 600,
    height: 800,
};

/// The two deployed flavours of the bot.
#[derive(ValueEnum, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Preset {
    /// Text-only update with the annualized redemption rate
    Annualized,
    /// Eight-hourly redemption rate plus a screenshot of the stats dashboard
    Dashboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CaptureConfig {
    pub dashboard_url: String,
    pub region: Region,
    pub viewport: ViewportSize,
}

impl CaptureConfig {
    fn dashboard() -> Self {
        Self {
            dashboard_url: STATS_DASHBOARD_URL.into(),
            region: DASHBOARD_REGION,
            viewport: DASHBOARD_VIEWPORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub subgraph_url: String,
    pub pair_address: String,
    pub rate_field_kind: RateFieldKind,
    pub capture: Option<CaptureConfig>,
    pub price_api_url: String,
    pub spot_asset: String,
    pub spot_currency: String,
    pub template: Template,
}

impl Config {
    pub fn preset(preset: Preset) -> Self {
        let base = Self {
            subgraph_url: REFLEXER_SUBGRAPH_URL.into(),
            pair_address: RAI_ETH_PAIR.into(),
            rate_field_kind: RateFieldKind::Annualized,
            capture: None,
            price_api_url: COINGECKO_SIMPLE_PRICE_URL.into(),
            spot_asset: "ethereum".into(),
            spot_currency: "usd".into(),
            template: Template::Update,
        };

        match preset {
            Preset::Annualized => base,
            Preset::Dashboard => Self {
                rate_field_kind: RateFieldKind::Periodic,
                capture: Some(CaptureConfig::dashboard()),
                template: Template::Stats,
                ..base
            },
        }
    }

    pub fn from_args(args: &Args) -> Self {
        let mut config = Self::preset(args.preset);

        if let Some(url) = &args.subgraph_url {
            config.subgraph_url = url.clone();
        }
        if let Some(pair) = &args.pair_address {
            config.pair_address = pair.clone();
        }
        if let Some(kind) = args.rate_field {
            config.rate_field_kind = kind;
        }

        if args.no_capture {
            config.capture = None;
        } else if args.capture && config.capture.is_none() {
            config.capture = Some(CaptureConfig::dashboard());
        }

        match (&args.dashboard_url, config.capture.as_mut()) {
            (Some(url), Some(capture)) => capture.dashboard_url = url.clone(),
            (Some(url), None) => warn!("Snapshot disabled, ignoring dashboard URL {url}"),
            _ => {}
        }

        if config.template.labels_annualized() && config.rate_field_kind != RateFieldKind::Annualized {
            warn!(
                "Template labels the rate as annualized but the {} rate field is selected",
                config.rate_field_kind
            );
        }

        config
    }

    pub fn capture_enabled(&self) -> bool {
        self.capture.is_some()
    }

    pub fn query(&self) -> String {
        reflexer::build_query(&self.pair_address, self.rate_field_kind)
    }
}
