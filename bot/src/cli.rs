//! Command-line arguments, with environment variable fallbacks.

use crate::config::Preset;
use clap::{Parser, ValueHint};
use reflexer::RateFieldKind;

/// Posts the current RAI market, oracle and redemption stats to Twitter.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// Which stats variant to publish
    #[arg(long, env = "STATS_PRESET", value_enum, default_value_t = Preset::Annualized)]
    pub preset: Preset,

    /// GraphQL endpoint of the protocol subgraph
    #[arg(long, env = "SUBGRAPH_URL", value_hint = ValueHint::Url)]
    pub subgraph_url: Option<String>,

    /// Uniswap pair whose relative price gives the market price
    #[arg(long, env = "PAIR_ADDRESS")]
    pub pair_address: Option<String>,

    /// Redemption rate field to read: `annualized` or `periodic` (eight-hourly)
    #[arg(long, env = "RATE_FIELD")]
    pub rate_field: Option<RateFieldKind>,

    /// Dashboard page to screenshot
    #[arg(long, env = "DASHBOARD_URL", value_hint = ValueHint::Url)]
    pub dashboard_url: Option<String>,

    /// Attach a dashboard screenshot even if the preset is text-only
    #[arg(long, conflicts_with = "no_capture")]
    pub capture: bool,

    /// Skip the dashboard screenshot even if the preset takes one
    #[arg(long)]
    pub no_capture: bool,

    /// Print the message instead of publishing it
    #[arg(long)]
    pub dry_run: bool,
}
