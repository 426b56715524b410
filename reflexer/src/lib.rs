//! Data sourcing for the Reflexer RAI stats bot.
//!
//! Two clients talk to the outside world: [`SubgraphClient`] queries the
//! protocol's GraphQL index and [`CoingeckoClient`] looks up the USD spot
//! price of the asset the trading pair is quoted in. [`aggregate`] turns the
//! two raw results into a [`StatsRecord`].
mod error;
mod price;
mod stats;
mod subgraph;

pub use error::Error;
pub use price::{parse_spot_price, CoingeckoClient, SpotPriceSource, COINGECKO_SIMPLE_PRICE_URL};
pub use stats::{aggregate, RateFieldKind, StatsRecord};
pub use subgraph::{build_query, extract_data, IndexSource, RawIndexResponse, SubgraphClient};

pub type Result<T> = std::result::Result<T, Error>;
