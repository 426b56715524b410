use crate::compose::Template;
use crate::config::Config;
use crate::error::Error;
use log::{error, info};
use reflexer::{CoingeckoClient, IndexSource, RateFieldKind, SpotPriceSource, StatsRecord, SubgraphClient};
use snapshot::{BrowserLauncher, Capturer, ChromiumLauncher, SnapshotImage};
use strum_macros::Display;
use thiserror::Error;
use twitter::{MediaHandle, PublishedPostId, Publisher};

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum Stage {
    CaptureSnapshot,
    AcquireStats,
    UploadMedia,
    Compose,
    Publish,
}

#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub(crate) struct StageError {
    pub stage: Stage,
    pub source: Error,
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Done(PublishedPostId),
    Failed(StageError),
}

/// Everything a run produces short of publishing.
#[derive(Debug)]
pub(crate) struct Preview {
    pub message: String,
    pub image: Option<SnapshotImage>,
}

type StageResult<T> = std::result::Result<T, StageError>;

fn at<E: Into<Error>>(stage: Stage) -> impl FnOnce(E) -> StageError {
    move |e| StageError {
        stage,
        source: e.into(),
    }
}

fn enter(stage: Stage) {
    info!("Stage {stage}");
}

/// Capture, acquire stats, upload media, compose, publish: in that order,
/// stopping at the first failure.
pub(crate) struct Pipeline<L> {
    index: Box<dyn IndexSource>,
    prices: Box<dyn SpotPriceSource>,
    capturer: Option<Capturer<L>>,
    rate_field: RateFieldKind,
    template: Template,
}

impl Pipeline<ChromiumLauncher> {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let index = SubgraphClient::new(&config.subgraph_url, config.query());
        let prices = CoingeckoClient::new(&config.price_api_url, &config.spot_asset, &config.spot_currency)?;
        let capturer = config.capture.as_ref().map(|capture| {
            Capturer::new(
                ChromiumLauncher,
                &capture.dashboard_url,
                capture.region,
                capture.viewport,
            )
        });

        Ok(Self::new(
            Box::new(index),
            Box::new(prices),
            capturer,
            config.rate_field_kind,
            config.template,
        ))
    }
}

impl<L: BrowserLauncher> Pipeline<L> {
    pub fn new(
        index: Box<dyn IndexSource>,
        prices: Box<dyn SpotPriceSource>,
        capturer: Option<Capturer<L>>,
        rate_field: RateFieldKind,
        template: Template,
    ) -> Self {
        Self {
            index,
            prices,
            capturer,
            rate_field,
            template,
        }
    }

    pub async fn run(&self, publisher: &dyn Publisher) -> Outcome {
        match self.run_stages(publisher).await {
            Ok(id) => Outcome::Done(id),
            Err(e) => {
                error!("{e}");
                Outcome::Failed(e)
            }
        }
    }

    /// Runs every stage except uploading and publishing.
    pub async fn preview(&self) -> StageResult<Preview> {
        let image = self.capture_snapshot().await?;
        let stats = self.acquire_stats().await?;
        let message = self.compose(&stats);
        Ok(Preview { message, image })
    }

    async fn run_stages(&self, publisher: &dyn Publisher) -> StageResult<PublishedPostId> {
        let image = self.capture_snapshot().await?;
        let stats = self.acquire_stats().await?;

        let media = match image {
            Some(image) => Some(upload_media(publisher, image).await?),
            None => None,
        };

        let message = self.compose(&stats);

        enter(Stage::Publish);
        publisher
            .publish_post(&message, media.as_ref())
            .await
            .map_err(at(Stage::Publish))
    }

    async fn capture_snapshot(&self) -> StageResult<Option<SnapshotImage>> {
        let Some(capturer) = &self.capturer else {
            return Ok(None);
        };

        enter(Stage::CaptureSnapshot);
        capturer
            .capture()
            .await
            .map(Some)
            .map_err(at(Stage::CaptureSnapshot))
    }

    async fn acquire_stats(&self) -> StageResult<StatsRecord> {
        enter(Stage::AcquireStats);
        let raw = self.index.fetch_index().await.map_err(at(Stage::AcquireStats))?;
        let spot = self.prices.spot_price().await.map_err(at(Stage::AcquireStats))?;
        reflexer::aggregate(&raw, spot, self.rate_field).map_err(at(Stage::AcquireStats))
    }

    fn compose(&self, stats: &StatsRecord) -> String {
        enter(Stage::Compose);
        self.template.render(stats)
    }
}

/// Consumes the snapshot: its temp file is gone once the upload returns.
async fn upload_media(publisher: &dyn Publisher, image: SnapshotImage) -> StageResult<MediaHandle> {
    enter(Stage::UploadMedia);
    let bytes = image.read().map_err(at(Stage::UploadMedia))?;
    publisher
        .upload_media(&bytes)
        .await
        .map_err(at(Stage::UploadMedia))
}
