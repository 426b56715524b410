use crate::image::SnapshotImage;
use crate::{Error, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Pause after load so late-rendering charts make it into the capture.
pub const GRACE_PERIOD: Duration = Duration::from_secs(2);
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Pixel rectangle of the rendered page, relative to its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// A running browser instance.
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url` and returns once the page has settled.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Screenshots `region` of the loaded page as PNG bytes.
    async fn capture(&mut self, region: Region) -> Result<Vec<u8>>;

    /// Shuts the browser down. Called exactly once per session.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self, viewport: ViewportSize) -> Result<Self::Session>;
}

pub struct Capturer<L> {
    launcher: L,
    url: String,
    region: Region,
    viewport: ViewportSize,
    navigation_timeout: Duration,
    grace_period: Duration,
}

impl<L: BrowserLauncher> Capturer<L> {
    pub fn new(launcher: L, url: impl Into<String>, region: Region, viewport: ViewportSize) -> Self {
        Self {
            launcher,
            url: url.into(),
            region,
            viewport,
            navigation_timeout: NAVIGATION_TIMEOUT,
            grace_period: GRACE_PERIOD,
        }
    }

    pub fn with_timing(mut self, navigation_timeout: Duration, grace_period: Duration) -> Self {
        self.navigation_timeout = navigation_timeout;
        self.grace_period = grace_period;
        self
    }

    /// Launches a browser, captures the configured region and closes the
    /// browser again, whether or not the capture succeeded.
    pub async fn capture(&self) -> Result<SnapshotImage> {
        let mut session = self.launcher.launch(self.viewport).await?;

        let captured = self.capture_in(&mut session).await;
        let closed = session.close().await;

        let png = match (captured, closed) {
            (Ok(png), Ok(())) => png,
            (Ok(png), Err(e)) => {
                warn!("Browser did not close cleanly after capture: {e}");
                png
            }
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(close_err)) => {
                warn!("Browser did not close cleanly after failed capture: {close_err}");
                return Err(e);
            }
        };

        let image = SnapshotImage::write(&png)?;
        info!("Captured {} bytes of {} to {}", png.len(), self.url, image.path().display());
        Ok(image)
    }

    async fn capture_in(&self, session: &mut L::Session) -> Result<Vec<u8>> {
        timeout(self.navigation_timeout, session.navigate(&self.url))
            .await
            .map_err(|_| Error::NavigationTimeout(self.url.clone()))??;

        sleep(self.grace_period).await;

        session.capture(self.region).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Copy)]
    enum Fault {
        None,
        Navigate,
        Hang,
        Capture,
        Close,
    }

    #[derive(Default)]
    struct Calls {
        launched: AtomicUsize,
        captured: AtomicUsize,
        closed: AtomicUsize,
    }

    struct FakeLauncher {
        fault: Fault,
        calls: Arc<Calls>,
    }

    struct FakeSession {
        fault: Fault,
        calls: Arc<Calls>,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        type Session = FakeSession;

        async fn launch(&self, viewport: ViewportSize) -> Result<FakeSession> {
            assert_eq!(viewport, ViewportSize { width: 600, height: 800 });
            self.calls.launched.fetch_add(1, Ordering::SeqCst);
            Ok(FakeSession {
                fault: self.fault,
                calls: self.calls.clone(),
            })
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn navigate(&mut self, url: &str) -> Result<()> {
            match self.fault {
                Fault::Navigate => Err(Error::Navigation {
                    url: url.to_string(),
                    reason: "net::ERR_NAME_NOT_RESOLVED".into(),
                }),
                Fault::Hang => std::future::pending().await,
                _ => Ok(()),
            }
        }

        async fn capture(&mut self, region: Region) -> Result<Vec<u8>> {
            self.calls.captured.fetch_add(1, Ordering::SeqCst);
            assert_eq!(region.y, 175);
            match self.fault {
                Fault::Capture => Err(Error::Capture("target closed".into())),
                _ => Ok(b"\x89PNG".to_vec()),
            }
        }

        async fn close(&mut self) -> Result<()> {
            self.calls.closed.fetch_add(1, Ordering::SeqCst);
            match self.fault {
                Fault::Close => Err(Error::Close("already gone".into())),
                _ => Ok(()),
            }
        }
    }

    fn capturer(fault: Fault) -> (Capturer<FakeLauncher>, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let launcher = FakeLauncher {
            fault,
            calls: calls.clone(),
        };
        let capturer = Capturer::new(
            launcher,
            "https://stats.reflexer.finance/",
            Region {
                x: 0,
                y: 175,
                width: 600,
                height: 340,
            },
            ViewportSize {
                width: 600,
                height: 800,
            },
        );
        (capturer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn closes_browser_after_success() {
        let (capturer, calls) = capturer(Fault::None);

        let image = capturer.capture().await.unwrap();

        assert_eq!(image.read().unwrap(), b"\x89PNG");
        assert_eq!(calls.launched.load(Ordering::SeqCst), 1);
        assert_eq!(calls.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closes_browser_when_navigation_fails() {
        let (capturer, calls) = capturer(Fault::Navigate);

        let err = capturer.capture().await.unwrap_err();

        assert!(matches!(err, Error::Navigation { .. }));
        assert_eq!(calls.captured.load(Ordering::SeqCst), 0);
        assert_eq!(calls.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closes_browser_when_navigation_times_out() {
        let (capturer, calls) = capturer(Fault::Hang);

        let err = capturer.capture().await.unwrap_err();

        assert!(matches!(err, Error::NavigationTimeout(_)));
        assert_eq!(calls.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closes_browser_when_capture_fails() {
        let (capturer, calls) = capturer(Fault::Capture);

        let err = capturer.capture().await.unwrap_err();

        assert!(matches!(err, Error::Capture(_)));
        assert_eq!(calls.captured.load(Ordering::SeqCst), 1);
        assert_eq!(calls.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn close_failure_does_not_discard_capture() {
        let (capturer, calls) = capturer(Fault::Close);

        assert!(capturer.capture().await.is_ok());
        assert_eq!(calls.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_grace_period_before_capturing() {
        let (capturer, _) = capturer(Fault::None);
        let capturer = capturer.with_timing(NAVIGATION_TIMEOUT, Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        capturer.capture().await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
