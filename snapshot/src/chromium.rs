use crate::capture::{BrowserLauncher, BrowserSession, Region, ViewportSize};
use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventLifecycleEvent, Viewport as Clip,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, warn};
use std::io;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// How long the browser gets to exit on its own before it is killed.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);
const NETWORK_IDLE: &str = "networkIdle";
const NAVIGATION_START: &str = "init";

/// Launches a local headless Chromium through the DevTools protocol.
#[derive(Default)]
pub struct ChromiumLauncher;

pub struct ChromiumSession {
    browser: Browser,
    handler: Option<JoinHandle<()>>,
    page: Option<Page>,
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self, viewport: ViewportSize) -> Result<ChromiumSession> {
        let config = BrowserConfig::builder()
            .window_size(viewport.width, viewport.height)
            .viewport(Viewport {
                width: viewport.width,
                height: viewport.height,
                ..Default::default()
            })
            .no_sandbox()
            .build()
            .map_err(Error::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Launch(e.to_string()))?;

        // The handler drives the websocket connection and must be polled
        // for the whole lifetime of the browser.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {e}");
                    break;
                }
            }
        });

        Ok(ChromiumSession {
            browser,
            handler: Some(handler),
            page: None,
        })
    }
}

/// Follows main-frame lifecycle events until the current navigation's
/// network has gone quiet.
///
/// Only a `networkIdle` carrying the loader id of the latest `init` counts, so
/// stragglers from the blank page opened before navigating are ignored.
#[derive(Debug, Default)]
pub(crate) struct NetworkIdleWatch {
    loader: Option<String>,
}

impl NetworkIdleWatch {
    pub(crate) fn observe(
        &mut self,
        main_frame: &str,
        frame: &str,
        loader: &str,
        name: &str,
    ) -> bool {
        if frame != main_frame {
            return false;
        }

        match name {
            NAVIGATION_START => {
                self.loader = Some(loader.to_string());
                false
            }
            NETWORK_IDLE => self.loader.as_deref() == Some(loader),
            _ => false,
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let failed = |e: CdpError| Error::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let page = self.browser.new_page("about:blank").await.map_err(failed)?;
        let mut lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(failed)?;

        page.goto(url).await.map_err(failed)?;

        let main_frame = page
            .mainframe()
            .await
            .map_err(failed)?
            .ok_or_else(|| Error::Navigation {
                url: url.to_string(),
                reason: "page has no main frame".into(),
            })?;

        let mut watch = NetworkIdleWatch::default();
        loop {
            let Some(event) = lifecycle.next().await else {
                return Err(Error::Navigation {
                    url: url.to_string(),
                    reason: "lifecycle events ended before the network went idle".into(),
                });
            };

            let settled = watch.observe(
                main_frame.as_ref(),
                event.frame_id.as_ref(),
                event.loader_id.as_ref(),
                &event.name,
            );
            if settled {
                break;
            }
        }

        debug!("Network idle on {url}");
        self.page = Some(page);
        Ok(())
    }

    async fn capture(&mut self, region: Region) -> Result<Vec<u8>> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| Error::Capture("no page loaded".into()))?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(Clip {
                x: region.x.into(),
                y: region.y.into(),
                width: region.width.into(),
                height: region.height.into(),
                scale: 1.0,
            })
            .build();

        page.screenshot(params)
            .await
            .map_err(|e| Error::Capture(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        self.page.take();

        let closed = shutdown(&mut self.browser, REAP_TIMEOUT).await;

        if let Some(mut handler) = self.handler.take() {
            match timeout(REAP_TIMEOUT, &mut handler).await {
                Ok(Err(e)) => warn!("Browser handler task failed: {e}"),
                Ok(Ok(())) => {}
                Err(_) => {
                    warn!("Browser handler still running, aborting it");
                    handler.abort();
                }
            }
        }

        closed
    }
}

/// The OS-level side of a browser: ask it to exit, force it, reap it.
#[async_trait]
pub(crate) trait BrowserProcess: Send {
    async fn request_close(&mut self) -> Result<()>;

    async fn kill(&mut self) -> Option<io::Result<()>>;

    async fn reap(&mut self) -> io::Result<()>;
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn request_close(&mut self) -> Result<()> {
        self.close()
            .await
            .map(|_| ())
            .map_err(|e| Error::Close(e.to_string()))
    }

    async fn kill(&mut self) -> Option<io::Result<()>> {
        Browser::kill(self).await
    }

    async fn reap(&mut self) -> io::Result<()> {
        self.wait().await.map(|_| ())
    }
}

/// Terminates the browser process. A failed graceful close, or a process
/// still alive after `reap_timeout`, is followed by a kill.
pub(crate) async fn shutdown<P: BrowserProcess>(
    process: &mut P,
    reap_timeout: Duration,
) -> Result<()> {
    let closed = process.request_close().await;

    if let Err(e) = &closed {
        warn!("Graceful browser close failed, killing it: {e}");
        kill(process).await;
    }

    match timeout(reap_timeout, process.reap()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to reap browser process: {e}"),
        Err(_) => {
            warn!("Browser still running after {reap_timeout:?}, killing it");
            kill(process).await;
            if let Err(e) = process.reap().await {
                warn!("Failed to reap browser process: {e}");
            }
        }
    }

    closed
}

async fn kill<P: BrowserProcess>(process: &mut P) {
    match process.kill().await {
        Some(Err(e)) => warn!("Failed to kill browser process: {e}"),
        Some(Ok(())) => {}
        None => debug!("No browser child process to kill"),
    }
}
