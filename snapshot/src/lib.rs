//! Headless-browser capture of a region of the stats dashboard.
mod capture;
mod chromium;
mod error;
mod image;

pub use capture::{BrowserLauncher, BrowserSession, Capturer, Region, ViewportSize, GRACE_PERIOD, NAVIGATION_TIMEOUT};
pub use chromium::{ChromiumLauncher, ChromiumSession};
pub use error::Error;
pub use image::SnapshotImage;

pub type Result<T> = std::result::Result<T, Error>;
