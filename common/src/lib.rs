use env_logger::{Builder, Env};

/// Loads `.env` if present and initialises the logger.
///
/// The default filter is `info`; `RUST_LOG` overrides it.
pub fn setup_env() {
    dotenvy::dotenv().ok();
    Builder::from_env(Env::default().default_filter_or("info")).init();
}
