mod cli;
mod compose;
mod config;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use cli::Args;
use config::Config;
use error::{Error, ErrorKind};
use log::{error, info};
use pipeline::{Outcome, Pipeline, StageError};
use std::process::ExitCode;
use twitter::TwitterClient;

#[tokio::main]
async fn main() -> ExitCode {
    common::setup_env();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match error_kind(&e) {
            Some(kind) => {
                error!("{kind}: {e:#}");
                ExitCode::from(kind.exit_code())
            }
            None => {
                error!("{e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_args(&args);
    info!(
        "Using {} preset, {} rate field, capture {}",
        args.preset,
        config.rate_field_kind,
        if config.capture_enabled() { "on" } else { "off" }
    );

    let pipeline = Pipeline::from_config(&config)?;

    if args.dry_run {
        let preview = pipeline.preview().await?;
        if let Some(image) = &preview.image {
            info!("Snapshot would be attached from {}", image.path().display());
        }
        println!("{}", preview.message);
        return Ok(());
    }

    let publisher = TwitterClient::from_env().map_err(Error::from)?;

    match pipeline.run(&publisher).await {
        Outcome::Done(id) => {
            info!("Posted Tweet id: {id}");
            println!("{id}");
            Ok(())
        }
        Outcome::Failed(e) => Err(e.into()),
    }
}

fn error_kind(e: &anyhow::Error) -> Option<ErrorKind> {
    if let Some(failure) = e.downcast_ref::<StageError>() {
        Some(failure.source.kind())
    } else {
        e.downcast_ref::<Error>().map(Error::kind)
    }
}
