/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod batch;
mod config;

use crate::batch::{run_batch, BatchError, RetryPolicy};
use crate::config::Config;
use clap::{ArgAction, Parser};
use fdsn_federator::data_plane::accounting::FetchSummary;
use fdsn_federator::data_plane::upstream::HttpFetcher;
use fdsn_federator::Federator;
use route_catalog_static_file::{load_catalog, sync_remotes};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, BufWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(about = "Downloads waveforms from the data centres of a federation")]
struct FederatorArgs {
    /// json5 configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
    /// Request lines `NET STA LOC CHA START END`; read from stdin when absent.
    #[arg(short, long, value_name = "FILE")]
    post_file: Option<PathBuf>,
    /// Base name of the `.mseed` payload and the `.log` summary.
    #[arg(short, long, value_name = "NAME", default_value = "request")]
    output: String,
    /// How often lines without data are requested again.
    #[arg(short, long, default_value_t = 3)]
    retries: u32,
    /// Seconds to wait between attempts.
    #[arg(long, conflicts_with = "minutes")]
    seconds: Option<u64>,
    /// Minutes to wait between attempts.
    #[arg(long)]
    minutes: Option<u64>,
    /// Increase the verbosity level.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Download remote catalogs even if a cached copy exists.
    #[arg(long)]
    refresh: bool,
}

impl FederatorArgs {
    fn retry_wait(&self) -> Duration {
        match (self.seconds, self.minutes) {
            (_, Some(minutes)) => Duration::from_secs(minutes * 60),
            (Some(seconds), None) => Duration::from_secs(seconds),
            (None, None) => DEFAULT_RETRY_WAIT,
        }
    }

    fn log_filter(&self) -> EnvFilter {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

#[derive(Debug, Error)]
enum ClientError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("unable to parse config file: {0}")]
    Config(String),
    #[error("unable to build HTTP client: {0}")]
    Http(String),
    #[error(transparent)]
    Batch(#[from] BatchError),
}

fn io_error(path: &str) -> impl FnOnce(std::io::Error) -> ClientError + '_ {
    move |source| ClientError::Io {
        path: path.to_string(),
        source,
    }
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let args = FederatorArgs::parse();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_writer(std::io::stderr)
        .try_init();

    info!("Started configurable-federator");

    let config_path = args.config.display().to_string();
    let contents = tokio::fs::read_to_string(&args.config)
        .await
        .map_err(io_error(&config_path))?;
    let config: Config =
        json5::from_str(&contents).map_err(|err| ClientError::Config(err.to_string()))?;

    let request = match &args.post_file {
        Some(path) => {
            let display = path.display().to_string();
            tokio::fs::read_to_string(path)
                .await
                .map_err(io_error(&display))?
        }
        None => {
            let mut request = String::new();
            tokio::io::stdin()
                .read_to_string(&mut request)
                .await
                .map_err(io_error("stdin"))?;
            request
        }
    };

    let client = config
        .http
        .client_config()
        .build_client()
        .map_err(|err| ClientError::Http(err.to_string()))?;

    let sources = config.catalog.sources();
    let usable = sync_remotes(&client, &sources, args.refresh).await;
    let (routes, virtual_networks, report) =
        load_catalog(&sources, config.federator_config.overlap_policy());
    info!(
        remotes = sources.remotes.len(),
        usable_remotes = usable,
        documents = report.documents_loaded,
        routes = report.routes_inserted,
        rejected = report.routes_rejected,
        "catalog loaded"
    );

    let summary = Arc::new(FetchSummary::new());
    let federator = Federator::new(
        "configurable-federator",
        config.federator_config.clone(),
        Arc::new(HttpFetcher::from_client(client)),
    )
    .with_accounting(summary.clone());
    federator.publish(routes, virtual_networks);

    let payload_path = format!("{}.mseed", args.output);
    let payload = tokio::fs::File::create(&payload_path)
        .await
        .map_err(io_error(&payload_path))?;
    let mut payload = BufWriter::new(payload);

    let outcome = run_batch(
        &federator,
        &summary,
        &request,
        RetryPolicy {
            retries: args.retries,
            wait: args.retry_wait(),
        },
        &mut payload,
    )
    .await?;

    let log_path = format!("{}.log", args.output);
    tokio::fs::write(&log_path, outcome.log.as_bytes())
        .await
        .map_err(io_error(&log_path))?;

    info!(
        attempts = outcome.attempts,
        bytes = outcome.bytes,
        lines_without_data = outcome.pending.len(),
        payload = payload_path.as_str(),
        "batch finished"
    );
    Ok(())
}
