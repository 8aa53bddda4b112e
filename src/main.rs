//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `wire_fetch` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Following redirects by starting a fresh client per hop
//! - Writing the response head to stderr and the body to stdout
//!
//! All protocol handling is implemented in the library crate.

use std::process;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use log::info;
use tokio::io::AsyncWriteExt;
use url::Url;

use wire_fetch::initialization::{init_crypto_provider, init_logger_with, init_resolver};
use wire_fetch::{ClientConfig, ClientEvent, HttpClient, Opt, OutboundResponse, Outcome, StreamEnd};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;
    init_crypto_provider();

    match fetch(&opt).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("wire-fetch error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Fetches `opt.url`, following up to `opt.max_redirects` redirects.
async fn fetch(opt: &Opt) -> Result<()> {
    let resolver = init_resolver();
    let mut current = Url::parse(&opt.url).with_context(|| format!("Invalid URL {}", opt.url))?;
    let mut hops = 0;

    loop {
        let config = ClientConfig::from_url(current.as_str())?;
        let (task, mut events) = HttpClient::new(config, resolver.clone()).spawn();

        let event = events
            .recv()
            .await
            .ok_or_else(|| anyhow!("client finished without reporting an outcome"))?;

        match event {
            ClientEvent::Response(response) => {
                write_response(response).await?;
                return match task.await.context("client task panicked")? {
                    Outcome::Delivered(summary) => match summary.end {
                        StreamEnd::ReadFailed(kind) => {
                            bail!("body truncated after {} bytes: {kind}", summary.bytes)
                        }
                        StreamEnd::Eof | StreamEnd::ConsumerClosed => Ok(()),
                    },
                    other => bail!("unexpected outcome {other:?}"),
                };
            }
            ClientEvent::Redirect(location) => {
                task.await.context("client task panicked")?;
                if hops >= opt.max_redirects {
                    bail!("too many redirects (last Location: {location})");
                }
                hops += 1;
                current = current
                    .join(&location)
                    .with_context(|| format!("Invalid redirect Location {location}"))?;
                info!("Following redirect {hops} to {current}");
            }
            ClientEvent::Failure(err) => {
                task.await.context("client task panicked")?;
                return Err(anyhow!(err).context(format!("GET {current} failed")));
            }
        }
    }
}

/// Prints the head to stderr and copies the body to stdout until it ends.
async fn write_response(mut response: OutboundResponse) -> Result<()> {
    eprintln!("{}", response.status_line);
    for header in &response.headers {
        eprintln!("{header}");
    }
    eprintln!();

    let mut stdout = tokio::io::stdout();
    let mut chunk = vec![0u8; 8 * 1024];
    loop {
        let n = response.body.read(&mut chunk).await;
        if n == 0 {
            break;
        }
        stdout
            .write_all(&chunk[..n])
            .await
            .context("Failed to write body to stdout")?;
    }
    stdout.flush().await.context("Failed to flush stdout")?;
    Ok(())
}
