mod cli;
mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pkgmirror_fetch::ReqwestClient;
use pkgmirror_mirror::{Mirror, PackageName};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, MirrorArgs, ServeArgs};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = &cli.config {
        anyhow::ensure!(path.is_file(), "config file {} does not exist", path.display());
    }
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Mirror(args) => mirror(&mut config, args).await,
        Command::Serve(args) => serve(&mut config, args).await,
    }
}

async fn mirror(config: &mut Config, args: MirrorArgs) -> Result<()> {
    args.apply(config);

    let names = args
        .packages
        .iter()
        .map(|n| PackageName::new(n.as_str()).with_context(|| format!("invalid package name {n:?}")))
        .collect::<Result<Vec<_>>>()?;

    let client = ReqwestClient::new(config.client_options()).context("failed to build HTTP client")?;
    let mirror = Mirror::new(Arc::new(client), config.mirror_options());
    tracing::info!(root = %mirror.layout().root().display(), "mirroring");

    let report = if names.is_empty() {
        mirror.run_catalog().await
    } else {
        mirror.run(names).await
    }
    .context("mirror run failed")?;

    tracing::info!(
        indexed = report.packages_indexed,
        elapsed = ?report.elapsed,
        "mirror complete"
    );
    Ok(())
}

async fn serve(config: &mut Config, args: ServeArgs) -> Result<()> {
    args.apply(config);
    pkgmirror_search::serve(config.bind, config.index_path())
        .await
        .context("search responder stopped")
}
