//! `oauth2-impersonator` HTTP service.

// std
use std::sync::Arc;
// crates.io
use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tokio::net::TcpListener;
// self
use oauth2_impersonator::{cli::Cli, obs, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();

	obs::install_subscriber(&cli.log).map_err(|e| eyre!("failed to install log subscriber: {e}"))?;

	let broker = Arc::new(cli.broker()?);
	let listener = TcpListener::bind(cli.listen).await?;

	server::serve(listener, server::router(broker)).await?;

	Ok(())
}
