use anyhow::Result;
use clap::Parser;

mod cli;
mod keys;
mod server;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Args::parse().run().await
}
