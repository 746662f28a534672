use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use drm_cpix::CpixProfile;
use reqwest::Url;
use tracing_subscriber::EnvFilter;

use crate::keys::{CpixKeyService, DEFAULT_UPSTREAM_TIMEOUT};

mod fetch;
mod render;
mod serve;

pub use fetch::FetchCommand;
pub use render::RenderRequestCommand;
pub use serve::ServeCommand;

#[derive(Parser, Debug)]
#[command(name = "drmproxy")]
#[command(about = "Translates packager key requests into CPIX key provider calls")]
pub struct Args {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP key gateway
    Serve(ServeCommand),
    /// Look up one content key and print the packager JSON
    Fetch(FetchCommand),
    /// Print the CPIX request body that would be sent for an asset
    RenderRequest(RenderRequestCommand),
}

impl Args {
    pub async fn run(self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(&self.log_level)),
            )
            .init();

        match self.command {
            Command::Serve(cmd) => cmd.run().await,
            Command::Fetch(cmd) => cmd.run().await,
            Command::RenderRequest(cmd) => cmd.run(),
        }
    }
}

/**
    Key provider connection settings shared by the commands that talk to it.
*/
#[derive(ClapArgs, Debug, Clone)]
pub struct ProviderArgs {
    /// Key provider base URL
    #[arg(long, env = "IRDETO_ENDPOINT")]
    pub endpoint: Url,

    /// Token sent as `Authorization: Basic <token>`
    #[arg(long, env = "IRDETO_AUTH_TOKEN", hide_env_values = true)]
    pub token: String,

    /// CPIX request profile (`full` or `fair-play`)
    #[arg(long, env = "DRM_PROXY_PROFILE", default_value_t = CpixProfile::Full)]
    pub profile: CpixProfile,

    /// Timeout in seconds for the whole exchange with the provider
    #[arg(long, env = "DRM_PROXY_UPSTREAM_TIMEOUT", default_value_t = DEFAULT_UPSTREAM_TIMEOUT.as_secs())]
    pub upstream_timeout: u64,
}

impl ProviderArgs {
    pub fn key_service(&self) -> Result<CpixKeyService> {
        CpixKeyService::new(
            self.endpoint.clone(),
            &self.token,
            self.profile,
            Duration::from_secs(self.upstream_timeout),
        )
        .with_context(|| format!("setting up key service for {}", self.endpoint))
    }
}
