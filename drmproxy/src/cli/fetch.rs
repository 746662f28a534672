use anyhow::Result;
use clap::Parser;
use drm_cpix::AssetKeyRequest;

use crate::keys::KeyService;

use super::ProviderArgs;

#[derive(Parser, Debug)]
pub struct FetchCommand {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Provider content ID of the asset
    pub content_id: String,

    /// Key ID as a hyphenated UUID
    pub key_id: String,
}

impl FetchCommand {
    pub async fn run(self) -> Result<()> {
        let key_service = self.provider.key_service()?;
        let req = AssetKeyRequest::new(self.content_id, self.key_id);

        let resp = key_service.content_key_from(&req).await?;
        println!("{}", serde_json::to_string_pretty(&resp)?);

        Ok(())
    }
}
