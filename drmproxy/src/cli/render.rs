use anyhow::Result;
use clap::Parser;
use drm_cpix::{AssetKeyRequest, CpixProfile};

#[derive(Parser, Debug)]
pub struct RenderRequestCommand {
    /// CPIX request profile (`full` or `fair-play`)
    #[arg(long, default_value_t = CpixProfile::Full)]
    pub profile: CpixProfile,

    /// Provider content ID of the asset
    pub content_id: String,

    /// Key ID as a hyphenated UUID
    pub key_id: String,
}

impl RenderRequestCommand {
    pub fn run(self) -> Result<()> {
        let req = AssetKeyRequest::new(self.content_id, self.key_id);
        println!("{}", self.profile.build_request(&req)?);
        Ok(())
    }
}
