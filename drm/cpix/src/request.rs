use core::fmt;
use core::str::FromStr;

use drm_core::ParseError;

use crate::error::CpixResult;
use crate::template::Template;

/**
    Identifies one content key of one asset at the key provider.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKeyRequest {
    /**
        Provider-defined asset identifier, treated as opaque.
    */
    pub content_id: String,
    /**
        Key ID as a hyphenated UUID.
    */
    pub key_id: String,
}

impl AssetKeyRequest {
    pub fn new(content_id: impl Into<String>, key_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            key_id: key_id.into(),
        }
    }
}

/**
    Request shape sent to the key provider.

    The profile is chosen once at startup for the whole server; it decides
    which DRM systems the provider is asked about and whether PSSH data is
    extracted from the reply.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CpixProfile {
    /**
        FairPlay, PlayReady and Widevine, with PSSH extraction.
    */
    #[default]
    Full,
    /**
        FairPlay only. PSSH data is never extracted.
    */
    FairPlay,
}

impl CpixProfile {
    pub const fn template(self) -> Template<'static> {
        match self {
            Self::Full => Template::new(FULL_TEMPLATE),
            Self::FairPlay => Template::new(FAIRPLAY_TEMPLATE),
        }
    }

    /**
        Whether DRM system entries of the reply are turned into PSSH output.
    */
    pub const fn extracts_pssh(self) -> bool {
        matches!(self, Self::Full)
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::FairPlay => "fair-play",
        }
    }

    /**
        Render the CPIX request body for `req` with this profile's template.
    */
    pub fn build_request(self, req: &AssetKeyRequest) -> CpixResult<String> {
        self.template().render(req)
    }
}

impl fmt::Display for CpixProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

impl FromStr for CpixProfile {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "fair-play" | "fairplay" => Ok(Self::FairPlay),
            _ => Err(ParseError {
                kind: "CPIX profile",
                value: s.to_owned(),
            }),
        }
    }
}

const FULL_TEMPLATE: &str = r#"<cpix:CPIX contentId="{{content_id}}" xmlns:cpix="urn:dashif:org:cpix" xmlns:pskc="urn:ietf:params:xml:ns:keyprov:pskc" xmlns:speke="urn:aws:amazon:com:speke">
    <cpix:ContentKeyList>
        <cpix:ContentKey kid="{{key_id}}">
        </cpix:ContentKey>
    </cpix:ContentKeyList>
    <cpix:DRMSystemList>
        <cpix:DRMSystem systemId="94ce86fb-07ff-4f43-adb8-93d2fa968ca2" kid="{{key_id}}"/>
        <cpix:DRMSystem systemId="9a04f079-9840-4286-ab92-e65be0885f95" kid="{{key_id}}"/>
        <cpix:DRMSystem systemId="edef8ba9-79d6-4ace-a3c8-27dcd51d21ed" kid="{{key_id}}"/>
    </cpix:DRMSystemList>
</cpix:CPIX>"#;

const FAIRPLAY_TEMPLATE: &str = r#"<cpix:CPIX contentId="{{content_id}}" xmlns:cpix="urn:dashif:org:cpix" xmlns:pskc="urn:ietf:params:xml:ns:keyprov:pskc" xmlns:speke="urn:aws:amazon:com:speke">
    <cpix:ContentKeyList>
        <cpix:ContentKey kid="{{key_id}}">
        </cpix:ContentKey>
    </cpix:ContentKeyList>
    <cpix:DRMSystemList>
        <cpix:DRMSystem systemId="94ce86fb-07ff-4f43-adb8-93d2fa968ca2" kid="{{key_id}}"/>
    </cpix:DRMSystemList>
</cpix:CPIX>"#;
