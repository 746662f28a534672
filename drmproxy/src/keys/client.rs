use std::time::Duration;

use async_trait::async_trait;
use drm_core::{PsshError, encode_key_id, packager_pssh};
use drm_cpix::{AssetKeyRequest, CpixDocument, CpixProfile};
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};

use super::{
    ContentKeyEntry, ContentKeyResponse, KeyService, KeyServiceError, Pssh, SetupError,
    UpstreamError,
};

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

const KEY_PATH_PREFIX: [&str; 4] = ["tkm", "v1", "cbsi", "contents"];
const KEY_PATH_SUFFIX: &str = "copyProtectionData";

/**
    Key service backed by a CPIX key provider.

    Every lookup is one fresh POST to
    `{endpoint}/tkm/v1/cbsi/contents/{content_id}/copyProtectionData`; there
    is no caching and no retrying. The HTTP client, and with it the
    connection pool, is shared by all lookups.
*/
#[derive(Debug, Clone)]
pub struct CpixKeyService {
    endpoint: Url,
    authorization: HeaderValue,
    profile: CpixProfile,
    client: reqwest::Client,
}

impl CpixKeyService {
    /**
        Create a key service with its own HTTP client whose timeout covers the
        whole exchange with the provider.
    */
    pub fn new(
        endpoint: Url,
        token: &str,
        profile: CpixProfile,
        timeout: Duration,
    ) -> Result<Self, SetupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(endpoint, token, profile, client)
    }

    pub fn with_client(
        endpoint: Url,
        token: &str,
        profile: CpixProfile,
        client: reqwest::Client,
    ) -> Result<Self, SetupError> {
        if endpoint.cannot_be_a_base() {
            return Err(SetupError::EndpointNotABase(endpoint.to_string()));
        }

        let mut authorization = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|_| SetupError::InvalidToken)?;
        authorization.set_sensitive(true);

        Ok(Self {
            endpoint,
            authorization,
            profile,
            client,
        })
    }

    pub fn profile(&self) -> CpixProfile {
        self.profile
    }

    fn key_url(&self, content_id: &str) -> Result<Url, KeyServiceError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| KeyServiceError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(KEY_PATH_PREFIX)
            .push(content_id)
            .push(KEY_PATH_SUFFIX);
        Ok(url)
    }

    async fn fetch_document(
        &self,
        req: &AssetKeyRequest,
        body: String,
    ) -> Result<CpixDocument, KeyServiceError> {
        let url = self.key_url(&req.content_id)?;

        let resp = self
            .client
            .post(url)
            .header(AUTHORIZATION, self.authorization.clone())
            .header(CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(UpstreamError::Transport)?;
        tracing::debug!(%status, len = bytes.len(), "key provider responded");

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }
            .into());
        }

        CpixDocument::parse(&bytes).map_err(KeyServiceError::ResponseParse)
    }
}

#[async_trait]
impl KeyService for CpixKeyService {
    async fn content_key_from(
        &self,
        req: &AssetKeyRequest,
    ) -> Result<ContentKeyResponse, KeyServiceError> {
        // Reject malformed key IDs before spending a provider round trip.
        let key_id = encode_key_id(&req.key_id)?;

        let body = self
            .profile
            .build_request(req)
            .map_err(KeyServiceError::RequestBuild)?;

        let doc = self.fetch_document(req, body).await?;

        Ok(assemble(self.profile, key_id, doc)?)
    }
}

/**
    Turn a parsed provider reply into the packager's response shape.
    Any PSSH failure fails the whole response.
*/
pub fn assemble(
    profile: CpixProfile,
    key_id: String,
    doc: CpixDocument,
) -> Result<ContentKeyResponse, PsshError> {
    let pssh = if profile.extracts_pssh() {
        doc.drm_systems
            .iter()
            .filter(|system| system.has_protection_data())
            .map(|system| {
                Ok(Pssh {
                    data: packager_pssh(&system.system_id, system.pssh_payload())?,
                    uuid: system.system_id.clone(),
                })
            })
            .collect::<Result<Vec<_>, PsshError>>()?
    } else {
        Vec::new()
    };

    Ok(ContentKeyResponse::single(ContentKeyEntry {
        pssh,
        key: doc.content_key.plain_value,
        key_id,
        iv: doc.content_key.explicit_iv,
    }))
}
