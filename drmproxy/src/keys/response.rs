use serde::{Deserialize, Serialize};

/**
    Key information in the shape the packager's key-server integration
    reads: a JSON array with a single element.

    ```json
    [{"pssh":[{"data":"...","uuid":"..."}],"key":"...","key_id":"...","iv":"..."}]
    ```
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKeyResponse(pub Vec<ContentKeyEntry>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentKeyEntry {
    /**
        One entry per DRM system that carried protection data, in provider order.
    */
    pub pssh: Vec<Pssh>,
    /**
        Content key as the provider sent it.
    */
    pub key: String,
    /**
        Padded base64 of the 16 key ID bytes, always 24 characters.
    */
    pub key_id: String,
    pub iv: String,
}

/**
    PSSH data for one DRM system.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pssh {
    pub data: String,
    pub uuid: String,
}

impl ContentKeyResponse {
    pub fn single(entry: ContentKeyEntry) -> Self {
        Self(vec![entry])
    }
}
