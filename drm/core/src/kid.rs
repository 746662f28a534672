use data_encoding::BASE64;
use uuid::Uuid;

use crate::error::KeyIdError;

/**
    Length of a padded base64 encoded 16-byte key ID.
*/
pub const ENCODED_KEY_ID_LEN: usize = 24;

/**
    Convert a textual UUID key ID into the padded standard base64 form
    expected by the packager, e.g. `86f13e28-eded-4e58-946f-67c51ddd09e4`
    becomes `hvE+KO3tTliUb2fFHd0J5A==`.

    The output is always exactly [`ENCODED_KEY_ID_LEN`] characters.
*/
pub fn encode_key_id(raw: &str) -> Result<String, KeyIdError> {
    let uuid = Uuid::parse_str(raw).map_err(|e| KeyIdError::InvalidUuid {
        value: raw.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(BASE64.encode(uuid.as_bytes()))
}

/**
    Inverse of [`encode_key_id`]: decode a padded base64 key ID back into
    its lowercase hyphenated UUID form.
*/
pub fn decode_key_id(encoded: &str) -> Result<String, KeyIdError> {
    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| KeyIdError::InvalidBase64 {
            value: encoded.to_owned(),
            reason: e.to_string(),
        })?;
    let bytes: [u8; 16] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| KeyIdError::InvalidLength(bytes.len()))?;
    Ok(Uuid::from_bytes(bytes).hyphenated().to_string())
}
