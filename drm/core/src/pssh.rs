use data_encoding::{BASE64, Encoding};

use crate::constants::WIDEVINE_PSSH_ENVELOPE_LEN;
use crate::error::PsshError;
use crate::types::SystemId;

/**
    Rewrite a provider PSSH payload into the form the packager expects.

    The provider wraps the Widevine `pssh` atom in a proprietary
    [`WIDEVINE_PSSH_ENVELOPE_LEN`]-byte envelope. For Widevine the payload is
    base64 decoded, the envelope is dropped and the remaining atom is base64
    encoded again. Payloads for every other system are returned untouched.

    `system_id` is the textual UUID as the provider reported it; anything
    that does not parse as a UUID is treated as a non-Widevine system.
*/
pub fn packager_pssh(system_id: &str, data: &str) -> Result<String, PsshError> {
    match SystemId::from_uuid(system_id) {
        Some(system) if system.is_widevine() => strip_envelope(system, data),
        _ => Ok(data.to_owned()),
    }
}

/**
    Standard padded base64 that skips line breaks, as providers wrap long
    PSSH values inside their XML.
*/
fn wrapped_base64() -> Result<Encoding, String> {
    let mut spec = BASE64.specification();
    spec.ignore.push_str("\r\n");
    spec.encoding().map_err(|e| e.to_string())
}

fn strip_envelope(system: SystemId, data: &str) -> Result<String, PsshError> {
    let invalid = |reason: String| PsshError::InvalidBase64 {
        system: system.to_name(),
        reason,
    };
    let bytes = wrapped_base64()
        .map_err(invalid)?
        .decode(data.as_bytes())
        .map_err(|e| invalid(e.to_string()))?;

    let atom = bytes
        .get(WIDEVINE_PSSH_ENVELOPE_LEN..)
        .ok_or(PsshError::TooShort {
            system: system.to_name(),
            len: bytes.len(),
            envelope: WIDEVINE_PSSH_ENVELOPE_LEN,
        })?;

    Ok(BASE64.encode(atom))
}
