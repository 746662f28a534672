mod constants;
mod error;
mod kid;
mod pssh;
mod types;

pub use self::constants::{
    CLEARKEY_SYSTEM_ID, FAIRPLAY_SYSTEM_ID, FAIRPLAY_SYSTEM_UUID, PLAYREADY_SYSTEM_ID,
    PLAYREADY_SYSTEM_UUID, WIDEVINE_PSSH_ENVELOPE_LEN, WIDEVINE_SYSTEM_ID, WIDEVINE_SYSTEM_UUID,
};
pub use self::error::{KeyIdError, ParseError, PsshError};
pub use self::kid::{ENCODED_KEY_ID_LEN, decode_key_id, encode_key_id};
pub use self::pssh::packager_pssh;
pub use self::types::SystemId;
