use hex_literal::hex;

/**
    Widevine DRM System ID: `edef8ba9-79d6-4ace-a3c8-27dcd51d21ed`
*/
pub const WIDEVINE_SYSTEM_ID: [u8; 16] = hex!("edef8ba9 79d6 4ace a3c8 27dcd51d21ed");

/**
    PlayReady DRM System ID: `9a04f079-9840-4286-ab92-e65be0885f95`
*/
pub const PLAYREADY_SYSTEM_ID: [u8; 16] = hex!("9a04f079 9840 4286 ab92 e65be0885f95");

/**
    Apple FairPlay DRM System ID: `94ce86fb-07ff-4f43-adb8-93d2fa968ca2`
*/
pub const FAIRPLAY_SYSTEM_ID: [u8; 16] = hex!("94ce86fb 07ff 4f43 adb8 93d2fa968ca2");

/**
    W3C ClearKey System ID: `1077efec-c0b2-4d02-ace3-3c1e52e2fb4b`
*/
pub const CLEARKEY_SYSTEM_ID: [u8; 16] = hex!("1077efec c0b2 4d02 ace3 3c1e52e2fb4b");

/*
    Canonical textual forms. Players and packagers match on these exact
    strings, so they are spelled out rather than formatted at runtime.
*/

pub const WIDEVINE_SYSTEM_UUID: &str = "edef8ba9-79d6-4ace-a3c8-27dcd51d21ed";
pub const PLAYREADY_SYSTEM_UUID: &str = "9a04f079-9840-4286-ab92-e65be0885f95";
pub const FAIRPLAY_SYSTEM_UUID: &str = "94ce86fb-07ff-4f43-adb8-93d2fa968ca2";

/**
    Size of the proprietary envelope the key provider puts in front of the
    Widevine `pssh` atom.
*/
pub const WIDEVINE_PSSH_ENVELOPE_LEN: usize = 32;
