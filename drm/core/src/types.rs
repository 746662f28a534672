use core::fmt;
use core::str::FromStr;

use uuid::Uuid;

use crate::constants::*;
use crate::error::ParseError;

/**
    DRM content protection system identifier.

    Recognizes the major DRM systems by their DASH-IF registered UUIDs.
    Unrecognized system IDs are captured in the `Unknown` variant.

    Reference: <https://dashif.org/identifiers/content_protection/>
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemId {
    Widevine,
    PlayReady,
    FairPlay,
    ClearKey,
    Unknown([u8; 16]),
}

impl SystemId {
    /**
        Identify a DRM system from its 16-byte UUID.
    */
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        match bytes {
            WIDEVINE_SYSTEM_ID => Self::Widevine,
            PLAYREADY_SYSTEM_ID => Self::PlayReady,
            FAIRPLAY_SYSTEM_ID => Self::FairPlay,
            CLEARKEY_SYSTEM_ID => Self::ClearKey,
            other => Self::Unknown(other),
        }
    }

    /**
        Return the raw 16-byte UUID for this system.
    */
    pub const fn to_bytes(self) -> [u8; 16] {
        match self {
            Self::Widevine => WIDEVINE_SYSTEM_ID,
            Self::PlayReady => PLAYREADY_SYSTEM_ID,
            Self::FairPlay => FAIRPLAY_SYSTEM_ID,
            Self::ClearKey => CLEARKEY_SYSTEM_ID,
            Self::Unknown(bytes) => bytes,
        }
    }

    /**
        Human-readable name for this system.
    */
    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Widevine => "Widevine",
            Self::PlayReady => "PlayReady",
            Self::FairPlay => "FairPlay",
            Self::ClearKey => "ClearKey",
            Self::Unknown(_) => "Unknown",
        }
    }

    /**
        Parse a UUID string into a `SystemId`.

        Accepts hyphenated (`edef8ba9-79d6-4ace-a3c8-27dcd51d21ed`) and
        plain (`edef8ba979d64acea3c827dcd51d21ed`) formats. Hex digits are
        case-insensitive.
    */
    pub fn from_uuid(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim())
            .ok()
            .map(|uuid| Self::from_bytes(uuid.into_bytes()))
    }

    /**
        Format as a lowercase hyphenated UUID string.
    */
    pub fn to_uuid(self) -> String {
        Uuid::from_bytes(self.to_bytes()).hyphenated().to_string()
    }

    pub const fn is_widevine(self) -> bool {
        matches!(self, Self::Widevine)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_name(), self.to_uuid())
    }
}

impl FromStr for SystemId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uuid(s).ok_or_else(|| ParseError {
            kind: "system ID",
            value: s.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn known_systems_from_uuid() {
        assert_eq!(SystemId::from_uuid(WIDEVINE_SYSTEM_UUID), Some(SystemId::Widevine));
        assert_eq!(SystemId::from_uuid(PLAYREADY_SYSTEM_UUID), Some(SystemId::PlayReady));
        assert_eq!(SystemId::from_uuid(FAIRPLAY_SYSTEM_UUID), Some(SystemId::FairPlay));
    }

    #[test]
    fn from_uuid_is_case_insensitive() {
        let upper = WIDEVINE_SYSTEM_UUID.to_ascii_uppercase();
        assert_eq!(SystemId::from_uuid(&upper), Some(SystemId::Widevine));
    }

    #[test]
    fn from_uuid_accepts_plain_hex() {
        assert_eq!(
            SystemId::from_uuid("edef8ba979d64acea3c827dcd51d21ed"),
            Some(SystemId::Widevine)
        );
    }

    #[test]
    fn unknown_system_round_trips() {
        let bytes = hex!("00112233445566778899aabbccddeeff");
        let id = SystemId::from_uuid("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        assert!(matches!(id, SystemId::Unknown(_)));
        assert_eq!(id.to_bytes(), bytes);
        assert_eq!(id.to_uuid(), "00112233-4455-6677-8899-aabbccddeeff");
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(SystemId::from_uuid("widevine"), None);
        let err = "widevine".parse::<SystemId>().unwrap_err();
        assert_eq!(err.to_string(), "unknown system ID 'widevine'");
    }

    #[test]
    fn display_includes_name_and_uuid() {
        assert_eq!(
            SystemId::Widevine.to_string(),
            "Widevine (edef8ba9-79d6-4ace-a3c8-27dcd51d21ed)"
        );
    }
}
