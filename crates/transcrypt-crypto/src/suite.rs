//! AEAD cipher suites an envelope can be sealed with

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// AEAD construction protecting the payload of an envelope.
///
/// The discriminant is the suite byte written as the first envelope segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CipherSuite {
    Aes256Gcm = 0,
    #[default]
    ChaCha20Poly1305 = 1,
}

impl CipherSuite {
    pub const ALL: [CipherSuite; 2] = [CipherSuite::Aes256Gcm, CipherSuite::ChaCha20Poly1305];

    /// Resolve a suite by its canonical name.
    ///
    /// Unrecognized names, including the empty string, fall back to
    /// ChaCha20-Poly1305. This is not an error.
    pub fn from_name(name: &str) -> Self {
        match name {
            "AES_256_GCM" => CipherSuite::Aes256Gcm,
            "CHACHA20_POLY1305" => CipherSuite::ChaCha20Poly1305,
            _ => CipherSuite::ChaCha20Poly1305,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CipherSuite::Aes256Gcm => "AES_256_GCM",
            CipherSuite::ChaCha20Poly1305 => "CHACHA20_POLY1305",
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Strict byte lookup. Only the stream engine uses this; envelope parsing
/// carries the raw byte through untouched.
impl TryFrom<u8> for CipherSuite {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(CipherSuite::Aes256Gcm),
            1 => Ok(CipherSuite::ChaCha20Poly1305),
            other => Err(other),
        }
    }
}

/// Serialized by name, e.g. `suite = "AES_256_GCM"` in a config file.
impl Serialize for CipherSuite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Unknown names deserialize to ChaCha20-Poly1305, as in [`CipherSuite::from_name`].
impl<'de> Deserialize<'de> for CipherSuite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(CipherSuite::from_name(&name))
    }
}

/// Free-function form of [`CipherSuite::from_name`].
pub fn suite_from_name(name: &str) -> CipherSuite {
    CipherSuite::from_name(name)
}
