//! Envelope wire format
//!
//! ```text
//! <suite>:<salt>:<ciphertext>:<tag>
//!   suite       1 byte   → 2 hex chars
//!   salt       12 bytes  → 24 hex chars
//!   ciphertext  N bytes  → 2N hex chars (may be empty)
//!   tag         type tag name, e.g. "string" → 737472696e67
//! ```
//!
//! The suite byte is carried as-is. Whether it names a known suite is decided
//! by the stream engine when the ciphertext is opened.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::codec::TypeTag;
use crate::error::{TranscryptError, TranscryptResult};
use crate::SALT_SIZE;

const SEPARATOR: char = ':';

static ENVELOPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}:[0-9a-fA-F]{24}:[0-9a-fA-F]*:[0-9a-fA-F]*$")
        .expect("envelope pattern is a valid regex")
});

/// Shape check for an encoded envelope. Does not decode anything.
pub fn is_well_formed(encoded: &str) -> bool {
    ENVELOPE_PATTERN.is_match(encoded)
}

/// The four decoded fields of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw suite byte. Not range-checked here.
    pub suite_id: u8,
    /// HKDF salt, and the AEAD nonce of the ciphertext
    pub salt: [u8; SALT_SIZE],
    /// Output of the stream engine
    pub ciphertext: Vec<u8>,
    pub type_tag: TypeTag,
}

impl Envelope {
    /// Encode the fields and verify the result has the envelope shape.
    pub fn assemble(&self) -> TranscryptResult<String> {
        let encoded = [
            hex::encode([self.suite_id]),
            hex::encode(self.salt),
            hex::encode(&self.ciphertext),
            hex::encode(self.type_tag.name()),
        ]
        .join(":");

        if !is_well_formed(&encoded) {
            return Err(TranscryptError::InternalAssemblyError(format!(
                "suite byte {:#04x} with {} ciphertext bytes produced {} characters",
                self.suite_id,
                self.ciphertext.len(),
                encoded.len()
            )));
        }

        Ok(encoded)
    }

    /// Parse an encoded envelope.
    ///
    /// The shape is checked before any segment is hex-decoded.
    pub fn parse(encoded: &str) -> TranscryptResult<Self> {
        if encoded.is_empty() {
            return Err(TranscryptError::EmptyData);
        }
        if !is_well_formed(encoded) {
            return Err(TranscryptError::InvalidEnvelopeShape);
        }

        let segments: Vec<&str> = encoded.split(SEPARATOR).collect();
        let [suite, salt, ciphertext, tag] = segments.as_slice() else {
            return Err(TranscryptError::MalformedEnvelope(format!(
                "expected 4 segments, got {}",
                segments.len()
            )));
        };

        let suite = decode_segment("cipher suite", suite)?;
        let salt = decode_segment("salt", salt)?;
        let ciphertext = decode_segment("ciphertext", ciphertext)?;
        let tag = decode_segment("type tag", tag)?;

        let suite_id = match suite.as_slice() {
            [id] => *id,
            other => {
                return Err(TranscryptError::MalformedEnvelope(format!(
                    "cipher suite must be 1 byte, got {}",
                    other.len()
                )))
            }
        };
        let salt: [u8; SALT_SIZE] = salt.as_slice().try_into().map_err(|_| {
            TranscryptError::MalformedEnvelope(format!(
                "salt must be {SALT_SIZE} bytes, got {}",
                salt.len()
            ))
        })?;

        let tag_name = String::from_utf8(tag)
            .map_err(|e| TranscryptError::UnknownType(format!("non-UTF-8 type tag: {e}")))?;
        let type_tag = TypeTag::from_name(&tag_name)?;

        Ok(Self {
            suite_id,
            salt,
            ciphertext,
            type_tag,
        })
    }
}

impl FromStr for Envelope {
    type Err = TranscryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn decode_segment(name: &str, segment: &str) -> TranscryptResult<Vec<u8>> {
    hex::decode(segment)
        .map_err(|e| TranscryptError::MalformedEnvelope(format!("cannot decode {name}: {e}")))
}
