//! Type-preserving serialization of scalar values
//!
//! Canonical byte forms:
//! ```text
//! Int(i64)       → 8 bytes, big-endian two's complement   (tag "int")
//! String(String) → raw UTF-8 bytes                        (tag "string")
//! ```
//! The bytes are hex-encoded before they reach the cipher, and the tag travels
//! in the fourth envelope segment.

use std::str::FromStr;

use crate::error::{TranscryptError, TranscryptResult};

/// Size of the canonical integer encoding
const INT_SIZE: usize = 8;

/// How decrypted bytes are reinterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Int,
}

impl TypeTag {
    /// Wire name stored in the envelope.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Int => "int",
        }
    }

    pub fn from_name(name: &str) -> TranscryptResult<Self> {
        match name {
            "string" => Ok(TypeTag::String),
            "int" => Ok(TypeTag::Int),
            other => Err(TranscryptError::UnknownType(other.to_string())),
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = TranscryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A scalar that can be sealed into an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    String(String),
    Int(i64),
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::String(_) => TypeTag::String,
            Value::Int(_) => TypeTag::Int,
        }
    }

    /// Build a value from a kind name and its textual form.
    ///
    /// Kinds outside the supported set, and text that does not fit the
    /// requested kind, fail with [`TranscryptError::UnsupportedType`].
    pub fn parse(kind: &str, raw: &str) -> TranscryptResult<Self> {
        match kind {
            "string" => Ok(Value::String(raw.to_string())),
            "int" => raw.trim().parse::<i64>().map(Value::Int).map_err(|e| {
                TranscryptError::UnsupportedType(format!("{raw:?} is not a 64-bit integer: {e}"))
            }),
            other => Err(TranscryptError::UnsupportedType(format!(
                "kind {other:?} (supported: string, int)"
            ))),
        }
    }

    /// Canonical byte form of the value.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::String(s) => s.as_bytes().to_vec(),
            Value::Int(i) => i.to_be_bytes().to_vec(),
        }
    }

    /// Hex-encoded canonical bytes plus the tag to store alongside them.
    pub fn encode(&self) -> (String, TypeTag) {
        (hex::encode(self.to_bytes()), self.type_tag())
    }

    /// Reinterpret raw bytes according to `tag`.
    pub fn decode(bytes: &[u8], tag: TypeTag) -> TranscryptResult<Self> {
        match tag {
            TypeTag::String => std::str::from_utf8(bytes)
                .map(|s| Value::String(s.to_string()))
                .map_err(|e| {
                    TranscryptError::MalformedPlaintext(format!("string value is not UTF-8: {e}"))
                }),
            TypeTag::Int => {
                let raw: [u8; INT_SIZE] = bytes.try_into().map_err(|_| {
                    TranscryptError::MalformedPlaintext(format!(
                        "int value needs {INT_SIZE} bytes, got {}",
                        bytes.len()
                    ))
                })?;
                Ok(Value::Int(i64::from_be_bytes(raw)))
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(_) => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl TryFrom<u64> for Value {
    type Error = TranscryptError;

    fn try_from(u: u64) -> Result<Self, Self::Error> {
        i64::try_from(u).map(Value::Int).map_err(|_| {
            TranscryptError::UnsupportedType(format!("{u} does not fit a signed 64-bit integer"))
        })
    }
}
