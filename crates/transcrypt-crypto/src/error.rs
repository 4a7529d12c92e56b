use thiserror::Error;

use crate::stream::StreamError;

pub type TranscryptResult<T> = Result<T, TranscryptError>;

/// Every failure a caller can see from an encrypt or decrypt call.
///
/// String payloads name the failing stage.
#[derive(Debug, Error)]
pub enum TranscryptError {
    #[error("master secret is empty")]
    EmptyKey,

    #[error("data is empty")]
    EmptyData,

    #[error("invalid salt: {0}")]
    InvalidSalt(String),

    #[error("envelope does not have the shape suite:salt:ciphertext:tag")]
    InvalidEnvelopeShape,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("unknown type tag: {0}")]
    UnknownType(String),

    #[error("unsupported value type: {0}")]
    UnsupportedType(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(#[source] StreamError),

    #[error("decryption failed: {0}")]
    DecryptionFailed(#[source] StreamError),

    #[error("malformed plaintext: {0}")]
    MalformedPlaintext(String),

    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// An assembled envelope failed its own shape check. Indicates a bug.
    #[error("internal error: assembled envelope failed validation: {0}")]
    InternalAssemblyError(String),

    #[error("bit size must be at least {min}, got {got}")]
    InvalidBitSize { got: usize, min: usize },
}
