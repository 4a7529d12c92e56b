//! transcrypt-crypto: text-safe authenticated envelopes for scalar values
//!
//! A value (text or 64-bit integer) is serialized, encrypted and packed into a
//! single self-describing string that can live in config files or env vars.
//!
//! Pipeline:
//! ```text
//! value → type codec → hex → AEAD stream (key = HKDF-SHA256(secret, salt), nonce = salt) → envelope
//! ```
//!
//! Envelope layout (every segment hex-encoded, joined by `:`):
//! ```text
//! <suite byte>:<12-byte salt>:<ciphertext>:<type tag>
//! 00:73616c7473616c7473616c74:20001500...:737472696e67
//! ```

pub mod codec;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod stream;
pub mod suite;
pub mod transcrypter;

pub use codec::{TypeTag, Value};
pub use envelope::{is_well_formed, Envelope};
pub use error::{TranscryptError, TranscryptResult};
pub use kdf::{derive_key, DerivedKey};
pub use keys::{generate_master_secret, generate_salt};
pub use stream::{DareEngine, StreamEngine, StreamError, StreamParams};
pub use suite::{suite_from_name, CipherSuite};
pub use transcrypter::{decrypt, encrypt, Transcrypter};

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of a salt in bytes. The salt is also the AEAD nonce (96-bit).
pub const SALT_SIZE: usize = 12;

/// Size of an AEAD authentication tag
pub const TAG_SIZE: usize = 16;
