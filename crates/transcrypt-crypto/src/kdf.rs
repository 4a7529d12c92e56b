//! Key derivation: HKDF-SHA256(master secret, salt) → per-operation key

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{TranscryptError, TranscryptResult};
use crate::keys::generate_salt;
use crate::{KEY_SIZE, SALT_SIZE};

/// A 256-bit symmetric key derived for exactly one encrypt or decrypt call.
///
/// Zeroized on drop.
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 256-bit key from the master secret and a 12-byte salt.
///
/// - `salt = Some(s)`: `s` must be at least 12 bytes; only the first 12 are used.
/// - `salt = None`: a fresh salt is drawn from the OS RNG.
///
/// Returns the key together with the salt that was actually used, which the
/// caller must record (it is also the AEAD nonce).
pub fn derive_key(
    master_secret: &[u8],
    salt: Option<&[u8]>,
) -> TranscryptResult<(DerivedKey, [u8; SALT_SIZE])> {
    if master_secret.is_empty() {
        return Err(TranscryptError::EmptyKey);
    }

    let salt = match salt {
        Some(s) => truncate_salt(s)?,
        None => generate_salt()?,
    };

    let hkdf = Hkdf::<Sha256>::new(Some(&salt[..]), master_secret);
    let mut okm = [0u8; KEY_SIZE];
    hkdf.expand(&[], &mut okm)
        .map_err(|e| TranscryptError::KeyDerivationFailed(format!("HKDF expand: {e}")))?;

    Ok((DerivedKey::from_bytes(okm), salt))
}

/// Take the first 12 bytes of a caller-supplied salt.
pub(crate) fn truncate_salt(salt: &[u8]) -> TranscryptResult<[u8; SALT_SIZE]> {
    match salt.get(..SALT_SIZE) {
        Some(head) => {
            let mut out = [0u8; SALT_SIZE];
            out.copy_from_slice(head);
            Ok(out)
        }
        None => Err(TranscryptError::InvalidSalt(format!(
            "salt needs to be at least {SALT_SIZE} bytes, got {}",
            salt.len()
        ))),
    }
}
