//! Key material generation: master secrets and salts

use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::SecretString;
use zeroize::Zeroize;

use crate::error::{TranscryptError, TranscryptResult};
use crate::SALT_SIZE;

/// Smallest accepted strength for [`generate_master_secret`].
pub const MIN_SECRET_BITS: usize = 12;

/// Generate a random 12-byte salt from the OS RNG.
pub fn generate_salt() -> TranscryptResult<[u8; SALT_SIZE]> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.try_fill_bytes(&mut salt).map_err(|e| {
        TranscryptError::KeyDerivationFailed(format!("failed to read random data for salt: {e}"))
    })?;
    Ok(salt)
}

/// Generate a fresh master secret of at least `bit_size` bits, hex-encoded.
///
/// The hex text itself is what callers pass back as the master secret.
pub fn generate_master_secret(bit_size: usize) -> TranscryptResult<SecretString> {
    if bit_size < MIN_SECRET_BITS {
        return Err(TranscryptError::InvalidBitSize {
            got: bit_size,
            min: MIN_SECRET_BITS,
        });
    }

    let mut bytes = vec![0u8; bit_size.div_ceil(8)];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        TranscryptError::KeyDerivationFailed(format!(
            "failed to read random data for master secret: {e}"
        ))
    })?;

    let encoded = hex::encode(&bytes);
    bytes.zeroize();
    Ok(SecretString::from(encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_salt_generation() {
        let s1 = generate_salt().unwrap();
        let s2 = generate_salt().unwrap();
        assert_ne!(s1, s2, "random salts must differ");
    }

    #[test]
    fn test_master_secret_length() {
        let secret = generate_master_secret(256).unwrap();
        assert_eq!(secret.expose_secret().len(), 64);

        // Rounded up to whole bytes
        let secret = generate_master_secret(12).unwrap();
        assert_eq!(secret.expose_secret().len(), 4);
    }

    #[test]
    fn test_master_secret_is_hex() {
        let secret = generate_master_secret(128).unwrap();
        assert!(hex::decode(secret.expose_secret()).is_ok());
    }

    #[test]
    fn test_master_secret_too_small() {
        let err = generate_master_secret(11).unwrap_err();
        assert!(
            matches!(err, TranscryptError::InvalidBitSize { got: 11, min: 12 }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_master_secrets_differ() {
        let a = generate_master_secret(256).unwrap();
        let b = generate_master_secret(256).unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }
}
