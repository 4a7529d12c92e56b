//! Streaming AEAD engine
//!
//! [`StreamEngine`] is the seam between envelope handling and the cipher. The
//! default implementation, [`DareEngine`], writes the DARE 2.0 package format:
//!
//! ```text
//! package = header (16 bytes) || AEAD ciphertext || tag (16 bytes)
//!
//! header[0]      version (0x20)
//! header[1]      cipher suite id
//! header[2..4]   payload length - 1 (u16, little-endian)
//! header[4..16]  nonce; top bit of header[4] marks the final package
//!
//! AAD            header[0..4]
//! AEAD nonce     header[4..16] with bytes 8..12 (u32 LE) XOR package sequence number
//! ```
//!
//! Every package except the last carries exactly 64 KiB of plaintext.
//! An empty plaintext produces an empty stream.

use std::io::{self, Read, Write};

use aes_gcm::Aes256Gcm;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use thiserror::Error;

use crate::kdf::DerivedKey;
use crate::suite::CipherSuite;
use crate::{SALT_SIZE, TAG_SIZE};

/// Package format version byte
pub const VERSION_20: u8 = 0x20;

/// Size of a package header
pub const HEADER_SIZE: usize = 16;

/// Maximum plaintext bytes per package (64 KiB)
pub const MAX_PAYLOAD_SIZE: usize = 1 << 16;

const FINAL_FLAG: u8 = 0x80;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("unsupported cipher suite id {0:#04x}")]
    UnsupportedSuite(u8),

    #[error("package sealed with suite {found:#04x}, expected {expected:#04x}")]
    SuiteMismatch { expected: u8, found: u8 },

    #[error("unsupported package version {0:#04x}")]
    UnsupportedVersion(u8),

    #[error("invalid package payload size")]
    InvalidPayloadSize,

    #[error("package nonce does not match the stream nonce")]
    NonceMismatch,

    #[error("authentication failed: wrong key or tampered data")]
    TagMismatch,

    #[error("stream ended before the final package")]
    UnexpectedEof,

    #[error("data found after the final package")]
    UnexpectedData,

    #[error("package sealing failed")]
    Seal,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Parameters for one stream pass.
#[derive(Debug, Clone, Copy)]
pub struct StreamParams<'a> {
    /// Raw suite byte; engines reject ids they do not know.
    pub suite_id: u8,
    pub key: &'a DerivedKey,
    pub nonce: &'a [u8; SALT_SIZE],
}

/// An authenticated streaming transform.
///
/// Both directions return the number of bytes written to `sink`.
pub trait StreamEngine {
    fn encrypt_stream(
        &self,
        sink: &mut dyn Write,
        source: &mut dyn Read,
        params: &StreamParams<'_>,
    ) -> Result<u64, StreamError>;

    fn decrypt_stream(
        &self,
        sink: &mut dyn Write,
        source: &mut dyn Read,
        params: &StreamParams<'_>,
    ) -> Result<u64, StreamError>;
}

/// DARE 2.0 engine over AES-256-GCM and ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, Default)]
pub struct DareEngine;

enum PackageCipher {
    Aes(Box<Aes256Gcm>),
    ChaCha(ChaCha20Poly1305),
}

impl PackageCipher {
    fn new(suite_id: u8, key: &DerivedKey) -> Result<Self, StreamError> {
        let suite = CipherSuite::try_from(suite_id).map_err(StreamError::UnsupportedSuite)?;
        Ok(match suite {
            CipherSuite::Aes256Gcm => {
                PackageCipher::Aes(Box::new(Aes256Gcm::new(key.as_bytes().into())))
            }
            CipherSuite::ChaCha20Poly1305 => {
                PackageCipher::ChaCha(ChaCha20Poly1305::new(key.as_bytes().into()))
            }
        })
    }

    fn seal(&self, nonce: &Nonce, payload: Payload<'_, '_>) -> Result<Vec<u8>, StreamError> {
        match self {
            PackageCipher::Aes(c) => c.encrypt(nonce, payload),
            PackageCipher::ChaCha(c) => c.encrypt(nonce, payload),
        }
        .map_err(|_| StreamError::Seal)
    }

    fn open(&self, nonce: &Nonce, payload: Payload<'_, '_>) -> Result<Vec<u8>, StreamError> {
        match self {
            PackageCipher::Aes(c) => c.decrypt(nonce, payload),
            PackageCipher::ChaCha(c) => c.decrypt(nonce, payload),
        }
        .map_err(|_| StreamError::TagMismatch)
    }
}

impl StreamEngine for DareEngine {
    fn encrypt_stream(
        &self,
        sink: &mut dyn Write,
        source: &mut dyn Read,
        params: &StreamParams<'_>,
    ) -> Result<u64, StreamError> {
        let cipher = PackageCipher::new(params.suite_id, params.key)?;

        let mut written = 0u64;
        let mut seq = 0u32;
        let mut current = read_payload(source)?;
        if current.is_empty() {
            return Ok(0);
        }

        loop {
            // One package of lookahead decides whether `current` is final.
            let next = read_payload(source)?;
            let last = next.is_empty();

            let header = package_header(params.suite_id, current.len(), params.nonce, last);
            let nonce = package_nonce(&header, seq);
            let sealed = cipher.seal(
                &nonce,
                Payload {
                    msg: &current,
                    aad: &header[..4],
                },
            )?;

            sink.write_all(&header)?;
            sink.write_all(&sealed)?;
            written += (HEADER_SIZE + sealed.len()) as u64;

            if last {
                break;
            }
            current = next;
            seq = seq.wrapping_add(1);
        }

        sink.flush()?;
        Ok(written)
    }

    fn decrypt_stream(
        &self,
        sink: &mut dyn Write,
        source: &mut dyn Read,
        params: &StreamParams<'_>,
    ) -> Result<u64, StreamError> {
        let cipher = PackageCipher::new(params.suite_id, params.key)?;

        let mut written = 0u64;
        let mut seq = 0u32;
        let mut header = [0u8; HEADER_SIZE];

        loop {
            let n = read_full(source, &mut header)?;
            if n == 0 {
                if seq == 0 {
                    // Empty stream: empty plaintext
                    break;
                }
                return Err(StreamError::UnexpectedEof);
            }
            if n < HEADER_SIZE {
                return Err(StreamError::UnexpectedEof);
            }

            if header[0] != VERSION_20 {
                return Err(StreamError::UnsupportedVersion(header[0]));
            }
            if header[1] != params.suite_id {
                return Err(StreamError::SuiteMismatch {
                    expected: params.suite_id,
                    found: header[1],
                });
            }

            let length = usize::from(u16::from_le_bytes([header[2], header[3]])) + 1;
            let last = header[4] & FINAL_FLAG == FINAL_FLAG;
            if !last && length != MAX_PAYLOAD_SIZE {
                return Err(StreamError::InvalidPayloadSize);
            }

            let expected = package_header(params.suite_id, length, params.nonce, last);
            if header[4..] != expected[4..] {
                return Err(StreamError::NonceMismatch);
            }

            let mut body = vec![0u8; length + TAG_SIZE];
            if read_full(source, &mut body)? != body.len() {
                return Err(StreamError::UnexpectedEof);
            }

            let nonce = package_nonce(&header, seq);
            let plaintext = cipher.open(
                &nonce,
                Payload {
                    msg: &body,
                    aad: &header[..4],
                },
            )?;
            sink.write_all(&plaintext)?;
            written += plaintext.len() as u64;
            seq = seq.wrapping_add(1);

            if last {
                let mut probe = [0u8; 1];
                if read_full(source, &mut probe)? != 0 {
                    return Err(StreamError::UnexpectedData);
                }
                break;
            }
        }

        sink.flush()?;
        Ok(written)
    }
}

fn package_header(
    suite_id: u8,
    payload_len: usize,
    nonce: &[u8; SALT_SIZE],
    last: bool,
) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0] = VERSION_20;
    header[1] = suite_id;
    // payload_len is in 1..=MAX_PAYLOAD_SIZE
    let encoded_len = (payload_len - 1) as u16;
    header[2..4].copy_from_slice(&encoded_len.to_le_bytes());
    header[4..].copy_from_slice(nonce);
    if last {
        header[4] |= FINAL_FLAG;
    } else {
        header[4] &= !FINAL_FLAG;
    }
    header
}

fn package_nonce(header: &[u8; HEADER_SIZE], seq: u32) -> Nonce {
    let mut nonce = [0u8; SALT_SIZE];
    nonce.copy_from_slice(&header[4..]);
    let counter = u32::from_le_bytes([nonce[8], nonce[9], nonce[10], nonce[11]]) ^ seq;
    nonce[8..].copy_from_slice(&counter.to_le_bytes());
    Nonce::from(nonce)
}

/// Read up to one package worth of plaintext.
fn read_payload(source: &mut dyn Read) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    Read::take(&mut *source, MAX_PAYLOAD_SIZE as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Fill `buf` unless the source ends first; returns the bytes read.
fn read_full(source: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
