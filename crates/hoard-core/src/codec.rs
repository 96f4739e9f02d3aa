//! Document codec
//!
//! Encodes a document's JSON text for storage, optionally encrypting it with
//! a password. Encrypted payloads use the wire form
//!
//! ```text
//! ENCRYPTED:<base64 iv>:<base64 ciphertext>
//! ```
//!
//! The key is the SHA-256 digest of the password, so the same password
//! always decodes across sessions. Ciphertext is AES-256-CBC with PKCS#7
//! padding and a fresh random 16-byte IV per encode.
//!
//! CBC carries no integrity tag. A wrong password usually fails on padding,
//! but tampered or corrupted ciphertext can decrypt to garbage instead of
//! failing. The format is kept for compatibility with existing stores; do
//! not rely on it for tamper detection.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Prefix marking an encrypted payload
pub const ENCRYPTED_PREFIX: &str = "ENCRYPTED:";

/// IV length for AES-CBC
pub const IV_LEN: usize = 16;

/// Errors that can occur while decoding a payload
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Payload is encrypted but no password was supplied")]
    MissingPassword,

    #[error("Malformed encrypted payload: expected 2 segments, found {0}")]
    MalformedPayload(usize),

    #[error("Invalid base64 in encrypted payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid initialization vector length: {0} bytes")]
    InvalidIv(usize),

    #[error("Decryption failed (wrong password or corrupted data)")]
    Decrypt,

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Derive the 256-bit AES key for a password
pub fn derive_key(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

/// Check whether a payload carries the encrypted marker
pub fn is_encrypted(payload: &str) -> bool {
    payload.starts_with(ENCRYPTED_PREFIX)
}

/// Encode plaintext for storage
///
/// Without a password the plaintext is returned unchanged.
pub fn encode(plaintext: &str, password: Option<&str>) -> String {
    let Some(password) = password else {
        return plaintext.to_string();
    };

    let key = derive_key(password);
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    format!(
        "{}{}:{}",
        ENCRYPTED_PREFIX,
        STANDARD.encode(iv),
        STANDARD.encode(ciphertext)
    )
}

/// Decode a stored payload back to plaintext
///
/// Payloads without the encrypted marker are returned unchanged, whether or
/// not a password is given.
pub fn decode(payload: &str, password: Option<&str>) -> Result<String, CodecError> {
    let Some(body) = payload.strip_prefix(ENCRYPTED_PREFIX) else {
        return Ok(payload.to_string());
    };
    let password = password.ok_or(CodecError::MissingPassword)?;

    let segments: Vec<&str> = body.split(':').collect();
    let [iv_b64, ciphertext_b64] = segments.as_slice() else {
        return Err(CodecError::MalformedPayload(segments.len()));
    };

    let iv = STANDARD.decode(iv_b64)?;
    if iv.len() != IV_LEN {
        return Err(CodecError::InvalidIv(iv.len()));
    }
    let ciphertext = STANDARD.decode(ciphertext_b64)?;

    let key = derive_key(password);
    let plaintext = Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|_| CodecError::InvalidIv(iv.len()))?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CodecError::Decrypt)?;

    Ok(String::from_utf8(plaintext)?)
}
