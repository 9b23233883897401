//! The opaque account-number cipher used at trust boundaries.
//!
//! Account numbers (and card PANs in the onboarding flows outside this
//! repository) cross the PSP/bank boundary as AES-256-GCM ciphertext with a
//! fresh random 96-bit nonce per call, encoded as base64 of `nonce ||
//! ciphertext`. Both sides derive the key from a shared secret via SHA-256.
//!
//! The protocol treats this purely as an `encrypt`/`decrypt` capability; the
//! coordinator never inspects ciphertext, the bank decrypts on arrival.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// AES-GCM nonce length in bytes (96 bits, the standard GCM nonce size).
const NONCE_LENGTH: usize = 12;

/// An AES-256-GCM cipher for opaque values crossing a trust boundary.
#[derive(Clone)]
pub struct AccountCipher {
    key: [u8; 32],
}

impl AccountCipher {
    /// Derive a cipher from a shared secret string.
    ///
    /// The key is the SHA-256 digest of the secret, so any non-empty string
    /// yields a full-strength 256-bit key.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        Self { key }
    }

    /// Encrypt a plaintext value.
    ///
    /// Every call draws a fresh random nonce, so encrypting the same value
    /// twice yields different ciphertexts.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EncryptFailed` if the AEAD operation fails.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| CryptoError::EncryptFailed)?;

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptFailed)?;

        let mut combined = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypt a value produced by [`Self::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::DecryptFailed` if the input is not valid base64,
    /// is too short to contain a nonce, fails authentication (tampered or
    /// wrong key), or does not decode to UTF-8.
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let combined = BASE64
            .decode(encoded)
            .map_err(|_| CryptoError::DecryptFailed)?;
        if combined.len() < NONCE_LENGTH {
            return Err(CryptoError::DecryptFailed);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LENGTH);
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| CryptoError::DecryptFailed)?;
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptFailed)
    }
}

impl std::fmt::Debug for AccountCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("AccountCipher").finish_non_exhaustive()
    }
}

/// Errors that can occur in the account-number cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Encryption failed.
    #[error("encryption failed")]
    EncryptFailed,

    /// Decryption failed: malformed input, authentication failure, or a
    /// key mismatch between the two sides.
    #[error("decryption failed")]
    DecryptFailed,
}

/// Constant-time string comparison for credential checks.
///
/// Compares the full length regardless of where the first mismatch occurs so
/// that API-key verification does not leak prefix length through timing.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
