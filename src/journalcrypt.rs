//! Encryption/decryption using SHA-256 + AES-256-GCM
//!
//! This module implements passphrase-based encryption of journal entries:
//! - a single SHA-256 digest of the passphrase yields the 32-byte key
//! - AES-256-GCM provides authenticated encryption
//!
//! The binary format is:
//! - nonce: 12 bytes
//! - ciphertext: variable length (includes 16-byte GCM tag)
//!
//! There is no salt and no key stretching; the derivation must stay a bare
//! digest so that previously written journal files keep decrypting.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{CryptkeeperError, ErrorCategory, ErrorKind, Result};

/// Length of the AES-GCM nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the derived key in bytes
pub const KEY_LEN: usize = 32;

/// Message for any authentication failure. Wrong passphrase and
/// tampered/corrupted input must stay indistinguishable to the user.
const AUTH_FAILED_MSG: &str = "wrong passphrase, or corrupt or tampered-with journal";

/// Derive the 32-byte key from a passphrase.
///
/// Deterministic so that write and read agree. An empty passphrase is
/// accepted and yields a valid (but weak) key.
fn derive_key(passphrase: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&Sha256::digest(passphrase));
    key
}

/// Build the AES-256-GCM cipher for a passphrase.
fn build_cipher(passphrase: &[u8]) -> Result<Aes256Gcm> {
    let key = derive_key(passphrase);
    Aes256Gcm::new_from_slice(&key[..]).map_err(|e| {
        CryptkeeperError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::CipherFailure,
            format!("failed to construct cipher: {}", e),
        )
    })
}

/// Encrypt a journal entry with a passphrase using a fresh random nonce
///
/// Returns the binary format: nonce(12) + ciphertext-with-tag(variable).
pub fn encrypt_journal(plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    encrypt_journal_deterministic(plaintext, passphrase, &nonce)
}

/// Encrypt a journal entry using a caller-provided nonce
///
/// This function is ONLY for testing purposes to generate deterministic
/// output. NEVER use this in production - always use `encrypt_journal()`,
/// which generates a fresh random nonce. Reusing a nonce under the same
/// key breaks both confidentiality and integrity.
pub fn encrypt_journal_deterministic(
    plaintext: &[u8],
    passphrase: &[u8],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let cipher = build_cipher(passphrase)?;

    let sealed = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| {
            CryptkeeperError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                format!("encryption failed: {}", e),
            )
        })?;

    let mut output = Vec::with_capacity(NONCE_LEN + sealed.len());
    output.extend_from_slice(nonce);
    output.extend_from_slice(&sealed);

    Ok(output)
}

/// Decrypt a journal entry with a passphrase
///
/// The input must be at least one nonce long; anything shorter is rejected
/// before any cipher call is attempted.
pub fn decrypt_journal(encrypted: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    if encrypted.len() < NONCE_LEN {
        return Err(CryptkeeperError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedInput,
            "encrypted journal is shorter than a nonce; likely truncated or not a journal file",
        ));
    }

    let (nonce, sealed) = encrypted.split_at(NONCE_LEN);

    let cipher = build_cipher(passphrase)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| {
            CryptkeeperError::with_kind(
                ErrorCategory::User,
                ErrorKind::AuthenticationFailed,
                AUTH_FAILED_MSG,
            )
        })?;

    Ok(plaintext)
}
