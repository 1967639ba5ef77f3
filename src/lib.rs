//! cryptkeeper - a personal encrypted journal
//!
//! Entries are composed in an external editor, encrypted with
//! AES-256-GCM under a key derived from the user's passphrase, and
//! persisted as `nonce || ciphertext` in `.ck` files.

pub mod editor;
pub mod error;
pub mod journal_ops;
pub mod journalcrypt;
pub mod passphrase;
