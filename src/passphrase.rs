//! Passphrase reading

use std::io::{self, IsTerminal, Write};

use zeroize::Zeroizing;

use crate::error::{CryptkeeperError, ErrorCategory, ErrorKind, Result};

/// Trait for obtaining a passphrase from some source.
///
/// A passphrase is read at most once per write or read operation and is
/// never cached across operations. The returned bytes are wrapped in
/// `Zeroizing` so they are wiped from memory when dropped.
pub trait PassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Returns a fixed passphrase (backs the `-p` flag; also used in tests).
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<Vec<u8>>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: Vec<u8>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new((*self.passphrase).clone()))
    }
}

/// Reads the passphrase from the terminal with echo disabled.
pub struct TerminalPassphraseReader;

impl PassphraseReader for TerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(CryptkeeperError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "cannot prompt for passphrase - stdin is not a terminal; use --passphrase",
            ));
        }

        io::stderr()
            .write_all(b"Passphrase: ")
            .and_then(|_| io::stderr().flush())
            .map_err(|e| {
                CryptkeeperError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to write passphrase prompt",
                    e,
                )
            })?;

        // rpassword reads without echo but returns a String (UTF-8 only).
        let passphrase = rpassword::read_password().map_err(|e| {
            CryptkeeperError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                "failure reading passphrase",
                e,
            )
        })?;

        Ok(Zeroizing::new(passphrase.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_reader() {
        let mut reader = ConstantPassphraseReader::new(b"test123".to_vec());
        assert_eq!(&*reader.read_passphrase().unwrap(), b"test123");
        // Repeat reads yield the same value.
        assert_eq!(&*reader.read_passphrase().unwrap(), b"test123");
    }

    #[test]
    fn test_constant_reader_non_utf8() {
        let data = vec![0xff, 0xfe, 0x00, 0x01];
        let mut reader = ConstantPassphraseReader::new(data.clone());
        assert_eq!(&*reader.read_passphrase().unwrap(), &data[..]);
    }
}
