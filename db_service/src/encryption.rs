use cocoon::Error as CocoonError;
use std::fmt::Debug;
use std::{error::Error, fmt};

use cocoon::Cocoon;

#[derive(Debug)]
pub enum EncryptError {
    CocoonError(CocoonError),
    Utf8Error(std::string::FromUtf8Error),
}

impl fmt::Display for EncryptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncryptError::CocoonError(e) => write!(f, "Cocoon error: {e:?}"),
            EncryptError::Utf8Error(e) => write!(f, "UTF8 error: {e:?}"),
        }
    }
}

impl Error for EncryptError {}

impl From<CocoonError> for EncryptError {
    fn from(err: CocoonError) -> EncryptError {
        EncryptError::CocoonError(err)
    }
}

impl From<std::string::FromUtf8Error> for EncryptError {
    fn from(err: std::string::FromUtf8Error) -> EncryptError {
        EncryptError::Utf8Error(err)
    }
}

/// Seals settings values at rest with a key taken from `DB_ENCRYPTION_KEY`
#[derive(Clone)]
pub struct Encryptor {
    key: String,
}

impl Debug for Encryptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Encryptor").finish_non_exhaustive()
    }
}

impl Encryptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn encrypt(&self, value: &str) -> Result<Vec<u8>, EncryptError> {
        let mut cocoon = Cocoon::new(self.key.as_bytes());
        let encrypted = cocoon.wrap(value.as_bytes())?;
        Ok(encrypted)
    }

    pub fn decrypt(&self, value: &[u8]) -> Result<String, EncryptError> {
        let cocoon = Cocoon::new(self.key.as_bytes());
        let decrypted = cocoon.unwrap(value)?;
        let decrypted = String::from_utf8(decrypted)?;
        Ok(decrypted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_with_same_key() {
        let encryptor = Encryptor::new("test-key");
        let sealed = encryptor.encrypt("xkeysib-123").unwrap();
        assert_ne!(sealed, b"xkeysib-123".to_vec());
        assert_eq!(encryptor.decrypt(&sealed).unwrap(), "xkeysib-123");
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = Encryptor::new("test-key").encrypt("secret").unwrap();
        let err = Encryptor::new("other-key").decrypt(&sealed).unwrap_err();
        assert!(matches!(err, EncryptError::CocoonError(_)));
    }
}
