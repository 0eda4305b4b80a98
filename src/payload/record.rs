//! The plaintext record: optional filename plus payload bytes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Longest filename accepted, in UTF-8 bytes.
pub const MAX_FILENAME_LEN: usize = 65_535;

/// Default filename attached to text secrets.
pub const TEXT_FILENAME: &str = "secret.txt";

/// Serialized size of everything in a record except filename and data bytes:
/// option tag (1) + filename length (8, only when present) + data length (8).
const RECORD_FIXED_LEN: usize = 1 + 8;
const FILENAME_PREFIX_LEN: usize = 8;

/// Secret to hide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Original filename, if the secret came from a file.
    pub filename: Option<String>,
    /// Raw payload bytes.
    pub data: Vec<u8>,
}

impl Secret {
    /// Secret from raw bytes with an optional filename.
    pub fn new(data: Vec<u8>, filename: Option<String>) -> Self {
        Self { filename, data }
    }

    /// Secret from UTF-8 text, labelled `secret.txt`.
    pub fn text(text: &str) -> Self {
        Self {
            filename: Some(TEXT_FILENAME.to_string()),
            data: text.as_bytes().to_vec(),
        }
    }

    /// Secret from file contents.
    pub fn file(data: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            data,
        }
    }

    /// Check that the secret can be framed.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.filename {
            if name.len() > MAX_FILENAME_LEN {
                return Err(Error::InvalidPayload(format!(
                    "filename is {} bytes, limit is {}",
                    name.len(),
                    MAX_FILENAME_LEN
                )));
            }
        }
        Ok(())
    }

    /// Serialize with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let secret: Secret =
            bincode::deserialize(data).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(secret)
    }
}

/// Serialized length of a record holding `data_len` bytes and a filename of
/// `filename_len` bytes (`None` for no filename).
pub fn record_len(data_len: usize, filename_len: Option<usize>) -> usize {
    let name = filename_len.map_or(0, |n| FILENAME_PREFIX_LEN + n);
    RECORD_FIXED_LEN + name + data_len
}
