use thiserror::Error;

use super::{Compact, Serializer};
use crate::crypto::{Hash, HASH_SIZE};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    #[error("Invalid size: needed {needed} bytes, {left} left")]
    InvalidSize { needed: usize, left: usize },
    #[error("Invalid value")]
    InvalidValue,
    #[error("Invalid hex")]
    InvalidHex,
    #[error("Unknown tag {tag} for {kind}")]
    UnknownTag { kind: &'static str, tag: u8 },
    #[error("Unrecognized call encoding tag {0}")]
    UnrecognizedCallEncoding(u8),
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("Sequence length {0} exceeds the remaining input")]
    ExceedsMaxArraySize(usize),
}

// Cursor over an immutable byte slice
pub struct Reader<'a> {
    bytes: &'a [u8],
    total: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, total: 0 }
    }

    pub fn read_bytes_ref(&mut self, n: usize) -> Result<&'a [u8], ReaderError> {
        if n > self.size() {
            return Err(ReaderError::InvalidSize {
                needed: n,
                left: self.size(),
            });
        }

        let bytes = &self.bytes[self.total..self.total + n];
        self.total += n;
        Ok(bytes)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, ReaderError> {
        self.read_bytes_ref(n).map(<[u8]>::to_vec)
    }

    pub fn read_bytes_32(&mut self) -> Result<[u8; 32], ReaderError> {
        let bytes = self.read_bytes_ref(32)?;
        bytes.try_into().map_err(|_| ReaderError::InvalidValue)
    }

    pub fn read_hash(&mut self) -> Result<Hash, ReaderError> {
        let bytes = self.read_bytes_ref(HASH_SIZE)?;
        let bytes: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| ReaderError::InvalidValue)?;
        Ok(Hash::new(bytes))
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        Ok(self.read_bytes_ref(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, ReaderError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ReaderError::InvalidValue),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        let bytes = self.read_bytes_ref(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        let bytes = self.read_bytes_ref(4)?;
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| ReaderError::InvalidValue)?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        let bytes = self.read_bytes_ref(8)?;
        let bytes: [u8; 8] = bytes.try_into().map_err(|_| ReaderError::InvalidValue)?;
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_u128(&mut self) -> Result<u128, ReaderError> {
        let bytes = self.read_bytes_ref(16)?;
        let bytes: [u8; 16] = bytes.try_into().map_err(|_| ReaderError::InvalidValue)?;
        Ok(u128::from_le_bytes(bytes))
    }

    // Read a compact length prefix, rejecting lengths that can't fit in the input
    pub fn read_length(&mut self) -> Result<usize, ReaderError> {
        let len = Compact::read(self)?.0 as usize;
        if len > self.size() {
            return Err(ReaderError::ExceedsMaxArraySize(len));
        }
        Ok(len)
    }

    // Bytes left to read
    pub fn size(&self) -> usize {
        self.bytes.len() - self.total
    }

    pub fn total_read(&self) -> usize {
        self.total
    }
}
