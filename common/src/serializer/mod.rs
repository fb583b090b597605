// Canonical binary codec shared by the simulated chain and the fast-forward engine.
//
// Integers are little-endian and fixed width, sequences carry a compact
// length prefix, enums carry a one byte tag. Encoding is canonical: decoding
// then re-encoding a value yields the same bytes.

mod compact;
mod defaults;
mod reader;
mod writer;

pub use compact::Compact;
pub use reader::{Reader, ReaderError};
pub use writer::Writer;

pub trait Serializer {
    fn write(&self, writer: &mut Writer);

    fn read(reader: &mut Reader) -> Result<Self, ReaderError>
    where
        Self: Sized;

    fn size(&self) -> usize {
        let mut bytes = Vec::new();
        let mut writer = Writer::new(&mut bytes);
        self.write(&mut writer);
        writer.total_write()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size());
        let mut writer = Writer::new(&mut bytes);
        self.write(&mut writer);
        bytes
    }

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    // Decode a value that must consume the whole buffer
    fn from_bytes(bytes: &[u8]) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let mut reader = Reader::new(bytes);
        let value = Self::read(&mut reader)?;
        if reader.size() != 0 {
            if log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "{} trailing bytes after decoding {} of {} bytes",
                    reader.size(),
                    reader.total_read(),
                    bytes.len()
                );
            }
            return Err(ReaderError::TrailingBytes(reader.size()));
        }
        Ok(value)
    }

    fn from_hex(hex: &str) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let bytes = hex::decode(hex).map_err(|_| ReaderError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }
}
