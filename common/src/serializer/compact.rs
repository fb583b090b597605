use super::{Reader, ReaderError, Serializer, Writer};

// Variable-length unsigned integer, used for sequence lengths.
//
// The two low bits of the first byte select the mode:
// 0b00 single byte (< 2^6), 0b01 two bytes (< 2^14),
// 0b10 four bytes (< 2^30), 0b11 a four byte big-integer follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compact(pub u32);

const SINGLE_BYTE_MAX: u32 = (1 << 6) - 1;
const TWO_BYTES_MAX: u32 = (1 << 14) - 1;
const FOUR_BYTES_MAX: u32 = (1 << 30) - 1;

impl Serializer for Compact {
    fn write(&self, writer: &mut Writer) {
        let value = self.0;
        match value {
            0..=SINGLE_BYTE_MAX => writer.write_u8((value as u8) << 2),
            0..=TWO_BYTES_MAX => writer.write_u16(((value as u16) << 2) | 0b01),
            0..=FOUR_BYTES_MAX => writer.write_u32((value << 2) | 0b10),
            _ => {
                writer.write_u8(0b11);
                writer.write_u32(value);
            }
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let first = reader.read_u8()?;
        let value = match first & 0b11 {
            0b00 => (first >> 2) as u32,
            0b01 => {
                let second = reader.read_u8()?;
                let value = (u16::from_le_bytes([first, second]) >> 2) as u32;
                if value <= SINGLE_BYTE_MAX {
                    return Err(ReaderError::InvalidValue);
                }
                value
            }
            0b10 => {
                let rest = reader.read_bytes_ref(3)?;
                let value = u32::from_le_bytes([first, rest[0], rest[1], rest[2]]) >> 2;
                if value <= TWO_BYTES_MAX {
                    return Err(ReaderError::InvalidValue);
                }
                value
            }
            _ => {
                // Only the four byte big-integer form is valid for 32 bit lengths
                if first != 0b11 {
                    return Err(ReaderError::InvalidValue);
                }
                let value = reader.read_u32()?;
                if value <= FOUR_BYTES_MAX {
                    return Err(ReaderError::InvalidValue);
                }
                value
            }
        };

        Ok(Compact(value))
    }

    fn size(&self) -> usize {
        match self.0 {
            0..=SINGLE_BYTE_MAX => 1,
            0..=TWO_BYTES_MAX => 2,
            0..=FOUR_BYTES_MAX => 4,
            _ => 5,
        }
    }
}
