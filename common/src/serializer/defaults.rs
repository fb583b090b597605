use super::{Reader, ReaderError, Serializer, Writer};

impl Serializer for u8 {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(*self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_u8()
    }

    fn size(&self) -> usize {
        1
    }
}

impl Serializer for bool {
    fn write(&self, writer: &mut Writer) {
        writer.write_bool(*self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_bool()
    }

    fn size(&self) -> usize {
        1
    }
}

impl Serializer for u16 {
    fn write(&self, writer: &mut Writer) {
        writer.write_u16(*self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_u16()
    }

    fn size(&self) -> usize {
        2
    }
}

impl Serializer for u32 {
    fn write(&self, writer: &mut Writer) {
        writer.write_u32(*self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_u32()
    }

    fn size(&self) -> usize {
        4
    }
}

impl Serializer for u64 {
    fn write(&self, writer: &mut Writer) {
        writer.write_u64(*self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_u64()
    }

    fn size(&self) -> usize {
        8
    }
}

impl Serializer for u128 {
    fn write(&self, writer: &mut Writer) {
        writer.write_u128(*self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_u128()
    }

    fn size(&self) -> usize {
        16
    }
}

impl Serializer for [u8; 32] {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_bytes_32()
    }

    fn size(&self) -> usize {
        32
    }
}

impl<T: Serializer> Serializer for Option<T> {
    fn write(&self, writer: &mut Writer) {
        match self {
            Some(value) => {
                writer.write_u8(1);
                value.write(writer);
            }
            None => writer.write_u8(0),
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        match reader.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::read(reader)?)),
            tag => Err(ReaderError::UnknownTag {
                kind: "Option",
                tag,
            }),
        }
    }

    fn size(&self) -> usize {
        1 + self.as_ref().map_or(0, Serializer::size)
    }
}

impl<T: Serializer> Serializer for Vec<T> {
    fn write(&self, writer: &mut Writer) {
        writer.write_length(self.len());
        for item in self {
            item.write(writer);
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let len = reader.read_length()?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(T::read(reader)?);
        }
        Ok(values)
    }

    fn size(&self) -> usize {
        super::Compact(self.len() as u32).size() + self.iter().map(Serializer::size).sum::<usize>()
    }
}

impl<A: Serializer, B: Serializer> Serializer for (A, B) {
    fn write(&self, writer: &mut Writer) {
        self.0.write(writer);
        self.1.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok((A::read(reader)?, B::read(reader)?))
    }

    fn size(&self) -> usize {
        self.0.size() + self.1.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_little_endian() {
        assert_eq!(0x0102u16.to_bytes(), vec![0x02, 0x01]);
        assert_eq!(7u32.to_bytes(), vec![7, 0, 0, 0]);
        assert_eq!(1u128.to_bytes().len(), 16);
    }

    #[test]
    fn test_vec_of_options_keeps_holes() {
        let value: Vec<Option<u32>> = vec![Some(1), None, Some(3)];
        let bytes = value.to_bytes();
        assert_eq!(bytes.len(), value.size());
        assert_eq!(Vec::<Option<u32>>::from_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        assert_eq!(
            u32::from_bytes(&[1, 0, 0, 0, 9]),
            Err(ReaderError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(
            u64::from_bytes(&[1, 2, 3]),
            Err(ReaderError::InvalidSize { needed: 8, left: 3 })
        );
    }

    #[test]
    fn test_oversized_length_prefix() {
        // Claims 10 elements with only 2 bytes of payload
        let bytes = [10 << 2, 0, 0];
        assert_eq!(
            Vec::<u8>::from_bytes(&bytes),
            Err(ReaderError::ExceedsMaxArraySize(10))
        );
    }
}
