// CallDescriptor - how a deferred call is referenced by a scheduled task

use serde::{Deserialize, Serialize};

use crate::{
    crypto::{hash, Hash},
    serializer::*,
};

/// A reference to a deferred call, in one of the three encodings the
/// scheduler understands.
///
/// Two descriptors denote the same call iff their [`content_hash`] is equal,
/// whatever the variant.
///
/// [`content_hash`]: CallDescriptor::content_hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDescriptor {
    /// Hash-only reference, the call length is resolved from the preimage
    /// request status
    Legacy { hash: Hash },
    /// The encoded call itself
    Inline(#[serde(with = "hex_bytes")] Vec<u8>),
    /// Content-addressed reference to a noted preimage
    Lookup { hash: Hash, len: u32 },
}

impl CallDescriptor {
    /// Wrap an encoded call inline
    pub fn inline(bytes: Vec<u8>) -> Self {
        CallDescriptor::Inline(bytes)
    }

    /// Reference an encoded call by its preimage
    pub fn lookup(bytes: &[u8]) -> Self {
        CallDescriptor::Lookup {
            hash: hash(bytes),
            len: bytes.len() as u32,
        }
    }

    /// The hash identifying the underlying call across all encodings
    pub fn content_hash(&self) -> Hash {
        match self {
            CallDescriptor::Inline(bytes) => hash(bytes),
            CallDescriptor::Lookup { hash, .. } | CallDescriptor::Legacy { hash } => hash.clone(),
        }
    }

    /// Whether the call can be dispatched without a preimage lookup
    pub fn is_inline(&self) -> bool {
        matches!(self, CallDescriptor::Inline(_))
    }

    /// Length of the call when it is known without a lookup
    pub fn len(&self) -> Option<u32> {
        match self {
            CallDescriptor::Inline(bytes) => Some(bytes.len() as u32),
            CallDescriptor::Lookup { len, .. } => Some(*len),
            CallDescriptor::Legacy { .. } => None,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            CallDescriptor::Legacy { .. } => 0,
            CallDescriptor::Inline(_) => 1,
            CallDescriptor::Lookup { .. } => 2,
        }
    }

    /// Whether both descriptors reference the same call
    pub fn same_call(&self, other: &CallDescriptor) -> bool {
        self.content_hash() == other.content_hash()
    }
}

impl Serializer for CallDescriptor {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let tag = reader.read_u8()?;
        match tag {
            0 => Ok(CallDescriptor::Legacy {
                hash: Hash::read(reader)?,
            }),
            1 => Ok(CallDescriptor::Inline(Vec::read(reader)?)),
            2 => Ok(CallDescriptor::Lookup {
                hash: Hash::read(reader)?,
                len: u32::read(reader)?,
            }),
            _ => Err(ReaderError::UnrecognizedCallEncoding(tag)),
        }
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_u8(self.id());
        match self {
            CallDescriptor::Legacy { hash } => hash.write(writer),
            CallDescriptor::Inline(bytes) => bytes.write(writer),
            CallDescriptor::Lookup { hash, len } => {
                hash.write(writer);
                len.write(writer);
            }
        }
    }

    fn size(&self) -> usize {
        1 + match self {
            CallDescriptor::Legacy { hash } => hash.size(),
            CallDescriptor::Inline(bytes) => bytes.size(),
            CallDescriptor::Lookup { hash, len } => hash.size() + len.size(),
        }
    }
}

mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_inline_and_lookup_share_content_hash() {
        let call = b"\x00\x01remark".to_vec();
        let inline = CallDescriptor::inline(call.clone());
        let lookup = CallDescriptor::lookup(&call);
        let legacy = CallDescriptor::Legacy {
            hash: hash(&call),
        };

        assert!(inline.same_call(&lookup));
        assert!(lookup.same_call(&legacy));
        assert_ne!(inline, lookup);
    }

    #[test]
    fn test_unknown_tag_is_unrecognized_encoding() {
        let err = CallDescriptor::from_bytes(&[3, 0, 0]).unwrap_err();
        assert_eq!(err, ReaderError::UnrecognizedCallEncoding(3));
    }

    #[test]
    fn test_lookup_wire_layout() {
        let descriptor = CallDescriptor::Lookup {
            hash: Hash::new([7; 32]),
            len: 5,
        };
        let bytes = descriptor.to_bytes();
        assert_eq!(bytes[0], 2);
        assert_eq!(&bytes[1..33], &[7; 32]);
        assert_eq!(&bytes[33..], &[5, 0, 0, 0]);
        assert_eq!(bytes.len(), descriptor.size());
    }

    #[test]
    fn test_len_known_without_lookup() {
        assert_eq!(CallDescriptor::inline(vec![1, 2, 3]).len(), Some(3));
        assert_eq!(
            CallDescriptor::Legacy {
                hash: Hash::zero()
            }
            .len(),
            None
        );
    }

    proptest! {
        #[test]
        fn prop_descriptors_of_same_bytes_are_equivalent(
            call in prop::collection::vec(any::<u8>(), 0..256)
        ) {
            let inline = CallDescriptor::inline(call.clone());
            let lookup = CallDescriptor::lookup(&call);
            prop_assert_eq!(inline.content_hash(), lookup.content_hash());
            prop_assert_eq!(lookup.len(), Some(call.len() as u32));

            let decoded = CallDescriptor::from_bytes(&inline.to_bytes()).unwrap();
            prop_assert!(decoded.same_call(&lookup));
        }

        #[test]
        fn prop_distinct_bytes_are_distinct_calls(
            a in prop::collection::vec(any::<u8>(), 1..64),
            b in prop::collection::vec(any::<u8>(), 1..64)
        ) {
            prop_assume!(a != b);
            prop_assert!(!CallDescriptor::inline(a).same_call(&CallDescriptor::lookup(&b)));
        }
    }
}
