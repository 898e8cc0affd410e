//! Owned BSON binary payloads.

use std::fmt::{self, Display};

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{
    error::{Error, Result},
    raw::RawBinaryRef,
    spec::BinarySubtype,
};

/// Represents a BSON binary value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Binary({:#x}, {})",
            u8::from(self.subtype),
            STANDARD.encode(&self.bytes)
        )
    }
}

impl Binary {
    /// Creates a [`Binary`] from a base64 string and optional [`BinarySubtype`]. If the
    /// `subtype` argument is [`None`], the [`Binary`] constructed will default to
    /// [`BinarySubtype::Generic`].
    ///
    /// ```rust
    /// # use rawbson::Binary;
    /// let binary = Binary::from_base64("aGVsbG8=", None)?;
    /// assert_eq!(binary.bytes, b"hello");
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn from_base64(
        input: impl AsRef<str>,
        subtype: impl Into<Option<BinarySubtype>>,
    ) -> Result<Self> {
        let bytes = STANDARD.decode(input.as_ref()).map_err(Error::binary)?;
        let subtype = subtype.into().unwrap_or(BinarySubtype::Generic);
        Ok(Binary { subtype, bytes })
    }

    /// The payload encoded as standard, padded base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Creates a [`Binary`] with subtype [`BinarySubtype::Uuid`] holding the UUID's 16 bytes.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Binary {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        }
    }

    /// Interprets this value as a UUID. Fails unless the subtype is [`BinarySubtype::Uuid`] and
    /// the payload is exactly 16 bytes.
    pub fn to_uuid(&self) -> Result<uuid::Uuid> {
        if self.subtype != BinarySubtype::Uuid {
            return Err(Error::binary(format!(
                "expected binary subtype {:#04x} for a UUID, got {:#04x}",
                u8::from(BinarySubtype::Uuid),
                u8::from(self.subtype)
            )));
        }
        uuid::Uuid::from_slice(&self.bytes).map_err(Error::binary)
    }

    /// Borrow the contents as a [`RawBinaryRef`].
    pub fn as_raw_binary(&self) -> RawBinaryRef<'_> {
        RawBinaryRef {
            bytes: self.bytes.as_slice(),
            subtype: self.subtype,
        }
    }
}

impl From<uuid::Uuid> for Binary {
    fn from(uuid: uuid::Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uuid_round_trip() {
        let uuid = uuid::Uuid::parse_str("c8edabc3-f738-4ca3-b68d-ab92a91478a3").unwrap();
        let bin = Binary::from(uuid);
        assert_eq!(bin.subtype, BinarySubtype::Uuid);
        assert_eq!(bin.to_uuid().unwrap(), uuid);

        let generic = Binary {
            subtype: BinarySubtype::Generic,
            bytes: bin.bytes.clone(),
        };
        assert!(generic.to_uuid().is_err());
    }

    #[test]
    fn base64() {
        let bin = Binary::from_base64("AQID", BinarySubtype::Md5).unwrap();
        assert_eq!(bin.bytes, vec![1, 2, 3]);
        assert_eq!(bin.subtype, BinarySubtype::Md5);
        assert_eq!(bin.to_base64(), "AQID");
        assert_eq!(bin.to_string(), "Binary(0x5, AQID)");
        assert!(Binary::from_base64("!!", None).is_err());
    }
}
