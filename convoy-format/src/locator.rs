//! Physical placement descriptors for stored page payloads.
//!
//! A [`Locator`] tells a reader where a page's bytes live without fixing how
//! they got there: plain byte offsets for file-like stores and opaque 64-bit
//! tokens for object stores that address content by id. The kind byte is
//! part of the persisted format; kinds above [`LocatorKind::LAST_SERIALIZABLE`]
//! exist only in memory and are refused by the serializer.

use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FormatError, FormatResult};

/// Payload for stores that address content with a 64-bit token rather than a
/// plain byte offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectLocator64 {
    location: u64,
}

impl ObjectLocator64 {
    pub const fn new(location: u64) -> Self {
        Self { location }
    }

    pub fn location(&self) -> u64 {
        self.location
    }
}

/// How a page payload is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum LocatorKind {
    /// Byte range within the container's pages blob.
    #[default]
    File = 0x00,
    /// Token understood by an object-addressed storage backend.
    Object = 0x02,
    /// Synthetic page of default values; nothing is stored.
    PageZero = 0x80,
    /// Serializable kind this version does not recognize.
    Unknown = 0x81,
}

impl LocatorKind {
    /// Highest kind byte that may appear in a persisted descriptor.
    pub const LAST_SERIALIZABLE: u8 = 0x7f;

    pub fn is_serializable(self) -> bool {
        (self as u8) <= Self::LAST_SERIALIZABLE
    }

    pub fn to_wire(self) -> FormatResult<u8> {
        if self.is_serializable() {
            Ok(self as u8)
        } else {
            Err(FormatError::NonSerializableLocator(self as u8))
        }
    }

    /// Unassigned bytes in the serializable range map to [`LocatorKind::Unknown`]
    /// so descriptors written by newer versions stay readable.
    pub fn from_wire(byte: u8) -> FormatResult<Self> {
        match byte {
            0x00 => Ok(Self::File),
            0x02 => Ok(Self::Object),
            b if b <= Self::LAST_SERIALIZABLE => Ok(Self::Unknown),
            b => Err(FormatError::NonSerializableLocator(b)),
        }
    }
}

/// The two position representations a locator can carry. Exactly one is
/// active; the kind decides which one is valid to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorPosition {
    Offset(u64),
    Object(ObjectLocator64),
}

impl LocatorPosition {
    fn variant_name(&self) -> &'static str {
        match self {
            Self::Offset(_) => "offset",
            Self::Object(_) => "object",
        }
    }
}

/// Where and how many bytes of a page payload are stored.
///
/// The reserved byte is carried for storage backends and ignored by
/// equality.
#[derive(Debug, Clone, Copy)]
pub struct Locator {
    n_bytes_on_storage: u64,
    position: LocatorPosition,
    kind: LocatorKind,
    reserved: u8,
}

impl Locator {
    /// Locator for a byte range within a file-like store.
    pub fn from_offset(offset: u64, n_bytes_on_storage: u64) -> Self {
        Self {
            n_bytes_on_storage,
            position: LocatorPosition::Offset(offset),
            kind: LocatorKind::File,
            reserved: 0,
        }
    }

    /// Locator for an object-addressed store.
    pub fn from_object(location: ObjectLocator64, n_bytes_on_storage: u64) -> Self {
        Self {
            n_bytes_on_storage,
            position: LocatorPosition::Object(location),
            kind: LocatorKind::Object,
            reserved: 0,
        }
    }

    /// Marker for a page whose cells are all default values.
    pub fn page_zero() -> Self {
        Self {
            n_bytes_on_storage: 0,
            position: LocatorPosition::Offset(0),
            kind: LocatorKind::PageZero,
            reserved: 0,
        }
    }

    pub fn with_reserved(mut self, reserved: u8) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn n_bytes_on_storage(&self) -> u64 {
        self.n_bytes_on_storage
    }

    pub fn kind(&self) -> LocatorKind {
        self.kind
    }

    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    pub fn position(&self) -> LocatorPosition {
        self.position
    }

    /// Byte offset of the payload. Fails if the locator holds an object
    /// token instead.
    pub fn offset(&self) -> FormatResult<u64> {
        match self.position {
            LocatorPosition::Offset(offset) => Ok(offset),
            LocatorPosition::Object(_) => Err(FormatError::LocatorPositionMismatch(
                self.position.variant_name(),
                "offset",
            )),
        }
    }

    /// Object token of the payload. Fails if the locator holds a byte
    /// offset instead.
    pub fn object_location(&self) -> FormatResult<ObjectLocator64> {
        match self.position {
            LocatorPosition::Object(location) => Ok(location),
            LocatorPosition::Offset(_) => Err(FormatError::LocatorPositionMismatch(
                self.position.variant_name(),
                "object",
            )),
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::from_offset(0, 0)
    }
}

impl PartialEq for Locator {
    fn eq(&self, other: &Self) -> bool {
        self.n_bytes_on_storage == other.n_bytes_on_storage
            && self.position == other.position
            && self.kind == other.kind
    }
}

impl Eq for Locator {}

/// Raw persisted shape. The position word is interpreted through the kind
/// byte, never on its own.
#[derive(Serialize, Deserialize)]
struct LocatorWire {
    kind: u8,
    reserved: u8,
    bytes: u64,
    position: u64,
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind.to_wire().map_err(S::Error::custom)?;
        let position = match self.position {
            LocatorPosition::Offset(offset) => offset,
            LocatorPosition::Object(location) => location.location(),
        };
        LocatorWire {
            kind,
            reserved: self.reserved,
            bytes: self.n_bytes_on_storage,
            position,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = LocatorWire::deserialize(deserializer)?;
        let kind = LocatorKind::from_wire(wire.kind).map_err(D::Error::custom)?;
        let position = match kind {
            LocatorKind::File => LocatorPosition::Offset(wire.position),
            // Object payloads and unrecognized kinds keep the raw token.
            LocatorKind::Object | LocatorKind::Unknown => {
                LocatorPosition::Object(ObjectLocator64::new(wire.position))
            }
            // from_wire never produces the in-memory kinds.
            LocatorKind::PageZero => unreachable!("page-zero locators are not serializable"),
        };
        Ok(Self {
            n_bytes_on_storage: wire.bytes,
            position,
            kind,
            reserved: wire.reserved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_the_reserved_byte() {
        let plain = Locator::from_offset(128, 16);
        let tagged = Locator::from_offset(128, 16).with_reserved(7);
        assert_eq!(plain, tagged);
        assert_ne!(plain, Locator::from_offset(128, 17));
        assert_ne!(plain, Locator::from_offset(129, 16));
    }

    #[test]
    fn offset_and_object_positions_do_not_mix() {
        let file = Locator::from_offset(64, 8);
        assert_eq!(file.offset().expect("offset position"), 64);
        assert!(matches!(
            file.object_location(),
            Err(FormatError::LocatorPositionMismatch("offset", "object"))
        ));

        let object = Locator::from_object(ObjectLocator64::new(0xbeef), 8);
        assert_eq!(object.object_location().expect("object position").location(), 0xbeef);
        assert!(matches!(
            object.offset(),
            Err(FormatError::LocatorPositionMismatch("object", "offset"))
        ));
    }

    #[test]
    fn wire_round_trip_preserves_both_kinds() {
        let file = Locator::from_offset(1024, 333).with_reserved(1);
        let json = serde_json::to_string(&file).expect("serialize file locator");
        let back: Locator = serde_json::from_str(&json).expect("parse file locator");
        assert_eq!(back, file);
        assert_eq!(back.reserved(), 1);

        let object = Locator::from_object(ObjectLocator64::new(u64::MAX - 5), 12);
        let json = serde_json::to_string(&object).expect("serialize object locator");
        let back: Locator = serde_json::from_str(&json).expect("parse object locator");
        assert_eq!(back, object);
    }

    #[test]
    fn in_memory_kinds_are_refused_by_the_serializer() {
        assert!(serde_json::to_string(&Locator::page_zero()).is_err());
        assert!(LocatorKind::PageZero.to_wire().is_err());
        assert!(LocatorKind::Unknown.to_wire().is_err());
    }

    #[test]
    fn unassigned_serializable_bytes_parse_as_unknown() {
        // 0x7e is reserved for testing forward compatibility.
        let json = r#"{"kind":126,"reserved":0,"bytes":40,"position":77}"#;
        let locator: Locator = serde_json::from_str(json).expect("parse future locator");
        assert_eq!(locator.kind(), LocatorKind::Unknown);
        assert_eq!(locator.object_location().expect("raw token").location(), 77);
        // Unknown kinds survive in memory but cannot be written back.
        assert!(serde_json::to_string(&locator).is_err());
    }

    #[test]
    fn bytes_beyond_the_serializable_range_fail_to_parse() {
        let json = r#"{"kind":128,"reserved":0,"bytes":0,"position":0}"#;
        assert!(serde_json::from_str::<Locator>(json).is_err());
        assert!(matches!(
            LocatorKind::from_wire(0x80),
            Err(FormatError::NonSerializableLocator(0x80))
        ));
    }
}
