//! The closed registry of cell encodings and the structural classification
//! of schema fields.
//!
//! Ordinal values are part of the persisted format. Members are only ever
//! appended; existing ordinals never change. When adding a column type,
//! update `NUM_COLUMN_TYPES`, `ALL`, `bits_on_storage`, `split_base`, and
//! the cell codec in `value`.

use std::fmt;

use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FormatError, FormatResult};

/// The available trivial, native content types of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ColumnType {
    Unknown = 0,
    /// 64-bit offsets of (nested) collections, relative to the cluster start.
    Index64 = 1,
    Index32 = 2,
    /// Tuple of a 64-bit index and a 32-bit dispatch tag for variant columns.
    Switch = 3,
    Byte = 4,
    Char = 5,
    Bit = 6,
    Real64 = 7,
    Real32 = 8,
    Real16 = 9,
    Int64 = 10,
    UInt64 = 11,
    Int32 = 12,
    UInt32 = 13,
    Int16 = 14,
    UInt16 = 15,
    Int8 = 16,
    UInt8 = 17,
    SplitIndex64 = 18,
    SplitIndex32 = 19,
    SplitReal64 = 20,
    SplitReal32 = 21,
    SplitInt64 = 22,
    SplitUInt64 = 23,
    SplitInt32 = 24,
    SplitUInt32 = 25,
    SplitInt16 = 26,
    SplitUInt16 = 27,
    Real32Trunc = 28,
    Real32Quant = 29,
}

impl ColumnType {
    /// One past the highest assigned ordinal.
    pub const NUM_COLUMN_TYPES: u16 = 30;

    /// Every member in ordinal order.
    pub const ALL: [ColumnType; Self::NUM_COLUMN_TYPES as usize] = [
        Self::Unknown,
        Self::Index64,
        Self::Index32,
        Self::Switch,
        Self::Byte,
        Self::Char,
        Self::Bit,
        Self::Real64,
        Self::Real32,
        Self::Real16,
        Self::Int64,
        Self::UInt64,
        Self::Int32,
        Self::UInt32,
        Self::Int16,
        Self::UInt16,
        Self::Int8,
        Self::UInt8,
        Self::SplitIndex64,
        Self::SplitIndex32,
        Self::SplitReal64,
        Self::SplitReal32,
        Self::SplitInt64,
        Self::SplitUInt64,
        Self::SplitInt32,
        Self::SplitUInt32,
        Self::SplitInt16,
        Self::SplitUInt16,
        Self::Real32Trunc,
        Self::Real32Quant,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Index64 => "Index64",
            Self::Index32 => "Index32",
            Self::Switch => "Switch",
            Self::Byte => "Byte",
            Self::Char => "Char",
            Self::Bit => "Bit",
            Self::Real64 => "Real64",
            Self::Real32 => "Real32",
            Self::Real16 => "Real16",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int8 => "Int8",
            Self::UInt8 => "UInt8",
            Self::SplitIndex64 => "SplitIndex64",
            Self::SplitIndex32 => "SplitIndex32",
            Self::SplitReal64 => "SplitReal64",
            Self::SplitReal32 => "SplitReal32",
            Self::SplitInt64 => "SplitInt64",
            Self::SplitUInt64 => "SplitUInt64",
            Self::SplitInt32 => "SplitInt32",
            Self::SplitUInt32 => "SplitUInt32",
            Self::SplitInt16 => "SplitInt16",
            Self::SplitUInt16 => "SplitUInt16",
            Self::Real32Trunc => "Real32Trunc",
            Self::Real32Quant => "Real32Quant",
        }
    }

    pub fn to_wire(self) -> FormatResult<u16> {
        match self {
            Self::Unknown => Err(FormatError::NonSerializableColumnType(self.type_name())),
            known => Ok(known as u16),
        }
    }

    /// Strict: unassigned ordinals are rejected rather than mapped.
    pub fn from_wire(ordinal: u16) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Storage width in bits, or `None` where the width is chosen per
    /// column at write time (truncated and quantized reals).
    pub fn bits_on_storage(self) -> Option<u32> {
        match self {
            Self::Unknown | Self::Real32Trunc | Self::Real32Quant => None,
            Self::Bit => Some(1),
            Self::Byte | Self::Char | Self::Int8 | Self::UInt8 => Some(8),
            Self::Real16 | Self::Int16 | Self::UInt16 | Self::SplitInt16 | Self::SplitUInt16 => {
                Some(16)
            }
            Self::Index32
            | Self::Real32
            | Self::Int32
            | Self::UInt32
            | Self::SplitIndex32
            | Self::SplitReal32
            | Self::SplitInt32
            | Self::SplitUInt32 => Some(32),
            Self::Index64
            | Self::Real64
            | Self::Int64
            | Self::UInt64
            | Self::SplitIndex64
            | Self::SplitReal64
            | Self::SplitInt64
            | Self::SplitUInt64 => Some(64),
            Self::Switch => Some(96),
        }
    }

    /// The unsplit encoding with the same in-memory cell shape.
    pub fn split_base(self) -> Option<Self> {
        match self {
            Self::SplitIndex64 => Some(Self::Index64),
            Self::SplitIndex32 => Some(Self::Index32),
            Self::SplitReal64 => Some(Self::Real64),
            Self::SplitReal32 => Some(Self::Real32),
            Self::SplitInt64 => Some(Self::Int64),
            Self::SplitUInt64 => Some(Self::UInt64),
            Self::SplitInt32 => Some(Self::Int32),
            Self::SplitUInt32 => Some(Self::UInt32),
            Self::SplitInt16 => Some(Self::Int16),
            Self::SplitUInt16 => Some(Self::UInt16),
            _ => None,
        }
    }

    pub fn is_split(self) -> bool {
        self.split_base().is_some()
    }

    /// Whether cells of this column are collection offsets.
    pub fn is_index(self) -> bool {
        matches!(
            self,
            Self::Index64 | Self::Index32 | Self::SplitIndex64 | Self::SplitIndex32
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ordinal = self.to_wire().map_err(S::Error::custom)?;
        serializer.serialize_u16(ordinal)
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ordinal = u16::deserialize(deserializer)?;
        Self::from_wire(ordinal)
            .ok_or_else(|| D::Error::custom(FormatError::UnknownColumnType(ordinal)))
    }
}

/// How a schema field materializes on the column layer: leaves carry data,
/// collections own an offset column, records are pure composition, variants
/// own a switch column, and streamed fields keep opaque payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StructureKind {
    Invalid = 0,
    Leaf = 1,
    Collection = 2,
    Record = 3,
    Variant = 4,
    Streamer = 5,
    /// Kind written by a newer version; usable in memory only.
    Unknown = 6,
}

impl StructureKind {
    pub fn kind_name(self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::Leaf => "Leaf",
            Self::Collection => "Collection",
            Self::Record => "Record",
            Self::Variant => "Variant",
            Self::Streamer => "Streamer",
            Self::Unknown => "Unknown",
        }
    }

    pub fn to_wire(self) -> FormatResult<u16> {
        match self {
            Self::Invalid | Self::Unknown => {
                Err(FormatError::NonSerializableStructure(self.kind_name()))
            }
            known => Ok(known as u16),
        }
    }

    /// Unassigned ordinals map to [`StructureKind::Unknown`] so descriptors
    /// written by newer versions stay readable.
    pub fn from_wire(ordinal: u16) -> Self {
        match ordinal {
            0 => Self::Invalid,
            1 => Self::Leaf,
            2 => Self::Collection,
            3 => Self::Record,
            4 => Self::Variant,
            5 => Self::Streamer,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

impl Serialize for StructureKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ordinal = self.to_wire().map_err(S::Error::custom)?;
        serializer.serialize_u16(ordinal)
    }
}

impl<'de> Deserialize<'de> for StructureKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_wire(u16::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_wire_stable() {
        for (ordinal, column_type) in ColumnType::ALL.iter().enumerate() {
            assert_eq!(*column_type as u16, ordinal as u16);
            assert_eq!(ColumnType::from_wire(ordinal as u16), Some(*column_type));
        }
        assert_eq!(ColumnType::ALL.len() as u16, ColumnType::NUM_COLUMN_TYPES);
        assert_eq!(ColumnType::from_wire(ColumnType::NUM_COLUMN_TYPES), None);
    }

    #[test]
    fn unknown_column_type_never_reaches_the_wire() {
        assert!(ColumnType::Unknown.to_wire().is_err());
        assert!(serde_json::to_string(&ColumnType::Unknown).is_err());
        assert_eq!(
            ColumnType::Switch.to_wire().expect("assigned ordinal"),
            3
        );
    }

    #[test]
    fn future_column_ordinals_are_rejected() {
        // u16::MAX - 1 plays the role of an ordinal from a future version.
        assert_eq!(ColumnType::from_wire(u16::MAX - 1), None);
        assert!(serde_json::from_str::<ColumnType>("65534").is_err());
    }

    #[test]
    fn future_structure_ordinals_map_to_unknown() {
        assert_eq!(StructureKind::from_wire(u16::MAX - 1), StructureKind::Unknown);
        assert_eq!(
            serde_json::from_str::<StructureKind>("65534").expect("forward compatible"),
            StructureKind::Unknown
        );
        assert!(StructureKind::Unknown.to_wire().is_err());
        assert!(StructureKind::Invalid.to_wire().is_err());
        assert_eq!(StructureKind::from_wire(2), StructureKind::Collection);
    }

    #[test]
    fn split_encodings_pair_with_their_base() {
        assert_eq!(
            ColumnType::SplitReal32.split_base(),
            Some(ColumnType::Real32)
        );
        assert_eq!(
            ColumnType::SplitIndex64.split_base(),
            Some(ColumnType::Index64)
        );
        assert_eq!(ColumnType::Real32.split_base(), None);
        assert!(ColumnType::SplitUInt16.is_split());
        assert!(!ColumnType::Bit.is_split());
    }

    #[test]
    fn storage_widths_match_the_encoding() {
        assert_eq!(ColumnType::Bit.bits_on_storage(), Some(1));
        assert_eq!(ColumnType::Switch.bits_on_storage(), Some(96));
        assert_eq!(ColumnType::SplitReal64.bits_on_storage(), Some(64));
        assert_eq!(ColumnType::Real32Trunc.bits_on_storage(), None);
        assert_eq!(ColumnType::Real32Quant.bits_on_storage(), None);
    }

    #[test]
    fn index_types_are_classified() {
        assert!(ColumnType::Index64.is_index());
        assert!(ColumnType::SplitIndex32.is_index());
        assert!(!ColumnType::Switch.is_index());
        assert!(!ColumnType::UInt64.is_index());
    }
}
