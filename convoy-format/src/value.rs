//! In-memory cell values and their typed extraction.
//!
//! A [`CellValue`] is one field of one entry, shaped by the field's column
//! type. The [`FromCell`] trait maps cells onto native Rust types; the
//! mapping is strict, so asking for the wrong type fails instead of
//! silently converting.

use serde_json::Value as JsonValue;

use crate::cardinality::{Cardinality32, Cardinality64};
use crate::column::{ColumnType, StructureKind};
use crate::descriptor::FieldDescriptor;
use crate::error::{FormatError, FormatResult};
use crate::index::{ColumnIndex, ColumnSwitch};

/// One materialized cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    /// Collection offset, cells of index columns.
    Index(u64),
    /// Dispatch entry, cells of variant columns.
    Switch(ColumnSwitch),
    /// Cells of collection fields; elements are leaf cells.
    Collection(Vec<CellValue>),
}

impl CellValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::I8(_) => "I8",
            Self::I16(_) => "I16",
            Self::I32(_) => "I32",
            Self::I64(_) => "I64",
            Self::U8(_) => "U8",
            Self::U16(_) => "U16",
            Self::U32(_) => "U32",
            Self::U64(_) => "U64",
            Self::F32(_) => "F32",
            Self::F64(_) => "F64",
            Self::Char(_) => "Char",
            Self::Index(_) => "Index",
            Self::Switch(_) => "Switch",
            Self::Collection(_) => "Collection",
        }
    }

    pub fn collection<I: IntoIterator<Item = CellValue>>(elements: I) -> Self {
        Self::Collection(elements.into_iter().collect())
    }
}

macro_rules! cell_from {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$native> for CellValue {
                fn from(value: $native) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

cell_from!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    ColumnSwitch => Switch,
);

mod sealed {
    pub trait Sealed {}
}

/// Native types a cell can be read as. The vocabulary is closed; the
/// impls below are the complete list.
pub trait FromCell: Sized + sealed::Sealed {
    /// Name used in type mismatch diagnostics.
    fn type_name() -> &'static str;

    fn from_cell(cell: &CellValue) -> Option<Self>;
}

macro_rules! from_cell_scalar {
    ($($native:ty => $variant:ident / $name:literal),* $(,)?) => {
        $(
            impl sealed::Sealed for $native {}

            impl FromCell for $native {
                fn type_name() -> &'static str {
                    $name
                }

                fn from_cell(cell: &CellValue) -> Option<Self> {
                    match cell {
                        CellValue::$variant(value) => Some(*value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_cell_scalar!(
    bool => Bool / "bool",
    i8 => I8 / "i8",
    i16 => I16 / "i16",
    i32 => I32 / "i32",
    i64 => I64 / "i64",
    u8 => U8 / "u8",
    u16 => U16 / "u16",
    u32 => U32 / "u32",
    u64 => U64 / "u64",
    f32 => F32 / "f32",
    f64 => F64 / "f64",
    char => Char / "char",
    ColumnSwitch => Switch / "ColumnSwitch",
);

impl sealed::Sealed for ColumnIndex {}

impl FromCell for ColumnIndex {
    fn type_name() -> &'static str {
        "ColumnIndex"
    }

    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Index(offset) => Some(ColumnIndex::new(*offset)),
            _ => None,
        }
    }
}

impl sealed::Sealed for Cardinality64 {}

impl FromCell for Cardinality64 {
    fn type_name() -> &'static str {
        "Cardinality64"
    }

    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Collection(elements) => Some(Cardinality64::new(elements.len() as u64)),
            _ => None,
        }
    }
}

impl sealed::Sealed for Cardinality32 {}

impl FromCell for Cardinality32 {
    fn type_name() -> &'static str {
        "Cardinality32"
    }

    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Collection(elements) => {
                u32::try_from(elements.len()).ok().map(Cardinality32::new)
            }
            _ => None,
        }
    }
}

impl<T: FromCell> sealed::Sealed for Vec<T> {}

impl<T: FromCell> FromCell for Vec<T> {
    fn type_name() -> &'static str {
        "collection"
    }

    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Collection(elements) => elements.iter().map(T::from_cell).collect(),
            _ => None,
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn decode_error(field: &str, reason: String) -> FormatError {
    FormatError::PageDecode(field.to_string(), reason)
}

fn mismatch(field: &FieldDescriptor, expected: &'static str, cell: &CellValue) -> FormatError {
    FormatError::CellTypeMismatch(field.name.clone(), expected, cell.kind_name())
}

fn real_to_json(field: &str, value: f64) -> FormatResult<JsonValue> {
    serde_json::Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| {
            FormatError::CellEncode(field.to_string(), "non-finite reals cannot be stored")
        })
}

/// Encodes one leaf cell according to the column encoding.
fn encode_leaf(
    field: &FieldDescriptor,
    column_type: ColumnType,
    cell: &CellValue,
) -> FormatResult<JsonValue> {
    match (column_type, cell) {
        (ColumnType::Bit, CellValue::Bool(value)) => Ok(JsonValue::from(*value)),
        (ColumnType::Byte | ColumnType::UInt8, CellValue::U8(value)) => Ok(JsonValue::from(*value)),
        (ColumnType::Char, CellValue::Char(value)) => Ok(JsonValue::from(value.to_string())),
        (ColumnType::Int8, CellValue::I8(value)) => Ok(JsonValue::from(*value)),
        (ColumnType::Int16 | ColumnType::SplitInt16, CellValue::I16(value)) => {
            Ok(JsonValue::from(*value))
        }
        (ColumnType::UInt16 | ColumnType::SplitUInt16, CellValue::U16(value)) => {
            Ok(JsonValue::from(*value))
        }
        (ColumnType::Int32 | ColumnType::SplitInt32, CellValue::I32(value)) => {
            Ok(JsonValue::from(*value))
        }
        (ColumnType::UInt32 | ColumnType::SplitUInt32, CellValue::U32(value)) => {
            Ok(JsonValue::from(*value))
        }
        (ColumnType::Int64 | ColumnType::SplitInt64, CellValue::I64(value)) => {
            Ok(JsonValue::from(*value))
        }
        (ColumnType::UInt64 | ColumnType::SplitUInt64, CellValue::U64(value)) => {
            Ok(JsonValue::from(*value))
        }
        (
            ColumnType::Real16
            | ColumnType::Real32
            | ColumnType::SplitReal32
            | ColumnType::Real32Trunc
            | ColumnType::Real32Quant,
            CellValue::F32(value),
        ) => real_to_json(&field.name, f64::from(*value)),
        (ColumnType::Real64 | ColumnType::SplitReal64, CellValue::F64(value)) => {
            real_to_json(&field.name, *value)
        }
        (ColumnType::Index64 | ColumnType::SplitIndex64, CellValue::Index(offset)) => {
            Ok(JsonValue::from(*offset))
        }
        (ColumnType::Index32 | ColumnType::SplitIndex32, CellValue::Index(offset)) => {
            if *offset > u64::from(u32::MAX) {
                Err(FormatError::CellEncode(
                    field.name.clone(),
                    "offset exceeds the 32-bit index range",
                ))
            } else {
                Ok(JsonValue::from(*offset))
            }
        }
        (ColumnType::Switch, CellValue::Switch(switch)) => Ok(serde_json::json!({
            "index": switch.index(),
            "tag": switch.tag(),
        })),
        (ColumnType::Unknown, _) => Err(FormatError::NonSerializableColumnType(
            ColumnType::Unknown.type_name(),
        )),
        (_, other) => Err(mismatch(field, column_type.type_name(), other)),
    }
}

/// Decodes one leaf value according to the column encoding.
fn decode_leaf(
    field: &FieldDescriptor,
    column_type: ColumnType,
    value: &JsonValue,
) -> FormatResult<CellValue> {
    let name = field.name.as_str();
    let expect = |what: &str| {
        decode_error(
            name,
            format!("expected {what} for {column_type}, got {}", json_kind(value)),
        )
    };
    match column_type {
        ColumnType::Bit => value
            .as_bool()
            .map(CellValue::Bool)
            .ok_or_else(|| expect("boolean")),
        ColumnType::Byte | ColumnType::UInt8 => value
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .map(CellValue::U8)
            .ok_or_else(|| expect("8-bit unsigned integer")),
        ColumnType::Char => {
            let text = value.as_str().ok_or_else(|| expect("string"))?;
            let mut characters = text.chars();
            match (characters.next(), characters.next()) {
                (Some(character), None) => Ok(CellValue::Char(character)),
                _ => Err(decode_error(
                    name,
                    format!("expected a single character, got \"{text}\""),
                )),
            }
        }
        ColumnType::Int8 => value
            .as_i64()
            .and_then(|n| i8::try_from(n).ok())
            .map(CellValue::I8)
            .ok_or_else(|| expect("8-bit integer")),
        ColumnType::Int16 | ColumnType::SplitInt16 => value
            .as_i64()
            .and_then(|n| i16::try_from(n).ok())
            .map(CellValue::I16)
            .ok_or_else(|| expect("16-bit integer")),
        ColumnType::UInt16 | ColumnType::SplitUInt16 => value
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .map(CellValue::U16)
            .ok_or_else(|| expect("16-bit unsigned integer")),
        ColumnType::Int32 | ColumnType::SplitInt32 => value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(CellValue::I32)
            .ok_or_else(|| expect("32-bit integer")),
        ColumnType::UInt32 | ColumnType::SplitUInt32 => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(CellValue::U32)
            .ok_or_else(|| expect("32-bit unsigned integer")),
        ColumnType::Int64 | ColumnType::SplitInt64 => value
            .as_i64()
            .map(CellValue::I64)
            .ok_or_else(|| expect("64-bit integer")),
        ColumnType::UInt64 | ColumnType::SplitUInt64 => value
            .as_u64()
            .map(CellValue::U64)
            .ok_or_else(|| expect("64-bit unsigned integer")),
        ColumnType::Real16
        | ColumnType::Real32
        | ColumnType::SplitReal32
        | ColumnType::Real32Trunc
        | ColumnType::Real32Quant => value
            .as_f64()
            .map(|real| CellValue::F32(real as f32))
            .ok_or_else(|| expect("number")),
        ColumnType::Real64 | ColumnType::SplitReal64 => value
            .as_f64()
            .map(CellValue::F64)
            .ok_or_else(|| expect("number")),
        ColumnType::Index64 | ColumnType::SplitIndex64 => value
            .as_u64()
            .map(CellValue::Index)
            .ok_or_else(|| expect("64-bit offset")),
        ColumnType::Index32 | ColumnType::SplitIndex32 => value
            .as_u64()
            .filter(|offset| *offset <= u64::from(u32::MAX))
            .map(CellValue::Index)
            .ok_or_else(|| expect("32-bit offset")),
        ColumnType::Switch => {
            let object = value.as_object().ok_or_else(|| expect("object"))?;
            let index = object.get("index").and_then(JsonValue::as_u64);
            let tag = object
                .get("tag")
                .and_then(JsonValue::as_u64)
                .and_then(|tag| u32::try_from(tag).ok());
            match (index, tag) {
                (Some(index), Some(tag)) => Ok(CellValue::Switch(ColumnSwitch::new(index, tag))),
                _ => Err(decode_error(
                    name,
                    "switch cells need an index and a tag".to_string(),
                )),
            }
        }
        ColumnType::Unknown => Err(decode_error(
            name,
            "cells of an unknown column type cannot be decoded".to_string(),
        )),
    }
}

/// Encodes one cell for storage, validating it against the field it is
/// written to.
pub(crate) fn encode_cell(field: &FieldDescriptor, cell: &CellValue) -> FormatResult<JsonValue> {
    match field.structure {
        StructureKind::Leaf => encode_leaf(field, field.column_type, cell),
        StructureKind::Variant => encode_leaf(field, ColumnType::Switch, cell),
        StructureKind::Collection => {
            let element_type = field.element_type.ok_or_else(|| {
                FormatError::InvalidField(
                    field.name.clone(),
                    "collection fields must declare an element type",
                )
            })?;
            match cell {
                CellValue::Collection(elements) => {
                    let encoded: FormatResult<Vec<JsonValue>> = elements
                        .iter()
                        .map(|element| encode_leaf(field, element_type, element))
                        .collect();
                    Ok(JsonValue::Array(encoded?))
                }
                other => Err(mismatch(field, "Collection", other)),
            }
        }
        _ => Err(FormatError::InvalidField(
            field.name.clone(),
            "only leaf, collection and variant fields carry cells",
        )),
    }
}

/// Decodes one stored value back into a cell.
pub(crate) fn decode_cell(field: &FieldDescriptor, value: &JsonValue) -> FormatResult<CellValue> {
    match field.structure {
        StructureKind::Leaf => decode_leaf(field, field.column_type, value),
        StructureKind::Variant => decode_leaf(field, ColumnType::Switch, value),
        StructureKind::Collection => {
            let element_type = field.element_type.ok_or_else(|| {
                FormatError::InvalidField(
                    field.name.clone(),
                    "collection fields must declare an element type",
                )
            })?;
            let elements = value.as_array().ok_or_else(|| {
                decode_error(
                    &field.name,
                    format!("expected array for collection, got {}", json_kind(value)),
                )
            })?;
            let decoded: FormatResult<Vec<CellValue>> = elements
                .iter()
                .map(|element| decode_leaf(field, element_type, element))
                .collect();
            Ok(CellValue::Collection(decoded?))
        }
        _ => Err(FormatError::InvalidField(
            field.name.clone(),
            "only leaf, collection and variant fields carry cells",
        )),
    }
}

/// The cell a page of zeros expands to.
pub(crate) fn default_cell(field: &FieldDescriptor) -> CellValue {
    match field.structure {
        StructureKind::Collection => CellValue::Collection(Vec::new()),
        StructureKind::Variant => CellValue::Switch(ColumnSwitch::default()),
        _ => match field.column_type {
            ColumnType::Bit => CellValue::Bool(false),
            ColumnType::Byte | ColumnType::UInt8 => CellValue::U8(0),
            ColumnType::Char => CellValue::Char('\0'),
            ColumnType::Int8 => CellValue::I8(0),
            ColumnType::Int16 | ColumnType::SplitInt16 => CellValue::I16(0),
            ColumnType::UInt16 | ColumnType::SplitUInt16 => CellValue::U16(0),
            ColumnType::Int32 | ColumnType::SplitInt32 => CellValue::I32(0),
            ColumnType::UInt32 | ColumnType::SplitUInt32 => CellValue::U32(0),
            ColumnType::Int64 | ColumnType::SplitInt64 => CellValue::I64(0),
            ColumnType::UInt64 | ColumnType::SplitUInt64 => CellValue::U64(0),
            ColumnType::Real16
            | ColumnType::Real32
            | ColumnType::SplitReal32
            | ColumnType::Real32Trunc
            | ColumnType::Real32Quant => CellValue::F32(0.0),
            ColumnType::Real64 | ColumnType::SplitReal64 => CellValue::F64(0.0),
            ColumnType::Index64
            | ColumnType::SplitIndex64
            | ColumnType::Index32
            | ColumnType::SplitIndex32 => CellValue::Index(0),
            ColumnType::Switch => CellValue::Switch(ColumnSwitch::default()),
            ColumnType::Unknown => CellValue::U64(0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;

    fn real32(name: &str) -> FieldDescriptor {
        FieldDescriptor::leaf(name, ColumnType::Real32)
    }

    #[test]
    fn typed_extraction_is_strict() {
        let cell = CellValue::F32(1.5);
        assert_eq!(f32::from_cell(&cell), Some(1.5));
        assert_eq!(i64::from_cell(&cell), None);
        assert_eq!(f64::from_cell(&cell), None);

        let cell = CellValue::I64(-3);
        assert_eq!(i64::from_cell(&cell), Some(-3));
        assert_eq!(u64::from_cell(&cell), None);
    }

    #[test]
    fn index_cells_extract_as_column_indices() {
        let cell = CellValue::Index(99);
        assert_eq!(ColumnIndex::from_cell(&cell), Some(ColumnIndex::new(99)));
        assert_eq!(u64::from_cell(&cell), None);
    }

    #[test]
    fn collections_extract_elementwise() {
        let cell = CellValue::collection([CellValue::F32(1.0), CellValue::F32(2.0)]);
        assert_eq!(Vec::<f32>::from_cell(&cell), Some(vec![1.0, 2.0]));
        assert_eq!(Vec::<i32>::from_cell(&cell), None);
        assert_eq!(Cardinality64::from_cell(&cell), Some(Cardinality64::new(2)));
        assert_eq!(Cardinality32::from_cell(&cell), Some(Cardinality32::new(2)));
        assert_eq!(Cardinality64::from_cell(&CellValue::F32(0.0)), None);
    }

    #[test]
    fn leaf_cells_round_trip_through_the_codec() {
        let field = real32("pt");
        let encoded = encode_cell(&field, &CellValue::F32(2.25)).expect("encode");
        assert_eq!(decode_cell(&field, &encoded).expect("decode"), CellValue::F32(2.25));

        let field = FieldDescriptor::leaf("hit", ColumnType::Bit);
        let encoded = encode_cell(&field, &CellValue::Bool(true)).expect("encode");
        assert_eq!(decode_cell(&field, &encoded).expect("decode"), CellValue::Bool(true));

        let field = FieldDescriptor::leaf("tag", ColumnType::Char);
        let encoded = encode_cell(&field, &CellValue::Char('k')).expect("encode");
        assert_eq!(decode_cell(&field, &encoded).expect("decode"), CellValue::Char('k'));
    }

    #[test]
    fn split_encodings_share_the_base_cell_shape() {
        let field = FieldDescriptor::leaf("split", ColumnType::SplitInt32);
        let encoded = encode_cell(&field, &CellValue::I32(-7)).expect("encode");
        assert_eq!(decode_cell(&field, &encoded).expect("decode"), CellValue::I32(-7));
    }

    #[test]
    fn collection_cells_round_trip_through_the_codec() {
        let field = FieldDescriptor::collection("hits", ColumnType::Real32);
        let cell = CellValue::collection([CellValue::F32(0.5), CellValue::F32(1.5)]);
        let encoded = encode_cell(&field, &cell).expect("encode");
        assert_eq!(decode_cell(&field, &encoded).expect("decode"), cell);
    }

    #[test]
    fn variant_cells_round_trip_through_the_codec() {
        let field = FieldDescriptor::variant("which");
        let cell = CellValue::Switch(ColumnSwitch::new(11, 2));
        let encoded = encode_cell(&field, &cell).expect("encode");
        assert_eq!(decode_cell(&field, &encoded).expect("decode"), cell);
    }

    #[test]
    fn mismatched_cells_are_refused_at_encode_time() {
        let err = encode_cell(&real32("pt"), &CellValue::I64(1)).expect_err("wrong cell");
        assert!(matches!(err, FormatError::CellTypeMismatch(..)));

        let field = FieldDescriptor::collection("hits", ColumnType::Real32);
        let err = encode_cell(&field, &CellValue::F32(1.0)).expect_err("not a collection");
        assert!(matches!(err, FormatError::CellTypeMismatch(..)));
    }

    #[test]
    fn non_finite_reals_are_refused() {
        let err = encode_cell(&real32("pt"), &CellValue::F32(f32::NAN)).expect_err("nan");
        assert!(matches!(err, FormatError::CellEncode(..)));
    }

    #[test]
    fn narrow_integers_are_range_checked_on_decode() {
        let field = FieldDescriptor::leaf("n", ColumnType::Int8);
        assert!(decode_cell(&field, &serde_json::json!(-128)).is_ok());
        assert!(decode_cell(&field, &serde_json::json!(200)).is_err());
        assert!(decode_cell(&field, &serde_json::json!("text")).is_err());

        let field = FieldDescriptor::leaf("offsets", ColumnType::Index32);
        assert!(decode_cell(&field, &serde_json::json!(u64::from(u32::MAX))).is_ok());
        assert!(decode_cell(&field, &serde_json::json!(u64::from(u32::MAX) + 1)).is_err());
    }

    #[test]
    fn default_cells_match_the_field_shape() {
        assert_eq!(default_cell(&real32("pt")), CellValue::F32(0.0));
        assert_eq!(
            default_cell(&FieldDescriptor::collection("hits", ColumnType::Real32)),
            CellValue::Collection(Vec::new())
        );
        assert_eq!(
            default_cell(&FieldDescriptor::leaf("hit", ColumnType::Bit)),
            CellValue::Bool(false)
        );
    }
}
