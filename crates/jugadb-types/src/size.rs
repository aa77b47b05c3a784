//! On-disk sizing (spec.md §4.3 "Value sizing", §4.4 row/page codec).
//!
//! `size_from_type` gives the type's default slot width (used to lay out a
//! NULL, and as the TOAST-descriptor width for variable-length types).
//! `size_from_value` gives the actual encoded width of a specific value.

use crate::schema::{ColumnDefinition, TypeKind};
use crate::value::{ColumnValue, LargeValue};

/// Values whose encoded length exceeds this many bytes are split into TOAST
/// chunks instead of stored inline (spec.md §4.4).
pub const TOAST_CHUNK_SIZE: usize = 2000;

/// `{ is_toast: bool, toast_id: u32 }` on-disk descriptor width.
pub const TOAST_DESCRIPTOR_SIZE: usize = 5;

const LEN_PREFIX_SIZE: usize = 2;

pub fn size_from_type(def: &ColumnDefinition) -> usize {
    if def.is_array {
        return TOAST_DESCRIPTOR_SIZE;
    }
    match def.type_kind {
        TypeKind::Int | TypeKind::Serial => 8,
        TypeKind::Uint => 8,
        TypeKind::Float => 4,
        TypeKind::Double => 8,
        TypeKind::Bool => 1,
        TypeKind::Char => 4,
        TypeKind::Varchar => def.type_varchar_len.unwrap_or(255) as usize + LEN_PREFIX_SIZE,
        TypeKind::Text | TypeKind::Blob | TypeKind::Json => TOAST_DESCRIPTOR_SIZE,
        TypeKind::Decimal => def.decimal_precision.unwrap_or(18) as usize + 3 + LEN_PREFIX_SIZE,
        TypeKind::Uuid => 16,
        TypeKind::Date => 4,
        TypeKind::Time => 8,
        TypeKind::Timetz => 12,
        TypeKind::Datetime => 8,
        TypeKind::Datetimetz => 12,
        TypeKind::Timestamp => 8,
        TypeKind::Timestamptz => 12,
        TypeKind::Interval => 16,
    }
}

pub fn size_from_value(val: &ColumnValue, def: &ColumnDefinition) -> usize {
    match val {
        ColumnValue::Null => size_from_type(def),
        ColumnValue::Array(items) => {
            let mut elem_def = def.clone();
            elem_def.is_array = false;
            LEN_PREFIX_SIZE
                + items
                    .iter()
                    .map(|v| size_from_value(v, &elem_def))
                    .sum::<usize>()
        }
        ColumnValue::Str(s) => LEN_PREFIX_SIZE + s.len(),
        ColumnValue::Varchar(s) => LEN_PREFIX_SIZE + s.len(),
        ColumnValue::Text(large) | ColumnValue::Blob(large) | ColumnValue::Json(large) => {
            match large {
                LargeValue::Toast(_) => TOAST_DESCRIPTOR_SIZE,
                LargeValue::Inline(bytes) => LEN_PREFIX_SIZE + bytes.len(),
            }
        }
        ColumnValue::Decimal(d) => LEN_PREFIX_SIZE + d.digits.len(),
        _ => size_from_type(def),
    }
}

/// Whether encoding `val` inline (rather than TOASTing it) would exceed the
/// chunk threshold.
pub fn needs_toast(val: &ColumnValue) -> bool {
    match val {
        ColumnValue::Text(LargeValue::Inline(b))
        | ColumnValue::Blob(LargeValue::Inline(b))
        | ColumnValue::Json(LargeValue::Inline(b)) => b.len() > TOAST_CHUNK_SIZE,
        ColumnValue::Str(s) | ColumnValue::Varchar(s) => s.len() > TOAST_CHUNK_SIZE,
        _ => false,
    }
}
