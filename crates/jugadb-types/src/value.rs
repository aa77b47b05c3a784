//! `ColumnValue`: the tagged sum type every stored or computed value flows
//! through (spec.md §3 "ColumnValue"). The teacher's `lib-core/src/value.rs`
//! models literals the same way — one enum, one variant per kind, rather
//! than the C `union`+`type` tag the original system used.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::interval::Interval;
use crate::schema::TypeKind;

/// Out-of-line reference to a TOAST chunk run (spec.md §4.4). Only ever
/// appears transiently in `jugadb-storage` decode paths — anything handed to
/// the expression evaluator has already been resolved to `LargeValue::Inline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastRef {
    pub chunk_id: u32,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LargeValue {
    Inline(Vec<u8>),
    Toast(ToastRef),
}

impl LargeValue {
    pub fn is_toast(&self) -> bool {
        matches!(self, LargeValue::Toast(_))
    }

    /// Panics if still a `Toast` reference — callers in `jugadb-exec` only
    /// ever see rows `jugadb-storage` has already resolved.
    pub fn as_inline(&self) -> &[u8] {
        match self {
            LargeValue::Inline(bytes) => bytes,
            LargeValue::Toast(_) => {
                unreachable!("evaluated an unresolved TOAST reference")
            }
        }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_inline()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecimalValue {
    pub digits: String,
    pub precision: u8,
    pub scale: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Int(i64),
    Uint(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Varchar(String),
    Text(LargeValue),
    Blob(LargeValue),
    Json(LargeValue),
    Decimal(DecimalValue),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    TimeTz(NaiveTime, FixedOffset),
    Datetime(NaiveDateTime),
    DatetimeTz(DateTime<FixedOffset>),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    Interval(Interval),
    Array(Vec<ColumnValue>),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ColumnValue::Array(_))
    }

    pub fn is_toast(&self) -> bool {
        matches!(
            self,
            ColumnValue::Text(LargeValue::Toast(_))
                | ColumnValue::Blob(LargeValue::Toast(_))
                | ColumnValue::Json(LargeValue::Toast(_))
        )
    }

    /// The `TypeKind` this value currently carries. Used by the cast matrix
    /// to look up `(source, target)` pairs.
    pub fn type_kind(&self) -> Option<TypeKind> {
        Some(match self {
            ColumnValue::Null => return None,
            ColumnValue::Int(_) => TypeKind::Int,
            ColumnValue::Uint(_) => TypeKind::Uint,
            ColumnValue::Float(_) => TypeKind::Float,
            ColumnValue::Double(_) => TypeKind::Double,
            ColumnValue::Bool(_) => TypeKind::Bool,
            ColumnValue::Char(_) => TypeKind::Char,
            ColumnValue::Str(_) => TypeKind::Char,
            ColumnValue::Varchar(_) => TypeKind::Varchar,
            ColumnValue::Text(_) => TypeKind::Text,
            ColumnValue::Blob(_) => TypeKind::Blob,
            ColumnValue::Json(_) => TypeKind::Json,
            ColumnValue::Decimal(_) => TypeKind::Decimal,
            ColumnValue::Uuid(_) => TypeKind::Uuid,
            ColumnValue::Date(_) => TypeKind::Date,
            ColumnValue::Time(_) => TypeKind::Time,
            ColumnValue::TimeTz(..) => TypeKind::Timetz,
            ColumnValue::Datetime(_) => TypeKind::Datetime,
            ColumnValue::DatetimeTz(_) => TypeKind::Datetimetz,
            ColumnValue::Timestamp(_) => TypeKind::Timestamp,
            ColumnValue::TimestampTz(_) => TypeKind::Timestamptz,
            ColumnValue::Interval(_) => TypeKind::Interval,
            ColumnValue::Array(_) => return None,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 1-based element access into an array value (spec.md §3, §4.3,
    /// DESIGN.md Open Question 1). Index 0 or beyond the element count is
    /// `None`; the caller turns that into `ExecError::ArrayIndexOutOfRange`.
    pub fn array_get(&self, one_based_index: i64) -> Option<&ColumnValue> {
        let ColumnValue::Array(items) = self else {
            return None;
        };
        if one_based_index < 1 {
            return None;
        }
        items.get((one_based_index - 1) as usize)
    }

    pub fn array_set(&mut self, one_based_index: i64, value: ColumnValue) -> bool {
        let ColumnValue::Array(items) = self else {
            return false;
        };
        if one_based_index < 1 {
            return false;
        }
        let idx = (one_based_index - 1) as usize;
        match items.get_mut(idx) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
