//! Row/page codec (spec.md §4.4): column-by-column encoding driven by
//! `size_from_value`. Each column is prefixed with a one-byte null flag;
//! string/text columns carry a `u16` length prefix; oversized text/blob/json
//! values are redirected through the TOAST store and the row keeps only the
//! 5-byte `{is_toast, toast_id}` descriptor.

use std::io;

use chrono::{Datelike, TimeZone, Timelike};
use jugadb_types::schema::{ColumnDefinition, TableSchema, TypeKind};
use jugadb_types::size::needs_toast;
use jugadb_types::{ColumnValue, DecimalValue, LargeValue, Row, RowId, ToastRef};

use crate::toast::{ToastError, ToastStore};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error encoding/decoding a row: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toast(#[from] ToastError),
    #[error("row is shorter than its schema expects")]
    Truncated,
    #[error("invalid encoded value for column {0:?}")]
    InvalidValue(TypeKind),
}

const NULL_FLAG: u8 = 0;
const PRESENT_FLAG: u8 = 1;
const TOAST_FLAG: u8 = 2;

pub fn encode_row(row: &Row, schema: &TableSchema, toast: &mut ToastStore) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    for (value, def) in row.values.iter().zip(&schema.columns) {
        encode_value(&mut buf, value, def, toast)?;
    }
    Ok(buf)
}

pub fn decode_row(
    bytes: &[u8],
    id: RowId,
    schema: &TableSchema,
    toast: &mut ToastStore,
) -> Result<Row, CodecError> {
    let mut cursor = 0usize;
    let mut values = Vec::with_capacity(schema.columns.len());
    for def in &schema.columns {
        let (value, consumed) = decode_value(&bytes[cursor..], def, toast)?;
        values.push(value);
        cursor += consumed;
    }
    Ok(Row::new(id, values))
}

fn encode_value(
    buf: &mut Vec<u8>,
    value: &ColumnValue,
    def: &ColumnDefinition,
    toast: &mut ToastStore,
) -> Result<(), CodecError> {
    if value.is_null() {
        buf.push(NULL_FLAG);
        return Ok(());
    }

    if needs_toast(value) {
        let bytes = large_value_bytes(value)?;
        let ToastRef { chunk_id, length } = toast.write(&bytes)?;
        buf.push(TOAST_FLAG);
        buf.extend_from_slice(&chunk_id.to_le_bytes());
        buf.extend_from_slice(&length.to_le_bytes());
        return Ok(());
    }

    buf.push(PRESENT_FLAG);
    match value {
        ColumnValue::Int(i) => buf.extend_from_slice(&i.to_le_bytes()),
        ColumnValue::Uint(u) => buf.extend_from_slice(&u.to_le_bytes()),
        ColumnValue::Float(f) => buf.extend_from_slice(&f.to_le_bytes()),
        ColumnValue::Double(d) => buf.extend_from_slice(&d.to_le_bytes()),
        ColumnValue::Bool(b) => buf.push(*b as u8),
        ColumnValue::Char(c) => {
            let mut bytes = [0u8; 4];
            let s = c.encode_utf8(&mut bytes);
            buf.push(s.len() as u8);
            buf.extend_from_slice(s.as_bytes());
        }
        ColumnValue::Str(s) | ColumnValue::Varchar(s) => write_len_prefixed(buf, s.as_bytes()),
        ColumnValue::Text(LargeValue::Inline(b))
        | ColumnValue::Blob(LargeValue::Inline(b))
        | ColumnValue::Json(LargeValue::Inline(b)) => write_len_prefixed(buf, b),
        ColumnValue::Text(LargeValue::Toast(_))
        | ColumnValue::Blob(LargeValue::Toast(_))
        | ColumnValue::Json(LargeValue::Toast(_)) => unreachable!("needs_toast already handled this"),
        ColumnValue::Decimal(d) => write_len_prefixed(buf, d.digits.as_bytes()),
        ColumnValue::Uuid(u) => buf.extend_from_slice(u.as_bytes()),
        ColumnValue::Date(d) => buf.extend_from_slice(&d.num_days_from_ce().to_le_bytes()),
        ColumnValue::Time(t) => buf.extend_from_slice(&(t.num_seconds_from_midnight() as i64 * 1_000_000 + t.nanosecond() as i64 / 1000).to_le_bytes()),
        ColumnValue::TimeTz(t, off) => {
            buf.extend_from_slice(&(t.num_seconds_from_midnight() as i64 * 1_000_000 + t.nanosecond() as i64 / 1000).to_le_bytes());
            buf.extend_from_slice(&off.local_minus_utc().to_le_bytes());
        }
        ColumnValue::Datetime(dt) | ColumnValue::Timestamp(dt) => {
            buf.extend_from_slice(&dt.and_utc().timestamp_micros().to_le_bytes())
        }
        ColumnValue::DatetimeTz(dt) | ColumnValue::TimestampTz(dt) => {
            buf.extend_from_slice(&dt.timestamp_micros().to_le_bytes());
            buf.extend_from_slice(&dt.offset().local_minus_utc().to_le_bytes());
        }
        ColumnValue::Interval(iv) => {
            buf.extend_from_slice(&iv.months.to_le_bytes());
            buf.extend_from_slice(&iv.days.to_le_bytes());
            buf.extend_from_slice(&iv.micros.to_le_bytes());
        }
        ColumnValue::Array(items) => {
            buf.extend_from_slice(&(items.len() as u32).to_le_bytes());
            let mut elem_def = def.clone();
            elem_def.is_array = false;
            for item in items {
                encode_value(buf, item, &elem_def, toast)?;
            }
        }
        ColumnValue::Null => unreachable!("handled above"),
    }
    Ok(())
}

fn write_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn large_value_bytes(value: &ColumnValue) -> Result<Vec<u8>, CodecError> {
    match value {
        ColumnValue::Text(LargeValue::Inline(b))
        | ColumnValue::Blob(LargeValue::Inline(b))
        | ColumnValue::Json(LargeValue::Inline(b)) => Ok(b.clone()),
        ColumnValue::Str(s) | ColumnValue::Varchar(s) => Ok(s.clone().into_bytes()),
        other => Err(CodecError::InvalidValue(other.type_kind().unwrap_or(TypeKind::Text))),
    }
}

fn decode_value(bytes: &[u8], def: &ColumnDefinition, toast: &mut ToastStore) -> Result<(ColumnValue, usize), CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Truncated);
    }
    match bytes[0] {
        NULL_FLAG => Ok((ColumnValue::Null, 1)),
        TOAST_FLAG => {
            if bytes.len() < 9 {
                return Err(CodecError::Truncated);
            }
            let chunk_id = u32::from_le_bytes(bytes[1..5].try_into().unwrap());
            let length = u32::from_le_bytes(bytes[5..9].try_into().unwrap());
            let raw = toast.read(ToastRef { chunk_id, length })?;
            let value = match def.type_kind {
                TypeKind::Text => ColumnValue::Text(LargeValue::Inline(raw)),
                TypeKind::Blob => ColumnValue::Blob(LargeValue::Inline(raw)),
                TypeKind::Json => ColumnValue::Json(LargeValue::Inline(raw)),
                _ => ColumnValue::Varchar(String::from_utf8(raw).unwrap_or_default()),
            };
            Ok((value, 9))
        }
        PRESENT_FLAG => decode_present(&bytes[1..], def, toast).map(|(v, n)| (v, n + 1)),
        _ => Err(CodecError::InvalidValue(def.type_kind)),
    }
}

fn decode_present(bytes: &[u8], def: &ColumnDefinition, toast: &mut ToastStore) -> Result<(ColumnValue, usize), CodecError> {
    if def.is_array {
        if bytes.len() < 4 {
            return Err(CodecError::Truncated);
        }
        let count = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let mut elem_def = def.clone();
        elem_def.is_array = false;
        let mut cursor = 4;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let (value, consumed) = decode_value(&bytes[cursor..], &elem_def, toast)?;
            items.push(value);
            cursor += consumed;
        }
        return Ok((ColumnValue::Array(items), cursor));
    }

    Ok(match def.type_kind {
        TypeKind::Int | TypeKind::Serial => (
            ColumnValue::Int(i64::from_le_bytes(bytes[..8].try_into().map_err(|_| CodecError::Truncated)?)),
            8,
        ),
        TypeKind::Uint => (
            ColumnValue::Uint(u64::from_le_bytes(bytes[..8].try_into().map_err(|_| CodecError::Truncated)?)),
            8,
        ),
        TypeKind::Float => (
            ColumnValue::Float(f32::from_le_bytes(bytes[..4].try_into().map_err(|_| CodecError::Truncated)?)),
            4,
        ),
        TypeKind::Double => (
            ColumnValue::Double(f64::from_le_bytes(bytes[..8].try_into().map_err(|_| CodecError::Truncated)?)),
            8,
        ),
        TypeKind::Bool => (ColumnValue::Bool(bytes[0] == 1), 1),
        TypeKind::Char => {
            let len = bytes[0] as usize;
            let s = std::str::from_utf8(&bytes[1..1 + len]).unwrap_or_default();
            (ColumnValue::Char(s.chars().next().unwrap_or('\0')), 1 + len)
        }
        TypeKind::Varchar => {
            let (s, n) = read_len_prefixed(bytes)?;
            (ColumnValue::Varchar(s), n)
        }
        TypeKind::Text => {
            let (s, n) = read_len_prefixed(bytes)?;
            (ColumnValue::Text(LargeValue::Inline(s.into_bytes())), n)
        }
        TypeKind::Blob => {
            let (s, n) = read_len_prefixed(bytes)?;
            (ColumnValue::Blob(LargeValue::Inline(s.into_bytes())), n)
        }
        TypeKind::Json => {
            let (s, n) = read_len_prefixed(bytes)?;
            (ColumnValue::Json(LargeValue::Inline(s.into_bytes())), n)
        }
        TypeKind::Decimal => {
            let (digits, n) = read_len_prefixed(bytes)?;
            let scale = digits.split_once('.').map(|(_, f)| f.len() as u8).unwrap_or(0);
            (
                ColumnValue::Decimal(DecimalValue {
                    precision: digits.len() as u8,
                    scale,
                    digits,
                }),
                n,
            )
        }
        TypeKind::Uuid => (
            ColumnValue::Uuid(uuid::Uuid::from_slice(&bytes[..16]).map_err(|_| CodecError::Truncated)?),
            16,
        ),
        TypeKind::Date => {
            let days = i32::from_le_bytes(bytes[..4].try_into().map_err(|_| CodecError::Truncated)?);
            let date = chrono::NaiveDate::from_num_days_from_ce_opt(days).ok_or(CodecError::Truncated)?;
            (ColumnValue::Date(date), 4)
        }
        TypeKind::Time => {
            let micros = i64::from_le_bytes(bytes[..8].try_into().map_err(|_| CodecError::Truncated)?);
            (ColumnValue::Time(micros_to_time(micros)), 8)
        }
        TypeKind::Timetz => {
            let micros = i64::from_le_bytes(bytes[..8].try_into().map_err(|_| CodecError::Truncated)?);
            let offset_secs = i32::from_le_bytes(bytes[8..12].try_into().map_err(|_| CodecError::Truncated)?);
            let offset = chrono::FixedOffset::east_opt(offset_secs).ok_or(CodecError::Truncated)?;
            (ColumnValue::TimeTz(micros_to_time(micros), offset), 12)
        }
        TypeKind::Datetime | TypeKind::Timestamp => {
            let micros = i64::from_le_bytes(bytes[..8].try_into().map_err(|_| CodecError::Truncated)?);
            let dt = chrono::DateTime::from_timestamp_micros(micros)
                .ok_or(CodecError::Truncated)?
                .naive_utc();
            (
                if def.type_kind == TypeKind::Timestamp {
                    ColumnValue::Timestamp(dt)
                } else {
                    ColumnValue::Datetime(dt)
                },
                8,
            )
        }
        TypeKind::Datetimetz | TypeKind::Timestamptz => {
            let micros = i64::from_le_bytes(bytes[..8].try_into().map_err(|_| CodecError::Truncated)?);
            let offset_secs = i32::from_le_bytes(bytes[8..12].try_into().map_err(|_| CodecError::Truncated)?);
            let offset = chrono::FixedOffset::east_opt(offset_secs).ok_or(CodecError::Truncated)?;
            let naive = chrono::DateTime::from_timestamp_micros(micros)
                .ok_or(CodecError::Truncated)?
                .naive_utc();
            let dt = offset.from_utc_datetime(&naive);
            (
                if def.type_kind == TypeKind::Timestamptz {
                    ColumnValue::TimestampTz(dt)
                } else {
                    ColumnValue::DatetimeTz(dt)
                },
                12,
            )
        }
        TypeKind::Interval => {
            let months = i32::from_le_bytes(bytes[0..4].try_into().map_err(|_| CodecError::Truncated)?);
            let days = i32::from_le_bytes(bytes[4..8].try_into().map_err(|_| CodecError::Truncated)?);
            let micros = i64::from_le_bytes(bytes[8..16].try_into().map_err(|_| CodecError::Truncated)?);
            (ColumnValue::Interval(jugadb_types::Interval::new(months, days, micros)), 16)
        }
    })
}

fn read_len_prefixed(bytes: &[u8]) -> Result<(String, usize), CodecError> {
    if bytes.len() < 2 {
        return Err(CodecError::Truncated);
    }
    let len = u16::from_le_bytes(bytes[..2].try_into().unwrap()) as usize;
    if bytes.len() < 2 + len {
        return Err(CodecError::Truncated);
    }
    let s = String::from_utf8(bytes[2..2 + len].to_vec()).map_err(|_| CodecError::Truncated)?;
    Ok((s, 2 + len))
}

fn micros_to_time(micros: i64) -> chrono::NaiveTime {
    let secs = (micros / 1_000_000) as u32;
    let nanos = ((micros % 1_000_000) * 1000) as u32;
    chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jugadb_types::schema::TypeKind;

    fn schema() -> TableSchema {
        TableSchema::new(
            "t",
            vec![
                ColumnDefinition::new("id", TypeKind::Int),
                ColumnDefinition::new("name", TypeKind::Varchar),
                {
                    let mut c = ColumnDefinition::new("tags", TypeKind::Varchar);
                    c.is_array = true;
                    c
                },
            ],
        )
    }

    #[test]
    fn round_trips_simple_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut toast = ToastStore::open(&dir.path().join("t.toast")).unwrap();
        let schema = schema();

        let row = Row::new(
            RowId::new(0, 0),
            vec![
                ColumnValue::Int(42),
                ColumnValue::Varchar("hello".into()),
                ColumnValue::Array(vec![
                    ColumnValue::Varchar("a".into()),
                    ColumnValue::Varchar("b".into()),
                ]),
            ],
        );

        let encoded = encode_row(&row, &schema, &mut toast).unwrap();
        let decoded = decode_row(&encoded, row.id, &schema, &mut toast).unwrap();
        assert_eq!(decoded, row);
    }

    #[test]
    fn round_trips_null_and_toasted_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut toast = ToastStore::open(&dir.path().join("t.toast")).unwrap();
        let schema = TableSchema::new(
            "docs",
            vec![
                ColumnDefinition::new("id", TypeKind::Int),
                ColumnDefinition::new("body", TypeKind::Text),
            ],
        );

        let big = "x".repeat(5000);
        let row = Row::new(
            RowId::new(0, 0),
            vec![ColumnValue::Null, ColumnValue::Text(LargeValue::Inline(big.clone().into_bytes()))],
        );

        let encoded = encode_row(&row, &schema, &mut toast).unwrap();
        let decoded = decode_row(&encoded, row.id, &schema, &mut toast).unwrap();
        assert_eq!(decoded.values[0], ColumnValue::Null);
        assert_eq!(decoded.values[1], ColumnValue::Text(LargeValue::Inline(big.into_bytes())));
    }
}
