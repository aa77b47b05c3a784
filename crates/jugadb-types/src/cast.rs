//! The cast matrix (spec.md §4.3). `infer_and_cast_value` is the single
//! point where type coercion lives: it either mutates `val` in place and
//! returns `true`, or leaves `val` untouched and returns `false`. Callers
//! (constraint checks, INSERT, expression evaluation) treat `false` as a
//! constraint violation and raise their own `CastError` with context this
//! function doesn't have (column name, row number).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};
use uuid::Uuid;

use jugadb_helpers::Diagnostic;

use crate::interval::Interval;
use crate::schema::{ColumnDefinition, TypeKind};
use crate::value::{ColumnValue, DecimalValue, LargeValue};

#[derive(Debug, thiserror::Error)]
pub enum CastError {
    #[error("cannot cast {from:?} to {to:?}")]
    Unsupported { from: TypeKind, to: TypeKind },
    #[error("value {0:?} is null but column does not allow NULL")]
    NotNullViolation(ColumnValue),
    #[error("string {0:?} exceeds VARCHAR({1}) length")]
    VarcharTooLong(String, u16),
}

/// Semantic errors carry no token position; `line`/`col` are always 0,
/// matching the `Diagnostic` fallback for errors without a fixed template
/// code.
impl Diagnostic for CastError {
    fn code(&self) -> &'static str {
        "????"
    }

    fn line(&self) -> u32 {
        0
    }

    fn col(&self) -> u32 {
        0
    }
}

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S%.f";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn date_to_string(d: &NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

pub fn time_to_string(t: &NaiveTime) -> String {
    t.format(TIME_FMT).to_string()
}

pub fn timestamp_to_string(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

pub fn interval_to_string(iv: &Interval) -> String {
    iv.to_string()
}

/// Splits a `TIMESTAMP WITH TIME ZONE` value into its constituent date,
/// time, naive datetime, and offset, per spec.md §4.3
/// "timestamp-with-tz decomposes via `decode_timestamp_TZ`".
pub fn decode_timestamp_tz(dt: &DateTime<FixedOffset>) -> (NaiveDate, NaiveTime, NaiveDateTime, FixedOffset) {
    let naive = dt.naive_local();
    (naive.date(), naive.time(), naive, dt.offset().fix())
}

/// Entry point: attempt to coerce `val` into the representation demanded by
/// `col_def`. Mutates in place on success.
pub fn infer_and_cast_value(val: &mut ColumnValue, col_def: &ColumnDefinition) -> bool {
    if val.is_null() {
        return !col_def.is_not_null;
    }

    if col_def.is_array {
        let ColumnValue::Array(items) = val else {
            return false;
        };
        let mut elem_def = col_def.clone();
        elem_def.is_array = false;
        return items.iter_mut().all(|item| infer_and_cast_value(item, &elem_def));
    }
    if matches!(val, ColumnValue::Array(_)) {
        // Array value into a scalar column: pass through unexamined per
        // spec.md §4.3 ("arrays pass through").
        return true;
    }

    let target = if col_def.type_kind == TypeKind::Serial {
        TypeKind::Int
    } else {
        col_def.type_kind
    };

    let Some(source) = val.type_kind() else {
        return false;
    };

    if source == target {
        return finish_same_type(val, col_def);
    }

    match cast_cross_type(val, target) {
        Some(new_val) => {
            *val = new_val;
            finish_same_type(val, col_def)
        }
        None => false,
    }
}

/// After a (possibly identity) cast, apply per-value validation that depends
/// on the column definition rather than just the type (VARCHAR length,
/// DECIMAL precision/scale).
fn finish_same_type(val: &mut ColumnValue, col_def: &ColumnDefinition) -> bool {
    match val {
        ColumnValue::Varchar(s) => match col_def.type_varchar_len {
            Some(n) if s.chars().count() > n as usize => false,
            _ => true,
        },
        ColumnValue::Decimal(d) => {
            if let Some(p) = col_def.decimal_precision {
                let digit_count = d.digits.chars().filter(|c| c.is_ascii_digit()).count();
                if digit_count > p as usize {
                    return false;
                }
            }
            if let Some(s) = col_def.decimal_scale {
                d.scale = s;
            }
            true
        }
        _ => true,
    }
}

fn numeric_as_f64(val: &ColumnValue) -> Option<f64> {
    match val {
        ColumnValue::Int(i) => Some(*i as f64),
        ColumnValue::Uint(u) => Some(*u as f64),
        ColumnValue::Float(f) => Some(*f as f64),
        ColumnValue::Double(d) => Some(*d),
        ColumnValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn extract_text(val: &ColumnValue) -> Option<String> {
    match val {
        ColumnValue::Char(c) => Some(c.to_string()),
        ColumnValue::Str(s) | ColumnValue::Varchar(s) => Some(s.clone()),
        ColumnValue::Text(l) | ColumnValue::Blob(l) | ColumnValue::Json(l) => match l {
            LargeValue::Inline(bytes) => String::from_utf8(bytes.clone()).ok(),
            LargeValue::Toast(_) => None,
        },
        ColumnValue::Decimal(d) => Some(d.digits.clone()),
        ColumnValue::Uuid(u) => Some(u.to_string()),
        ColumnValue::Date(d) => Some(date_to_string(d)),
        ColumnValue::Time(t) => Some(time_to_string(t)),
        ColumnValue::TimeTz(t, off) => Some(format!("{}{}", time_to_string(t), off)),
        ColumnValue::Datetime(dt) | ColumnValue::Timestamp(dt) => Some(timestamp_to_string(dt)),
        ColumnValue::DatetimeTz(dt) | ColumnValue::TimestampTz(dt) => {
            Some(format!("{}{}", timestamp_to_string(&dt.naive_local()), dt.offset()))
        }
        ColumnValue::Interval(iv) => Some(interval_to_string(iv)),
        ColumnValue::Bool(b) => Some(b.to_string()),
        ColumnValue::Int(i) => Some(i.to_string()),
        ColumnValue::Uint(u) => Some(u.to_string()),
        ColumnValue::Float(f) => Some(f.to_string()),
        ColumnValue::Double(d) => Some(d.to_string()),
        ColumnValue::Null | ColumnValue::Array(_) => None,
    }
}

fn is_string_like(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Char | TypeKind::Varchar | TypeKind::Text | TypeKind::Blob | TypeKind::Json
    )
}

fn is_numeric(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Int | TypeKind::Uint | TypeKind::Float | TypeKind::Double
    )
}

fn is_temporal(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Date
            | TypeKind::Time
            | TypeKind::Timetz
            | TypeKind::Datetime
            | TypeKind::Datetimetz
            | TypeKind::Timestamp
            | TypeKind::Timestamptz
    )
}

fn wrap_string_like(target: TypeKind, s: String) -> Option<ColumnValue> {
    Some(match target {
        TypeKind::Char => {
            let c = s.chars().next()?;
            ColumnValue::Char(c)
        }
        TypeKind::Varchar => ColumnValue::Varchar(s),
        TypeKind::Text => ColumnValue::Text(LargeValue::Inline(s.into_bytes())),
        TypeKind::Blob => ColumnValue::Blob(LargeValue::Inline(s.into_bytes())),
        TypeKind::Json => ColumnValue::Json(LargeValue::Inline(s.into_bytes())),
        _ => return None,
    })
}

fn parse_temporal(target: TypeKind, s: &str) -> Option<ColumnValue> {
    Some(match target {
        TypeKind::Date => ColumnValue::Date(NaiveDate::parse_from_str(s, DATE_FMT).ok()?),
        TypeKind::Time => ColumnValue::Time(NaiveTime::parse_from_str(s, TIME_FMT).ok()?),
        TypeKind::Timetz => {
            let dt = DateTime::parse_from_str(&format!("1970-01-01 {s}"), "%Y-%m-%d %H:%M:%S%.f%:z")
                .ok()?;
            ColumnValue::TimeTz(dt.naive_local().time(), *dt.offset())
        }
        TypeKind::Datetime => {
            ColumnValue::Datetime(NaiveDateTime::parse_from_str(s, DATETIME_FMT).ok()?)
        }
        TypeKind::Timestamp => {
            ColumnValue::Timestamp(NaiveDateTime::parse_from_str(s, DATETIME_FMT).ok()?)
        }
        TypeKind::Datetimetz => {
            let dt = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z").ok()?;
            ColumnValue::DatetimeTz(dt)
        }
        TypeKind::Timestamptz => {
            let dt = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z").ok()?;
            ColumnValue::TimestampTz(dt)
        }
        _ => return None,
    })
}

/// The actual `(source_variant, target_variant) -> ColumnValue` matrix,
/// invoked only when source and target types differ.
fn cast_cross_type(val: &ColumnValue, target: TypeKind) -> Option<ColumnValue> {
    match val {
        ColumnValue::Bool(b) => match target {
            _ if is_numeric(target) => cast_f64_to_numeric(if *b { 1.0 } else { 0.0 }, target),
            _ if is_string_like(target) => wrap_string_like(target, b.to_string()),
            _ => None,
        },

        _ if is_numeric(val.type_kind()?) => {
            let n = numeric_as_f64(val)?;
            match target {
                TypeKind::Bool => Some(ColumnValue::Bool(n != 0.0)),
                _ if is_numeric(target) => cast_f64_to_numeric(n, target),
                _ if is_string_like(target) => wrap_string_like(target, extract_text(val)?),
                TypeKind::Decimal => Some(ColumnValue::Decimal(DecimalValue {
                    digits: format_numeric(val),
                    precision: 18,
                    scale: 0,
                })),
                _ => None,
            }
        }

        _ if is_string_like(val.type_kind()?) => {
            let s = extract_text(val)?;
            match target {
                _ if is_string_like(target) => wrap_string_like(target, s),
                TypeKind::Bool => match s.to_ascii_lowercase().as_str() {
                    "true" | "1" => Some(ColumnValue::Bool(true)),
                    "false" | "0" => Some(ColumnValue::Bool(false)),
                    _ => None,
                },
                TypeKind::Int => s.parse::<i64>().ok().map(ColumnValue::Int),
                TypeKind::Uint => s.parse::<u64>().ok().map(ColumnValue::Uint),
                TypeKind::Float => s.parse::<f32>().ok().map(ColumnValue::Float),
                TypeKind::Double => s.parse::<f64>().ok().map(ColumnValue::Double),
                TypeKind::Uuid => Uuid::parse_str(s.trim()).ok().map(ColumnValue::Uuid),
                TypeKind::Interval => Interval::parse(&s).map(ColumnValue::Interval),
                TypeKind::Decimal => parse_decimal_literal(&s),
                _ if is_temporal(target) => parse_temporal(target, &s),
                _ => None,
            }
        }

        ColumnValue::Uuid(u) if is_string_like(target) => wrap_string_like(target, u.to_string()),

        ColumnValue::Interval(iv) if is_string_like(target) => {
            wrap_string_like(target, interval_to_string(iv))
        }

        ColumnValue::Decimal(d) if is_string_like(target) => {
            wrap_string_like(target, d.digits.clone())
        }
        ColumnValue::Decimal(d) if is_numeric(target) => {
            let n: f64 = d.digits.parse().ok()?;
            cast_f64_to_numeric(n, target)
        }

        // Temporal <-> string, and TIMESTAMPTZ/DATETIMETZ decomposition into
        // narrower temporal kinds (spec.md §4.3).
        ColumnValue::DatetimeTz(dt) | ColumnValue::TimestampTz(dt) => match target {
            _ if is_string_like(target) => wrap_string_like(
                target,
                format!("{}{}", timestamp_to_string(&dt.naive_local()), dt.offset()),
            ),
            TypeKind::Date => Some(ColumnValue::Date(dt.naive_local().date())),
            TypeKind::Time => Some(ColumnValue::Time(dt.naive_local().time())),
            TypeKind::Timetz => Some(ColumnValue::TimeTz(dt.naive_local().time(), *dt.offset())),
            TypeKind::Datetime => Some(ColumnValue::Datetime(dt.naive_local())),
            TypeKind::Timestamp => Some(ColumnValue::Timestamp(dt.naive_local())),
            TypeKind::Datetimetz => Some(ColumnValue::DatetimeTz(*dt)),
            TypeKind::Timestamptz => Some(ColumnValue::TimestampTz(*dt)),
            _ => None,
        },

        ColumnValue::Datetime(dt) | ColumnValue::Timestamp(dt) => match target {
            _ if is_string_like(target) => wrap_string_like(target, timestamp_to_string(dt)),
            TypeKind::Date => Some(ColumnValue::Date(dt.date())),
            TypeKind::Time => Some(ColumnValue::Time(dt.time())),
            TypeKind::Datetime => Some(ColumnValue::Datetime(*dt)),
            TypeKind::Timestamp => Some(ColumnValue::Timestamp(*dt)),
            TypeKind::Datetimetz => Some(ColumnValue::DatetimeTz(
                FixedOffset::east_opt(0).unwrap().from_utc_datetime(dt),
            )),
            TypeKind::Timestamptz => Some(ColumnValue::TimestampTz(
                FixedOffset::east_opt(0).unwrap().from_utc_datetime(dt),
            )),
            _ => None,
        },

        ColumnValue::Date(d) if is_string_like(target) => wrap_string_like(target, date_to_string(d)),
        ColumnValue::Time(t) if is_string_like(target) => wrap_string_like(target, time_to_string(t)),
        ColumnValue::TimeTz(t, off) if is_string_like(target) => {
            wrap_string_like(target, format!("{}{}", time_to_string(t), off))
        }

        _ => None,
    }
}

fn cast_f64_to_numeric(n: f64, target: TypeKind) -> Option<ColumnValue> {
    Some(match target {
        TypeKind::Int => ColumnValue::Int(n as i64),
        TypeKind::Uint => {
            if n < 0.0 {
                return None;
            }
            ColumnValue::Uint(n as u64)
        }
        TypeKind::Float => ColumnValue::Float(n as f32),
        TypeKind::Double => ColumnValue::Double(n),
        _ => return None,
    })
}

fn format_numeric(val: &ColumnValue) -> String {
    match val {
        ColumnValue::Int(i) => i.to_string(),
        ColumnValue::Uint(u) => u.to_string(),
        ColumnValue::Float(f) => f.to_string(),
        ColumnValue::Double(d) => d.to_string(),
        _ => String::new(),
    }
}

fn parse_decimal_literal(s: &str) -> Option<ColumnValue> {
    let s = s.trim();
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let scale = body.split_once('.').map(|(_, frac)| frac.len() as u8).unwrap_or(0);
    Some(ColumnValue::Decimal(DecimalValue {
        digits: s.to_string(),
        precision: body.chars().filter(|c| c.is_ascii_digit()).count() as u8,
        scale,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDefinition;

    fn col(kind: TypeKind) -> ColumnDefinition {
        ColumnDefinition::new("c", kind)
    }

    #[test]
    fn int_widens_to_double() {
        let mut v = ColumnValue::Int(7);
        assert!(infer_and_cast_value(&mut v, &col(TypeKind::Double)));
        assert_eq!(v, ColumnValue::Double(7.0));
    }

    #[test]
    fn string_to_bool_strict() {
        let mut v = ColumnValue::Varchar("true".into());
        assert!(infer_and_cast_value(&mut v, &col(TypeKind::Bool)));
        assert_eq!(v, ColumnValue::Bool(true));

        let mut bad = ColumnValue::Varchar("nope".into());
        assert!(!infer_and_cast_value(&mut bad, &col(TypeKind::Bool)));
    }

    #[test]
    fn varchar_length_boundary() {
        let mut def = col(TypeKind::Varchar);
        def.type_varchar_len = Some(3);
        let mut ok = ColumnValue::Varchar("abc".into());
        assert!(infer_and_cast_value(&mut ok, &def));

        let mut too_long = ColumnValue::Varchar("abcd".into());
        assert!(!infer_and_cast_value(&mut too_long, &def));
    }

    #[test]
    fn null_requires_nullable_column() {
        let mut def = col(TypeKind::Int);
        def.is_not_null = true;
        let mut v = ColumnValue::Null;
        assert!(!infer_and_cast_value(&mut v, &def));

        def.is_not_null = false;
        let mut v2 = ColumnValue::Null;
        assert!(infer_and_cast_value(&mut v2, &def));
    }

    #[test]
    fn date_round_trips_through_string() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let s = date_to_string(&d);
        assert_eq!(s, "2025-04-12");
        let mut v = ColumnValue::Varchar(s);
        assert!(infer_and_cast_value(&mut v, &col(TypeKind::Date)));
        assert_eq!(v, ColumnValue::Date(d));
    }
}
