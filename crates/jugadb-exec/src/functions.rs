//! Scalar/aggregate function registry (spec.md §4.7). Modeled as a
//! process-wide name → implementation map, built once when an `Executor` is
//! constructed (spec.md §9 "Global function registry"); callers look up by
//! lowercased name.

use std::collections::HashMap;

use chrono::{Datelike, Timelike};

use jugadb_types::ColumnValue;

use crate::error::ExecError;

type ScalarFn = fn(&[ColumnValue]) -> Result<ColumnValue, ExecError>;

pub struct FunctionRegistry {
    scalars: HashMap<&'static str, ScalarFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut scalars: HashMap<&'static str, ScalarFn> = HashMap::new();
        scalars.insert("abs", fn_abs);
        scalars.insert("round", fn_round);
        scalars.insert("floor", fn_floor);
        scalars.insert("ceiling", fn_ceiling);
        scalars.insert("pi", fn_pi);
        scalars.insert("degrees", fn_degrees);
        scalars.insert("radians", fn_radians);
        scalars.insert("sin", fn_sin);
        scalars.insert("cos", fn_cos);
        scalars.insert("tan", fn_tan);
        scalars.insert("log", fn_log);
        scalars.insert("pow", fn_pow);
        scalars.insert("rand", fn_rand);
        scalars.insert("now", fn_now);
        scalars.insert("date", fn_date);
        scalars.insert("time", fn_time);
        scalars.insert("extract", fn_extract);
        scalars.insert("str_to_date", fn_str_to_date);
        scalars.insert("concat", fn_concat);
        scalars.insert("substring", fn_substring);
        scalars.insert("length", fn_length);
        scalars.insert("lower", fn_lower);
        scalars.insert("upper", fn_upper);
        scalars.insert("trim", fn_trim);
        scalars.insert("replace", fn_replace);
        scalars.insert("coalesce", fn_coalesce);
        scalars.insert("ifnull", fn_ifnull);
        scalars.insert("greatest", fn_greatest);
        scalars.insert("least", fn_least);
        Self { scalars }
    }

    pub fn call(&self, name: &str, args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
        let lowered = name.to_ascii_lowercase();
        let f = self.scalars.get(lowered.as_str()).ok_or_else(|| ExecError::UnknownFunction(name.to_string()))?;
        f(args)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn as_f64(v: &ColumnValue) -> Option<f64> {
    match v {
        ColumnValue::Int(i) => Some(*i as f64),
        ColumnValue::Uint(u) => Some(*u as f64),
        ColumnValue::Float(f) => Some(*f as f64),
        ColumnValue::Double(d) => Some(*d),
        _ => None,
    }
}

fn as_str(v: &ColumnValue) -> Option<String> {
    match v {
        ColumnValue::Str(s) | ColumnValue::Varchar(s) => Some(s.clone()),
        ColumnValue::Char(c) => Some(c.to_string()),
        _ => None,
    }
}

fn arity_err(name: &str) -> ExecError {
    ExecError::UnknownFunction(format!("{name}(<wrong number of arguments>)"))
}

fn fn_abs(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("abs")) };
    Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("abs"))?.abs()))
}

fn fn_round(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    match args {
        [v] => Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("round"))?.round())),
        [v, d] => {
            let digits = as_f64(d).ok_or_else(|| arity_err("round"))? as i32;
            let factor = 10f64.powi(digits);
            Ok(ColumnValue::Double((as_f64(v).ok_or_else(|| arity_err("round"))? * factor).round() / factor))
        }
        _ => Err(arity_err("round")),
    }
}

fn fn_floor(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("floor")) };
    Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("floor"))?.floor()))
}

fn fn_ceiling(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("ceiling")) };
    Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("ceiling"))?.ceil()))
}

fn fn_pi(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    if !args.is_empty() {
        return Err(arity_err("pi"));
    }
    Ok(ColumnValue::Double(std::f64::consts::PI))
}

fn fn_degrees(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("degrees")) };
    Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("degrees"))?.to_degrees()))
}

fn fn_radians(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("radians")) };
    Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("radians"))?.to_radians()))
}

fn fn_sin(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("sin")) };
    Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("sin"))?.sin()))
}

fn fn_cos(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("cos")) };
    Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("cos"))?.cos()))
}

fn fn_tan(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("tan")) };
    Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("tan"))?.tan()))
}

fn fn_log(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    match args {
        [v] => Ok(ColumnValue::Double(as_f64(v).ok_or_else(|| arity_err("log"))?.ln())),
        [base, v] => {
            let base = as_f64(base).ok_or_else(|| arity_err("log"))?;
            let v = as_f64(v).ok_or_else(|| arity_err("log"))?;
            Ok(ColumnValue::Double(v.log(base)))
        }
        _ => Err(arity_err("log")),
    }
}

fn fn_pow(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [base, exp] = args else { return Err(arity_err("pow")) };
    let base = as_f64(base).ok_or_else(|| arity_err("pow"))?;
    let exp = as_f64(exp).ok_or_else(|| arity_err("pow"))?;
    Ok(ColumnValue::Double(base.powf(exp)))
}

fn fn_rand(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    if !args.is_empty() {
        return Err(arity_err("rand"));
    }
    Ok(ColumnValue::Double(rand::random::<f64>()))
}

fn fn_now(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    if !args.is_empty() {
        return Err(arity_err("now"));
    }
    Ok(ColumnValue::Timestamp(chrono::Utc::now().naive_utc()))
}

fn fn_date(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("date")) };
    match v {
        ColumnValue::Datetime(dt) | ColumnValue::Timestamp(dt) => Ok(ColumnValue::Date(dt.date())),
        ColumnValue::Date(d) => Ok(ColumnValue::Date(*d)),
        other => Err(ExecError::TypeCastFailed(format!("date({other:?})"))),
    }
}

fn fn_time(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("time")) };
    match v {
        ColumnValue::Datetime(dt) | ColumnValue::Timestamp(dt) => Ok(ColumnValue::Time(dt.time())),
        ColumnValue::Time(t) => Ok(ColumnValue::Time(*t)),
        other => Err(ExecError::TypeCastFailed(format!("time({other:?})"))),
    }
}

fn fn_extract(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [field, v] = args else { return Err(arity_err("extract")) };
    let field = as_str(field).ok_or_else(|| arity_err("extract"))?.to_ascii_lowercase();
    let (date, time) = match v {
        ColumnValue::Datetime(dt) | ColumnValue::Timestamp(dt) => (Some(dt.date()), Some(dt.time())),
        ColumnValue::Date(d) => (Some(*d), None),
        ColumnValue::Time(t) => (None, Some(*t)),
        other => return Err(ExecError::TypeCastFailed(format!("extract({other:?})"))),
    };
    let value = match field.as_str() {
        "year" => date.map(|d| d.year() as i64),
        "month" => date.map(|d| d.month() as i64),
        "day" => date.map(|d| d.day() as i64),
        "hour" => time.map(|t| t.hour() as i64),
        "minute" => time.map(|t| t.minute() as i64),
        "second" => time.map(|t| t.second() as i64),
        _ => None,
    };
    value.map(ColumnValue::Int).ok_or_else(|| ExecError::TypeCastFailed(format!("extract({field})")))
}

fn fn_str_to_date(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [s, fmt] = args else { return Err(arity_err("str_to_date")) };
    let s = as_str(s).ok_or_else(|| arity_err("str_to_date"))?;
    let fmt = as_str(fmt).ok_or_else(|| arity_err("str_to_date"))?;
    chrono::NaiveDate::parse_from_str(&s, &fmt)
        .map(ColumnValue::Date)
        .map_err(|_| ExecError::TypeCastFailed(format!("str_to_date({s:?}, {fmt:?})")))
}

fn fn_concat(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let mut out = String::new();
    for a in args {
        out.push_str(&display_value(a));
    }
    Ok(ColumnValue::Str(out))
}

fn fn_substring(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let (s, start, len) = match args {
        [s, start] => (as_str(s).ok_or_else(|| arity_err("substring"))?, as_f64(start).ok_or_else(|| arity_err("substring"))? as i64, None),
        [s, start, len] => (
            as_str(s).ok_or_else(|| arity_err("substring"))?,
            as_f64(start).ok_or_else(|| arity_err("substring"))? as i64,
            Some(as_f64(len).ok_or_else(|| arity_err("substring"))? as usize),
        ),
        _ => return Err(arity_err("substring")),
    };
    let chars: Vec<char> = s.chars().collect();
    let start_idx = if start >= 1 { (start - 1) as usize } else { 0 };
    if start_idx >= chars.len() {
        return Ok(ColumnValue::Str(String::new()));
    }
    let end_idx = match len {
        Some(l) => (start_idx + l).min(chars.len()),
        None => chars.len(),
    };
    Ok(ColumnValue::Str(chars[start_idx..end_idx].iter().collect()))
}

fn fn_length(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("length")) };
    let s = as_str(v).ok_or_else(|| arity_err("length"))?;
    Ok(ColumnValue::Int(s.chars().count() as i64))
}

fn fn_lower(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("lower")) };
    Ok(ColumnValue::Str(as_str(v).ok_or_else(|| arity_err("lower"))?.to_lowercase()))
}

fn fn_upper(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("upper")) };
    Ok(ColumnValue::Str(as_str(v).ok_or_else(|| arity_err("upper"))?.to_uppercase()))
}

fn fn_trim(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v] = args else { return Err(arity_err("trim")) };
    Ok(ColumnValue::Str(as_str(v).ok_or_else(|| arity_err("trim"))?.trim().to_string()))
}

fn fn_replace(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [s, from, to] = args else { return Err(arity_err("replace")) };
    let s = as_str(s).ok_or_else(|| arity_err("replace"))?;
    let from = as_str(from).ok_or_else(|| arity_err("replace"))?;
    let to = as_str(to).ok_or_else(|| arity_err("replace"))?;
    Ok(ColumnValue::Str(s.replace(&from, &to)))
}

fn fn_coalesce(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    Ok(args.iter().find(|v| !v.is_null()).cloned().unwrap_or(ColumnValue::Null))
}

fn fn_ifnull(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    let [v, fallback] = args else { return Err(arity_err("ifnull")) };
    Ok(if v.is_null() { fallback.clone() } else { v.clone() })
}

fn fn_greatest(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    args.iter()
        .filter(|v| !v.is_null())
        .try_fold(None, |acc: Option<f64>, v| {
            let n = as_f64(v).ok_or_else(|| arity_err("greatest"))?;
            Ok(Some(acc.map_or(n, |a: f64| a.max(n))))
        })
        .map(|opt| opt.map(ColumnValue::Double).unwrap_or(ColumnValue::Null))
}

fn fn_least(args: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    args.iter()
        .filter(|v| !v.is_null())
        .try_fold(None, |acc: Option<f64>, v| {
            let n = as_f64(v).ok_or_else(|| arity_err("least"))?;
            Ok(Some(acc.map_or(n, |a: f64| a.min(n))))
        })
        .map(|opt| opt.map(ColumnValue::Double).unwrap_or(ColumnValue::Null))
}

/// Renders a value the way `concat`/string coercion expects; numbers print
/// without the `Double("...")` debug wrapper.
pub fn display_value(v: &ColumnValue) -> String {
    match v {
        ColumnValue::Null => String::new(),
        ColumnValue::Str(s) | ColumnValue::Varchar(s) => s.clone(),
        ColumnValue::Char(c) => c.to_string(),
        ColumnValue::Int(i) => i.to_string(),
        ColumnValue::Uint(u) => u.to_string(),
        ColumnValue::Float(f) => f.to_string(),
        ColumnValue::Double(d) => d.to_string(),
        ColumnValue::Bool(b) => b.to_string(),
        ColumnValue::Uuid(u) => u.to_string(),
        ColumnValue::Date(d) => d.to_string(),
        ColumnValue::Time(t) => t.to_string(),
        other => format!("{other:?}"),
    }
}

/// Aggregates (spec.md §4.7) operate on a whole column of input rather than
/// a fixed arg list, so they live outside `FunctionRegistry::call`.
pub fn evaluate_aggregate(name: &str, values: &[ColumnValue]) -> Result<ColumnValue, ExecError> {
    match name.to_ascii_lowercase().as_str() {
        "count" => Ok(ColumnValue::Int(values.iter().filter(|v| !v.is_null()).count() as i64)),
        "sum" => {
            let sum: f64 = values.iter().filter_map(as_f64).sum();
            Ok(ColumnValue::Double(sum))
        }
        "avg" => {
            let nums: Vec<f64> = values.iter().filter_map(as_f64).collect();
            if nums.is_empty() {
                Ok(ColumnValue::Null)
            } else {
                Ok(ColumnValue::Double(nums.iter().sum::<f64>() / nums.len() as f64))
            }
        }
        "min" => values
            .iter()
            .filter_map(as_f64)
            .fold(None, |acc, n| Some(acc.map_or(n, |a: f64| a.min(n))))
            .map(ColumnValue::Double)
            .ok_or_else(|| ExecError::UnknownFunction("min() over empty set".into())),
        "max" => values
            .iter()
            .filter_map(as_f64)
            .fold(None, |acc, n| Some(acc.map_or(n, |a: f64| a.max(n))))
            .map(ColumnValue::Double)
            .ok_or_else(|| ExecError::UnknownFunction("max() over empty set".into())),
        other => Err(ExecError::UnknownFunction(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_registry_dispatches_by_lowercased_name() {
        let reg = FunctionRegistry::new();
        let result = reg.call("ABS", &[ColumnValue::Int(-5)]).unwrap();
        assert_eq!(result, ColumnValue::Double(5.0));
    }

    #[test]
    fn unknown_function_errors() {
        let reg = FunctionRegistry::new();
        assert!(reg.call("not_a_function", &[]).is_err());
    }

    #[test]
    fn substring_is_one_indexed() {
        let result = fn_substring(&[ColumnValue::Varchar("hello".into()), ColumnValue::Int(2), ColumnValue::Int(3)]).unwrap();
        assert_eq!(result, ColumnValue::Str("ell".into()));
    }

    #[test]
    fn aggregates_sum_and_count_skip_nulls() {
        let values = vec![ColumnValue::Int(1), ColumnValue::Null, ColumnValue::Int(3)];
        assert_eq!(evaluate_aggregate("count", &values).unwrap(), ColumnValue::Int(2));
        assert_eq!(evaluate_aggregate("sum", &values).unwrap(), ColumnValue::Double(4.0));
    }
}
