//! Scalar coercion and constraint checks.
//!
//! Every scalar arrives either as text (path segment, query value) or as a
//! decoded JSON value (body). Coercion is lax in the usual way: numeric
//! strings are accepted for numbers and the boolean vocabulary is accepted
//! for booleans, but a JSON number is never accepted where a string is
//! declared.

use super::error::{ErrorKind, FieldError, Loc};
use crate::schema::{Constraints, EnumSpec, SemanticType};
use serde_json::{json, Value};

/// Raw scalar input before coercion.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Raw<'a> {
    Text(&'a str),
    Json(&'a Value),
}

impl<'a> Raw<'a> {
    pub(crate) fn to_input(self) -> Value {
        match self {
            Raw::Text(s) => Value::String(s.to_string()),
            Raw::Json(v) => v.clone(),
        }
    }

    /// Text form, if the input is textual at all.
    fn as_text(self) -> Option<&'a str> {
        match self {
            Raw::Text(s) => Some(s),
            Raw::Json(Value::String(s)) => Some(s.as_str()),
            Raw::Json(_) => None,
        }
    }
}

/// Interpret a boolean token.
///
/// Accepts `true/false/1/0/yes/no/on/off`, case-insensitive. Anything else
/// is rejected.
#[must_use]
pub fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Coerce a scalar to its declared type.
///
/// Structured types are handled by the caller; passing one here reports a
/// type error for that structure.
pub(crate) fn coerce_scalar(ty: &SemanticType, raw: Raw<'_>, loc: &Loc) -> Result<Value, FieldError> {
    match ty {
        SemanticType::Integer => coerce_integer(raw, loc),
        SemanticType::Float => coerce_float(raw, loc),
        SemanticType::Boolean => coerce_bool(raw, loc),
        SemanticType::String => match raw.as_text() {
            Some(s) => Ok(Value::String(s.to_string())),
            None => Err(type_error(ErrorKind::StringType, "Input should be a valid string", raw, loc)),
        },
        SemanticType::Url => coerce_url(raw, loc),
        SemanticType::Enum(spec) => coerce_enum(spec, raw, loc),
        SemanticType::Object(_) => Err(type_error(
            ErrorKind::ModelType,
            "Input should be a valid dictionary or object to extract fields from",
            raw,
            loc,
        )),
        SemanticType::List(_) => Err(type_error(ErrorKind::ListType, "Input should be a valid list", raw, loc)),
        SemanticType::Set(_) => Err(type_error(ErrorKind::SetType, "Input should be a valid set", raw, loc)),
    }
}

fn type_error(kind: ErrorKind, msg: &str, raw: Raw<'_>, loc: &Loc) -> FieldError {
    FieldError::new(kind, loc.clone(), msg, raw.to_input())
}

fn parse_int_text(s: &str, raw: Raw<'_>, loc: &Loc) -> Result<Value, FieldError> {
    s.trim().parse::<i64>().map(Value::from).map_err(|_| {
        type_error(
            ErrorKind::IntParsing,
            "Input should be a valid integer, unable to parse string as an integer",
            raw,
            loc,
        )
    })
}

fn coerce_integer(raw: Raw<'_>, loc: &Loc) -> Result<Value, FieldError> {
    match raw {
        Raw::Text(s) => parse_int_text(s, raw, loc),
        Raw::Json(Value::String(s)) => parse_int_text(s, raw, loc),
        Raw::Json(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() != 0.0 => Err(type_error(
                    ErrorKind::IntFromFloat,
                    "Input should be a valid integer, got a number with a fractional part",
                    raw,
                    loc,
                )),
                Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(Value::from(f as i64)),
                _ => Err(type_error(
                    ErrorKind::IntParsing,
                    "Input should be a valid integer, unable to parse number as an integer",
                    raw,
                    loc,
                )),
            }
        }
        Raw::Json(_) => Err(type_error(ErrorKind::IntType, "Input should be a valid integer", raw, loc)),
    }
}

fn parse_float_text(s: &str, raw: Raw<'_>, loc: &Loc) -> Result<Value, FieldError> {
    match s.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Value::from(f)),
        _ => Err(type_error(
            ErrorKind::FloatParsing,
            "Input should be a valid number, unable to parse string as a number",
            raw,
            loc,
        )),
    }
}

fn coerce_float(raw: Raw<'_>, loc: &Loc) -> Result<Value, FieldError> {
    match raw {
        Raw::Text(s) => parse_float_text(s, raw, loc),
        Raw::Json(Value::String(s)) => parse_float_text(s, raw, loc),
        Raw::Json(Value::Number(n)) => match n.as_f64() {
            Some(f) => Ok(Value::from(f)),
            None => Err(type_error(ErrorKind::FloatType, "Input should be a valid number", raw, loc)),
        },
        Raw::Json(_) => Err(type_error(ErrorKind::FloatType, "Input should be a valid number", raw, loc)),
    }
}

fn coerce_bool(raw: Raw<'_>, loc: &Loc) -> Result<Value, FieldError> {
    let parsing = || {
        type_error(
            ErrorKind::BoolParsing,
            "Input should be a valid boolean, unable to interpret input",
            raw,
            loc,
        )
    };
    match raw {
        Raw::Text(s) => parse_bool(s).map(Value::Bool).ok_or_else(parsing),
        Raw::Json(Value::Bool(b)) => Ok(Value::Bool(*b)),
        Raw::Json(Value::String(s)) => parse_bool(s).map(Value::Bool).ok_or_else(parsing),
        Raw::Json(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(parsing()),
        },
        Raw::Json(_) => Err(type_error(ErrorKind::BoolType, "Input should be a valid boolean", raw, loc)),
    }
}

fn coerce_url(raw: Raw<'_>, loc: &Loc) -> Result<Value, FieldError> {
    let Some(text) = raw.as_text() else {
        return Err(type_error(ErrorKind::UrlType, "URL input should be a string or URL", raw, loc));
    };
    let parsed = url::Url::parse(text).map_err(|e| {
        type_error(ErrorKind::UrlParsing, &format!("Input should be a valid URL, {e}"), raw, loc)
            .with_ctx(json!({ "error": e.to_string() }))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(
            type_error(ErrorKind::UrlScheme, "URL scheme should be 'http' or 'https'", raw, loc)
                .with_ctx(json!({ "expected_schemes": "'http' or 'https'" })),
        );
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(
            type_error(ErrorKind::UrlParsing, "Input should be a valid URL, empty host", raw, loc)
                .with_ctx(json!({ "error": "empty host" })),
        );
    }
    Ok(Value::String(parsed.to_string()))
}

fn coerce_enum(spec: &EnumSpec, raw: Raw<'_>, loc: &Loc) -> Result<Value, FieldError> {
    match raw.as_text() {
        Some(s) if spec.contains(s) => Ok(Value::String(s.to_string())),
        _ => {
            let expected = spec.expected();
            Err(type_error(
                ErrorKind::Enum,
                &format!("Input should be {expected}"),
                raw,
                loc,
            )
            .with_ctx(json!({ "expected": expected })))
        }
    }
}

/// Bound rendered the way a caller wrote it: `0` rather than `0.0`.
fn bound_value(bound: f64) -> Value {
    if bound.fract() == 0.0 && bound.abs() < 9.0e15 {
        Value::from(bound as i64)
    } else {
        Value::from(bound)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Check a coerced value against its constraints.
///
/// Checks run in a fixed order (bounds, then lengths) and the first failure
/// is reported.
pub(crate) fn check_constraints(
    ty: &SemanticType,
    c: &Constraints,
    value: &Value,
    input: &Value,
    loc: &Loc,
) -> Result<(), FieldError> {
    if ty.is_numeric() {
        if let Some(n) = value.as_f64() {
            let checks = [
                (c.gt, ErrorKind::GreaterThan, "gt", "greater than", n > c.gt.unwrap_or_default()),
                (c.ge, ErrorKind::GreaterThanEqual, "ge", "greater than or equal to", n >= c.ge.unwrap_or_default()),
                (c.lt, ErrorKind::LessThan, "lt", "less than", n < c.lt.unwrap_or_default()),
                (c.le, ErrorKind::LessThanEqual, "le", "less than or equal to", n <= c.le.unwrap_or_default()),
            ];
            for (bound, kind, key, phrase, ok) in checks {
                if let Some(b) = bound {
                    if !ok {
                        let shown = bound_value(b);
                        return Err(FieldError::new(
                            kind,
                            loc.clone(),
                            format!("Input should be {phrase} {shown}"),
                            input.clone(),
                        )
                        .with_ctx(json!({ key: shown })));
                    }
                }
            }
        }
    }

    let (len, is_text, label) = match (ty, value) {
        (SemanticType::String | SemanticType::Url, Value::String(s)) => (s.chars().count(), true, "String"),
        (SemanticType::List(_), Value::Array(a)) => (a.len(), false, "List"),
        (SemanticType::Set(_), Value::Array(a)) => (a.len(), false, "Set"),
        _ => return Ok(()),
    };

    if let Some(min) = c.min_length {
        if len < min {
            let (kind, msg) = if is_text {
                (
                    ErrorKind::StringTooShort,
                    format!("String should have at least {}", plural(min, "character")),
                )
            } else {
                (
                    ErrorKind::TooShort,
                    format!("{label} should have at least {} after validation, not {len}", plural(min, "item")),
                )
            };
            return Err(FieldError::new(kind, loc.clone(), msg, input.clone())
                .with_ctx(json!({ "min_length": min })));
        }
    }
    if let Some(max) = c.max_length {
        if len > max {
            let (kind, msg) = if is_text {
                (
                    ErrorKind::StringTooLong,
                    format!("String should have at most {}", plural(max, "character")),
                )
            } else {
                (
                    ErrorKind::TooLong,
                    format!("{label} should have at most {} after validation, not {len}", plural(max, "item")),
                )
            };
            return Err(FieldError::new(kind, loc.clone(), msg, input.clone())
                .with_ctx(json!({ "max_length": max })));
        }
    }
    Ok(())
}
