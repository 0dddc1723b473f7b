use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

/// One step in the path to a failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocItem {
    Key(String),
    Index(usize),
}

impl Serialize for LocItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LocItem::Key(k) => serializer.serialize_str(k),
            LocItem::Index(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

impl fmt::Display for LocItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocItem::Key(k) => f.write_str(k),
            LocItem::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Location of a value inside the request, e.g. `["body", "item", "images", 0, "url"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Loc(Vec<LocItem>);

impl Loc {
    pub fn root(source: &str) -> Self {
        Loc(vec![LocItem::Key(source.to_string())])
    }

    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        let mut items = self.0.clone();
        items.push(LocItem::Key(key.to_string()));
        Loc(items)
    }

    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        let mut items = self.0.clone();
        items.push(LocItem::Index(i));
        Loc(items)
    }

    #[must_use]
    pub fn items(&self) -> &[LocItem] {
        &self.0
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// Violated constraint. Serialised as the error's `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    JsonInvalid,
    IntType,
    IntParsing,
    IntFromFloat,
    FloatType,
    FloatParsing,
    BoolType,
    BoolParsing,
    StringType,
    StringTooShort,
    StringTooLong,
    TooShort,
    TooLong,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Enum,
    UrlType,
    UrlParsing,
    UrlScheme,
    ModelType,
    ListType,
    SetType,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Missing => "missing",
            ErrorKind::JsonInvalid => "json_invalid",
            ErrorKind::IntType => "int_type",
            ErrorKind::IntParsing => "int_parsing",
            ErrorKind::IntFromFloat => "int_from_float",
            ErrorKind::FloatType => "float_type",
            ErrorKind::FloatParsing => "float_parsing",
            ErrorKind::BoolType => "bool_type",
            ErrorKind::BoolParsing => "bool_parsing",
            ErrorKind::StringType => "string_type",
            ErrorKind::StringTooShort => "string_too_short",
            ErrorKind::StringTooLong => "string_too_long",
            ErrorKind::TooShort => "too_short",
            ErrorKind::TooLong => "too_long",
            ErrorKind::GreaterThan => "greater_than",
            ErrorKind::GreaterThanEqual => "greater_than_equal",
            ErrorKind::LessThan => "less_than",
            ErrorKind::LessThanEqual => "less_than_equal",
            ErrorKind::Enum => "enum",
            ErrorKind::UrlType => "url_type",
            ErrorKind::UrlParsing => "url_parsing",
            ErrorKind::UrlScheme => "url_scheme",
            ErrorKind::ModelType => "model_type",
            ErrorKind::ListType => "list_type",
            ErrorKind::SetType => "set_type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single constraint violation, as reported in a 422 `detail` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub loc: Loc,
    pub msg: String,
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Value>,
}

impl FieldError {
    pub fn new(kind: ErrorKind, loc: Loc, msg: impl Into<String>, input: Value) -> Self {
        Self {
            kind,
            loc,
            msg: msg.into(),
            input,
            ctx: None,
        }
    }

    #[must_use]
    pub fn with_ctx(mut self, ctx: Value) -> Self {
        self.ctx = Some(ctx);
        self
    }

    pub fn missing(loc: Loc) -> Self {
        Self::new(ErrorKind::Missing, loc, "Field required", Value::Null)
    }

    pub fn json_invalid(error: &serde_json::Error) -> Self {
        Self::new(
            ErrorKind::JsonInvalid,
            Loc::root("body"),
            "JSON decode error",
            Value::Object(serde_json::Map::new()),
        )
        .with_ctx(json!({ "error": error.to_string() }))
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.loc, self.kind, self.msg)
    }
}
