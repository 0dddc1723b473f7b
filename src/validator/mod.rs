//! # Validator Module
//!
//! Checks one request against an [`EndpointDescriptor`] and produces either
//! the coerced arguments for the handler or the complete list of field
//! errors.
//!
//! Validation is all-or-nothing: [`validate_request`] never returns a partial
//! mapping. Every parameter is attempted, so a request with a bad path
//! segment and a bad body field reports both.
//!
//! ## Error locations
//!
//! Each error carries a `loc` path rooted at its source:
//!
//! - `["path", "item_id"]`
//! - `["query", "limit"]`
//! - `["body", "price"]` when a lone model is the whole body
//! - `["body", "item", "images", 0, "url"]` when the body is keyed by name

mod coerce;
mod error;
mod model;

pub use coerce::parse_bool;
pub use error::{ErrorKind, FieldError, Loc, LocItem};

use crate::router::ParamVec;
use crate::schema::{EndpointDescriptor, ParameterSource, ParameterSpec};
use model::{validate_json_field, validate_text_collection, validate_text_field};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Coerced handler arguments, keyed by parameter name.
///
/// Every declared parameter is present: absent optional inputs hold their
/// default or `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs(Map<String, Value>);

impl ValidatedArgs {
    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// String argument treated as absent when `null` or empty.
    #[must_use]
    pub fn get_opt_str(&self, name: &str) -> Option<&str> {
        self.get_str(name).filter(|s| !s.is_empty())
    }

    /// Deserialize one argument, typically a body model.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing or does not fit `T`.
    pub fn model<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self
            .0
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' is not present"))?;
        serde_json::from_value(value.clone())
            .map_err(|e| anyhow::anyhow!("argument '{name}' does not fit: {e}"))
    }

    /// Deserialize the whole argument map into one struct.
    ///
    /// # Errors
    ///
    /// Fails if the arguments do not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validate path, query and body inputs against a descriptor.
///
/// `path_params` come from the route template; `query_params` keep every
/// occurrence in request order. `body` is the raw payload, with an empty
/// slice treated as no body.
///
/// # Errors
///
/// Returns every [`FieldError`] found, ordered path, query, then body.
pub fn validate_request(
    descriptor: &EndpointDescriptor,
    path_params: &ParamVec,
    query_params: &ParamVec,
    body: Option<&[u8]>,
) -> Result<ValidatedArgs, Vec<FieldError>> {
    let mut values = Map::with_capacity(descriptor.params.len());
    let mut errors = Vec::new();

    for param in descriptor.params_from(ParameterSource::Path) {
        let raw = last_value(path_params, param.name());
        let loc = Loc::root("path").key(param.name());
        record(&mut values, &mut errors, param, validate_text_field(&param.field, raw, &loc));
    }

    for param in descriptor.params_from(ParameterSource::Query) {
        let loc = Loc::root("query").key(param.name());
        let result = if param.field.ty.is_collection() {
            let raws: Vec<&str> = query_params
                .iter()
                .filter(|(k, _)| k.as_ref() == param.name())
                .map(|(_, v)| v.as_str())
                .collect();
            validate_text_collection(&param.field, &raws, &loc)
        } else {
            validate_text_field(&param.field, last_value(query_params, param.name()), &loc)
        };
        record(&mut values, &mut errors, param, result);
    }

    if descriptor.expects_body() {
        // An empty body and a literal `null` both mean no body was sent.
        let decoded = match body.filter(|b| !b.is_empty()) {
            None => None,
            Some(bytes) => match serde_json::from_slice::<Value>(bytes) {
                Ok(Value::Null) => None,
                Ok(v) => Some(v),
                Err(e) => {
                    debug!(endpoint = %descriptor.name, error = %e, "Request body is not valid JSON");
                    return Err(vec![FieldError::json_invalid(&e)]);
                }
            },
        };

        let body_root = Loc::root("body");
        if descriptor.embeds_body() {
            match &decoded {
                Some(v) if !v.is_object() => errors.push(FieldError::new(
                    ErrorKind::ModelType,
                    body_root.clone(),
                    "Input should be a valid dictionary or object to extract fields from",
                    v.clone(),
                )),
                _ => {
                    let obj = decoded.as_ref().and_then(Value::as_object);
                    for param in descriptor.body_params() {
                        let raw = obj.and_then(|o| o.get(param.name()));
                        let loc = body_root.key(param.name());
                        let result = validate_json_field(&param.field, raw, &loc);
                        record(&mut values, &mut errors, param, result);
                    }
                }
            }
        } else if let Some(param) = descriptor.body_params().next() {
            let result = validate_json_field(&param.field, decoded.as_ref(), &body_root);
            record(&mut values, &mut errors, param, result);
        }
    }

    if errors.is_empty() {
        trace!(endpoint = %descriptor.name, args = values.len(), "Request validated");
        Ok(ValidatedArgs(values))
    } else {
        debug!(
            endpoint = %descriptor.name,
            error_count = errors.len(),
            "Request failed validation"
        );
        Err(errors)
    }
}

fn record(
    values: &mut Map<String, Value>,
    errors: &mut Vec<FieldError>,
    param: &ParameterSpec,
    result: Result<Value, Vec<FieldError>>,
) {
    match result {
        Ok(v) => {
            values.insert(param.field.name.clone(), v);
        }
        Err(mut e) => errors.append(&mut e),
    }
}

/// Last occurrence wins for repeated keys.
fn last_value<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}
