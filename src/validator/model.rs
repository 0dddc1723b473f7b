//! Field, object and collection validation.
//!
//! Objects validate every declared field and keep going after a failure, so
//! each failing leaf is reported once. Within a single field only the first
//! violated constraint is reported.

use super::coerce::{check_constraints, coerce_scalar, Raw};
use super::error::{ErrorKind, FieldError, Loc};
use crate::schema::{FieldSpec, ModelSpec, Presence, SemanticType};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

pub(crate) type FieldResult = Result<Value, Vec<FieldError>>;

/// Value used when the field is absent from the input.
fn absent(field: &FieldSpec, loc: &Loc) -> FieldResult {
    match &field.presence {
        Presence::Required => Err(vec![FieldError::missing(loc.clone())]),
        Presence::Default(v) => Ok(v.clone()),
        Presence::Optional => Ok(Value::Null),
    }
}

/// Validate a field taken from decoded JSON.
pub(crate) fn validate_json_field(field: &FieldSpec, raw: Option<&Value>, loc: &Loc) -> FieldResult {
    match raw {
        None => absent(field, loc),
        Some(Value::Null) if field.nullable => Ok(Value::Null),
        Some(v) => {
            let value = validate_json_value(&field.ty, v, loc)?;
            check_constraints(&field.ty, &field.constraints, &value, v, loc).map_err(|e| vec![e])?;
            Ok(value)
        }
    }
}

/// Validate a scalar field taken from a path segment or a single query value.
pub(crate) fn validate_text_field(field: &FieldSpec, raw: Option<&str>, loc: &Loc) -> FieldResult {
    let Some(text) = raw else {
        return absent(field, loc);
    };
    let value = coerce_scalar(&field.ty, Raw::Text(text), loc).map_err(|e| vec![e])?;
    let input = Value::String(text.to_string());
    check_constraints(&field.ty, &field.constraints, &value, &input, loc).map_err(|e| vec![e])?;
    Ok(value)
}

/// Validate a collection field from every occurrence of a repeated query key.
pub(crate) fn validate_text_collection(field: &FieldSpec, raws: &[&str], loc: &Loc) -> FieldResult {
    if raws.is_empty() {
        return absent(field, loc);
    }
    let (item_ty, dedupe) = match &field.ty {
        SemanticType::List(item) => (item.as_ref(), false),
        SemanticType::Set(item) => (item.as_ref(), true),
        _ => return validate_text_field(field, raws.last().copied(), loc),
    };

    let mut items = Vec::with_capacity(raws.len());
    let mut errors = Vec::new();
    for (i, raw) in raws.iter().enumerate() {
        match coerce_scalar(item_ty, Raw::Text(raw), &loc.index(i)) {
            Ok(v) => items.push(v),
            Err(e) => errors.push(e),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    if dedupe {
        items = dedupe_values(items);
    }
    let value = Value::Array(items);
    let input = Value::Array(raws.iter().map(|s| Value::String((*s).to_string())).collect());
    check_constraints(&field.ty, &field.constraints, &value, &input, loc).map_err(|e| vec![e])?;
    Ok(value)
}

fn validate_json_value(ty: &SemanticType, raw: &Value, loc: &Loc) -> FieldResult {
    match ty {
        SemanticType::Object(model) => validate_object(model, raw, loc),
        SemanticType::List(item) => validate_sequence(ty, item, raw, loc, false),
        SemanticType::Set(item) => validate_sequence(ty, item, raw, loc, true),
        scalar => coerce_scalar(scalar, Raw::Json(raw), loc).map_err(|e| vec![e]),
    }
}

/// Validate a JSON object against a model.
///
/// The result contains exactly the declared fields, with defaults filled in.
/// Undeclared keys are dropped.
pub(crate) fn validate_object(model: &ModelSpec, raw: &Value, loc: &Loc) -> FieldResult {
    let Value::Object(obj) = raw else {
        return Err(vec![FieldError::new(
            ErrorKind::ModelType,
            loc.clone(),
            "Input should be a valid dictionary or object to extract fields from",
            raw.clone(),
        )
        .with_ctx(json!({ "class_name": model.name }))]);
    };

    let mut out = Map::with_capacity(model.fields.len());
    let mut errors = Vec::new();
    for field in &model.fields {
        match validate_json_field(field, obj.get(&field.name), &loc.key(&field.name)) {
            Ok(v) => {
                out.insert(field.name.clone(), v);
            }
            Err(mut e) => errors.append(&mut e),
        }
    }
    if errors.is_empty() {
        Ok(Value::Object(out))
    } else {
        Err(errors)
    }
}

fn validate_sequence(
    ty: &SemanticType,
    item_ty: &SemanticType,
    raw: &Value,
    loc: &Loc,
    dedupe: bool,
) -> FieldResult {
    let Value::Array(values) = raw else {
        return coerce_scalar(ty, Raw::Json(raw), loc).map_err(|e| vec![e]);
    };

    let mut items = Vec::with_capacity(values.len());
    let mut errors = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match validate_json_value(item_ty, v, &loc.index(i)) {
            Ok(value) => items.push(value),
            Err(mut e) => errors.append(&mut e),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Value::Array(if dedupe { dedupe_values(items) } else { items }))
}

/// Collapse duplicates, keeping the first occurrence of each value.
///
/// Set items are coerced scalars, so their JSON text is a canonical key.
fn dedupe_values(items: Vec<Value>) -> Vec<Value> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EnumSpec;

    fn image() -> ModelSpec {
        ModelSpec::new("Image")
            .field(FieldSpec::new("url", SemanticType::Url))
            .field(FieldSpec::new("name", SemanticType::String))
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let field = FieldSpec::new("tags", SemanticType::set_of(SemanticType::String))
            .default_value(json!([]));
        let v = validate_json_field(&field, Some(&json!(["a", "a", "b"])), &Loc::root("body")).unwrap();
        assert_eq!(v, json!(["a", "b"]));
    }

    #[test]
    fn test_set_dedupe_keeps_first_occurrence_order() {
        let field = FieldSpec::new("ids", SemanticType::set_of(SemanticType::Integer))
            .default_value(json!([]));
        let v = validate_json_field(&field, Some(&json!([3, "1", 3, 2, 1])), &Loc::root("body")).unwrap();
        assert_eq!(v, json!([3, 1, 2]));
    }

    #[test]
    fn test_absent_fields_use_presence() {
        let loc = Loc::root("body");
        let required = FieldSpec::new("name", SemanticType::String);
        let errs = validate_json_field(&required, None, &loc).unwrap_err();
        assert_eq!(errs[0].kind, ErrorKind::Missing);

        let defaulted = FieldSpec::new("tags", SemanticType::set_of(SemanticType::String))
            .default_value(json!([]));
        assert_eq!(validate_json_field(&defaulted, None, &loc).unwrap(), json!([]));

        let optional = FieldSpec::new("tax", SemanticType::Float).optional();
        assert_eq!(validate_json_field(&optional, None, &loc).unwrap(), Value::Null);
        assert_eq!(
            validate_json_field(&optional, Some(&Value::Null), &loc).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_null_rejected_when_not_nullable() {
        let field = FieldSpec::new("tags", SemanticType::set_of(SemanticType::String))
            .default_value(json!([]));
        let errs = validate_json_field(&field, Some(&Value::Null), &Loc::root("body")).unwrap_err();
        assert_eq!(errs[0].kind, ErrorKind::SetType);
    }

    #[test]
    fn test_nested_errors_report_every_leaf() {
        let field = FieldSpec::new("images", SemanticType::list_of(image().into_type())).optional();
        let raw = json!([
            { "url": "https://ok.example", "name": "fine" },
            { "url": "nope", "name": 5 },
            { "name": "no url" }
        ]);
        let errs = validate_json_field(&field, Some(&raw), &Loc::root("body").key("images")).unwrap_err();
        let locs: Vec<String> = errs.iter().map(|e| e.loc.to_string()).collect();
        assert_eq!(
            locs,
            vec!["body.images.1.url", "body.images.1.name", "body.images.2.url"]
        );
        assert_eq!(errs[2].kind, ErrorKind::Missing);
    }

    #[test]
    fn test_object_drops_unknown_keys_and_fills_defaults() {
        let model = ModelSpec::new("User")
            .field(FieldSpec::new("usename", SemanticType::String))
            .field(FieldSpec::new("full_name", SemanticType::String).optional());
        let v = validate_object(&model, &json!({ "usename": "x", "extra": 1 }), &Loc::root("body")).unwrap();
        assert_eq!(v, json!({ "usename": "x", "full_name": null }));

        let errs = validate_object(&model, &json!("x"), &Loc::root("body")).unwrap_err();
        assert_eq!(errs[0].kind, ErrorKind::ModelType);
    }

    #[test]
    fn test_query_collection_coerces_each_occurrence() {
        let field = FieldSpec::new("ids", SemanticType::set_of(SemanticType::Integer)).optional();
        let loc = Loc::root("query").key("ids");
        assert_eq!(
            validate_text_collection(&field, &["1", "2", "1"], &loc).unwrap(),
            json!([1, 2])
        );
        let errs = validate_text_collection(&field, &["1", "x"], &loc).unwrap_err();
        assert_eq!(errs[0].loc.to_string(), "query.ids.1");
        assert_eq!(validate_text_collection(&field, &[], &loc).unwrap(), Value::Null);
    }

    #[test]
    fn test_enum_text_field() {
        let field = FieldSpec::new(
            "model_name",
            SemanticType::Enum(EnumSpec::new("ModelName", ["alexnet", "resnet", "lenet"])),
        );
        let loc = Loc::root("path").key("model_name");
        assert_eq!(validate_text_field(&field, Some("alexnet"), &loc).unwrap(), json!("alexnet"));
        assert_eq!(
            validate_text_field(&field, Some("vgg"), &loc).unwrap_err()[0].kind,
            ErrorKind::Enum
        );
    }
}
