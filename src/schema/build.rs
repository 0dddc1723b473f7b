use super::template::PathTemplate;
use super::types::{BodyLayout, FieldSpec, ParameterSource, ParameterSpec, SemanticType};
use crate::dispatcher::{HandlerError, HandlerFn};
use crate::validator::ValidatedArgs;
use http::Method;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// A problem found while registering an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Where the problem is, e.g. `GET /items/{item_id} > query.limit`
    pub location: String,
    /// Short machine-friendly kind, e.g. `missing_path_param`
    pub kind: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SchemaIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Registration refused; every issue found is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub endpoint: String,
    pub issues: Vec<SchemaIssue>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "endpoint '{}' has {} schema issue(s)",
            self.endpoint,
            self.issues.len()
        )?;
        for issue in &self.issues {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// A registered endpoint: route, declared inputs and handler.
///
/// Immutable once built; shared behind `Arc` by the router.
pub struct EndpointDescriptor {
    pub name: String,
    pub method: Method,
    pub path: PathTemplate,
    pub params: Vec<ParameterSpec>,
    pub body_layout: BodyLayout,
    pub summary: Option<String>,
    handler: HandlerFn,
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("body_layout", &self.body_layout)
            .finish_non_exhaustive()
    }
}

impl EndpointDescriptor {
    /// Start declaring an endpoint.
    pub fn builder(name: impl Into<String>, method: Method, path: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder {
            name: name.into(),
            method,
            path: path.into(),
            params: Vec::new(),
            body_layout: BodyLayout::default(),
            summary: None,
        }
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerFn {
        &self.handler
    }

    pub fn params_from(&self, source: ParameterSource) -> impl Iterator<Item = &ParameterSpec> {
        self.params.iter().filter(move |p| p.source == source)
    }

    pub fn body_params(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.params.iter().filter(|p| p.source.is_body())
    }

    #[must_use]
    pub fn expects_body(&self) -> bool {
        self.params.iter().any(|p| p.source.is_body())
    }

    /// Whether body parameters are keyed by name inside one JSON object.
    #[must_use]
    pub fn embeds_body(&self) -> bool {
        match self.body_layout {
            BodyLayout::Embedded => true,
            BodyLayout::Auto => {
                let models = self.params_from(ParameterSource::BodyModel).count();
                let fields = self.params_from(ParameterSource::BodyField).count();
                !(models == 1 && fields == 0)
            }
        }
    }

    /// `METHOD /template` label used in logs and listings.
    #[must_use]
    pub fn route_label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Builder returned by [`EndpointDescriptor::builder`].
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    name: String,
    method: Method,
    path: String,
    params: Vec<ParameterSpec>,
    body_layout: BodyLayout,
    summary: Option<String>,
}

impl EndpointBuilder {
    #[must_use]
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn body_layout(mut self, layout: BodyLayout) -> Self {
        self.body_layout = layout;
        self
    }

    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Finish with a closure handler.
    ///
    /// # Errors
    ///
    /// Returns every [`SchemaIssue`] found in the declaration.
    pub fn handler<F>(self, handler: F) -> Result<EndpointDescriptor, SchemaError>
    where
        F: Fn(ValidatedArgs) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.handler_fn(Arc::new(handler))
    }

    /// Finish with an already type-erased handler.
    ///
    /// # Errors
    ///
    /// Returns every [`SchemaIssue`] found in the declaration.
    pub fn handler_fn(self, handler: HandlerFn) -> Result<EndpointDescriptor, SchemaError> {
        let label = format!("{} {}", self.method, self.path);
        let template = PathTemplate::parse(&self.path);

        let mut issues = Vec::new();
        if let Err(msg) = &template {
            issues.push(SchemaIssue::new(&label, "bad_template", msg.clone()));
        }
        if let Ok(t) = &template {
            lint_path_params(&label, t, &self.params, &mut issues);
        }
        lint_params(&label, &self.params, &mut issues);

        match template {
            Ok(path) if issues.is_empty() => {
                debug!(
                    endpoint = %self.name,
                    route = %label,
                    params = self.params.len(),
                    "Endpoint descriptor built"
                );
                Ok(EndpointDescriptor {
                    name: self.name,
                    method: self.method,
                    path,
                    params: self.params,
                    body_layout: self.body_layout,
                    summary: self.summary,
                    handler,
                })
            }
            _ => {
                for issue in &issues {
                    error!(
                        endpoint = %self.name,
                        kind = %issue.kind,
                        location = %issue.location,
                        "{}",
                        issue.message
                    );
                }
                Err(SchemaError {
                    endpoint: self.name,
                    issues,
                })
            }
        }
    }
}

fn lint_path_params(
    label: &str,
    template: &PathTemplate,
    params: &[ParameterSpec],
    issues: &mut Vec<SchemaIssue>,
) {
    let declared: HashSet<&str> = params
        .iter()
        .filter(|p| p.source == ParameterSource::Path)
        .map(ParameterSpec::name)
        .collect();
    let in_template: HashSet<&str> = template.param_names().iter().map(|n| n.as_ref()).collect();

    for name in template.param_names() {
        if !declared.contains(name.as_ref()) {
            issues.push(SchemaIssue::new(
                label,
                "missing_path_param",
                format!("template segment '{{{name}}}' has no path parameter"),
            ));
        }
    }
    for name in declared.difference(&in_template) {
        issues.push(SchemaIssue::new(
            format!("{label} > path.{name}"),
            "unknown_path_param",
            "path parameter does not appear in the template",
        ));
    }
}

fn lint_params(label: &str, params: &[ParameterSpec], issues: &mut Vec<SchemaIssue>) {
    let mut seen = HashSet::new();
    for p in params {
        let location = format!("{label} > {}.{}", p.source.loc_root(), p.name());
        if !seen.insert(p.name()) {
            issues.push(SchemaIssue::new(
                &location,
                "duplicate_param",
                "parameter name declared more than once",
            ));
        }
        match p.source {
            ParameterSource::Path => {
                if !p.field.is_required() {
                    issues.push(SchemaIssue::new(
                        &location,
                        "optional_path_param",
                        "path parameters are always required",
                    ));
                }
                if !p.field.ty.is_scalar() {
                    issues.push(SchemaIssue::new(
                        &location,
                        "bad_path_type",
                        format!("{} cannot be taken from a path segment", p.field.ty.type_name()),
                    ));
                }
            }
            ParameterSource::Query => {
                let nested_object = match &p.field.ty {
                    SemanticType::Object(_) => true,
                    SemanticType::List(item) | SemanticType::Set(item) => !item.is_scalar(),
                    _ => false,
                };
                if nested_object {
                    issues.push(SchemaIssue::new(
                        &location,
                        "bad_query_type",
                        format!("{} cannot be taken from the query string", p.field.ty.type_name()),
                    ));
                }
            }
            ParameterSource::BodyModel => {
                if !matches!(p.field.ty, SemanticType::Object(_)) {
                    issues.push(SchemaIssue::new(
                        &location,
                        "bad_body_model",
                        format!("body model must be an object, got {}", p.field.ty.type_name()),
                    ));
                }
            }
            ParameterSource::BodyField => {}
        }
        lint_field(&location, &p.field, issues);
    }
}

fn lint_field(location: &str, field: &FieldSpec, issues: &mut Vec<SchemaIssue>) {
    let c = &field.constraints;
    if c.has_length() && !field.ty.is_sized() {
        issues.push(SchemaIssue::new(
            location,
            "bad_constraint",
            format!("length constraint on {}", field.ty.type_name()),
        ));
    }
    if let (Some(min), Some(max)) = (c.min_length, c.max_length) {
        if min > max {
            issues.push(SchemaIssue::new(
                location,
                "bad_constraint",
                format!("min_length {min} exceeds max_length {max}"),
            ));
        }
    }
    if c.has_bounds() && !field.ty.is_numeric() {
        issues.push(SchemaIssue::new(
            location,
            "bad_constraint",
            format!("numeric bound on {}", field.ty.type_name()),
        ));
    }
    lint_type(location, &field.ty, issues);
}

fn lint_type(location: &str, ty: &SemanticType, issues: &mut Vec<SchemaIssue>) {
    match ty {
        SemanticType::Enum(e) if e.values.is_empty() => {
            issues.push(SchemaIssue::new(
                location,
                "empty_enum",
                format!("enum {} declares no values", e.name),
            ));
        }
        SemanticType::Object(model) => {
            let mut seen = HashSet::new();
            for field in &model.fields {
                let nested = format!("{location}.{}", field.name);
                if !seen.insert(field.name.as_str()) {
                    issues.push(SchemaIssue::new(
                        &nested,
                        "duplicate_field",
                        format!("model {} declares this field more than once", model.name),
                    ));
                }
                lint_field(&nested, field, issues);
            }
        }
        SemanticType::List(item) => lint_type(location, item, issues),
        SemanticType::Set(item) => {
            if !item.is_scalar() {
                issues.push(SchemaIssue::new(
                    location,
                    "bad_set_item",
                    format!("set items must be scalar, got {}", item.type_name()),
                ));
            }
            lint_type(location, item, issues);
        }
        _ => {}
    }
}
