use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Where a parameter's raw value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSource {
    /// Named segment of the route template
    Path,
    /// Query string
    Query,
    /// Singular value merged into the JSON body under its own key
    BodyField,
    /// Structured object decoded from the JSON body
    BodyModel,
}

impl ParameterSource {
    /// First element of an error `loc` for parameters from this source.
    #[must_use]
    pub fn loc_root(self) -> &'static str {
        match self {
            ParameterSource::Path => "path",
            ParameterSource::Query => "query",
            ParameterSource::BodyField | ParameterSource::BodyModel => "body",
        }
    }

    #[must_use]
    pub fn is_body(self) -> bool {
        matches!(self, ParameterSource::BodyField | ParameterSource::BodyModel)
    }
}

impl fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterSource::Path => write!(f, "path"),
            ParameterSource::Query => write!(f, "query"),
            ParameterSource::BodyField => write!(f, "body-field"),
            ParameterSource::BodyModel => write!(f, "body-model"),
        }
    }
}

/// Closed set of string literals accepted by an enum-typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumSpec {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        self.values.iter().any(|v| v == candidate)
    }

    /// Human listing used in error messages: `'a', 'b' or 'c'`.
    #[must_use]
    pub fn expected(&self) -> String {
        let quoted: Vec<String> = self.values.iter().map(|v| format!("'{v}'")).collect();
        match quoted.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        }
    }
}

/// Declared type of a parameter or model field.
///
/// Validation dispatches on this tag; there is no runtime reflection.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticType {
    Integer,
    Float,
    Boolean,
    String,
    /// Absolute `http`/`https` URL
    Url,
    Enum(EnumSpec),
    /// Nested object validated field by field
    Object(Arc<ModelSpec>),
    /// Ordered collection
    List(Box<SemanticType>),
    /// Unordered collection; duplicates are collapsed
    Set(Box<SemanticType>),
}

impl SemanticType {
    pub fn list_of(item: SemanticType) -> Self {
        SemanticType::List(Box::new(item))
    }

    pub fn set_of(item: SemanticType) -> Self {
        SemanticType::Set(Box::new(item))
    }

    /// Short name used in listings and lint messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            SemanticType::Integer => "integer".to_string(),
            SemanticType::Float => "float".to_string(),
            SemanticType::Boolean => "boolean".to_string(),
            SemanticType::String => "string".to_string(),
            SemanticType::Url => "url".to_string(),
            SemanticType::Enum(e) => format!("enum {}", e.name),
            SemanticType::Object(m) => format!("object {}", m.name),
            SemanticType::List(item) => format!("list<{}>", item.type_name()),
            SemanticType::Set(item) => format!("set<{}>", item.type_name()),
        }
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            SemanticType::Object(_) | SemanticType::List(_) | SemanticType::Set(_)
        )
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Integer | SemanticType::Float)
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, SemanticType::List(_) | SemanticType::Set(_))
    }

    /// Types whose length can be constrained.
    #[must_use]
    pub fn is_sized(&self) -> bool {
        self.is_collection() || matches!(self, SemanticType::String | SemanticType::Url)
    }
}

/// Field-level constraints. Bounds are compared as `f64`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub gt: Option<f64>,
    pub ge: Option<f64>,
    pub lt: Option<f64>,
    pub le: Option<f64>,
}

impl Constraints {
    #[must_use]
    pub fn has_bounds(&self) -> bool {
        self.gt.is_some() || self.ge.is_some() || self.lt.is_some() || self.le.is_some()
    }

    #[must_use]
    pub fn has_length(&self) -> bool {
        self.min_length.is_some() || self.max_length.is_some()
    }
}

/// What happens when a value is absent from the request.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Absence is a `missing` error
    Required,
    /// Absence yields this value (not re-validated)
    Default(Value),
    /// Absence yields `null`
    Optional,
}

/// One named, typed, constrained value: a parameter or a model field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: SemanticType,
    pub constraints: Constraints,
    pub presence: Presence,
    /// Whether an explicit JSON `null` is accepted
    pub nullable: bool,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl FieldSpec {
    /// A required, non-nullable field.
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
            constraints: Constraints::default(),
            presence: Presence::Required,
            nullable: false,
            title: None,
            description: None,
        }
    }

    /// Absent means `null`; explicit `null` is accepted.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.presence = Presence::Default(value);
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn min_length(mut self, n: usize) -> Self {
        self.constraints.min_length = Some(n);
        self
    }

    #[must_use]
    pub fn max_length(mut self, n: usize) -> Self {
        self.constraints.max_length = Some(n);
        self
    }

    #[must_use]
    pub fn gt(mut self, bound: f64) -> Self {
        self.constraints.gt = Some(bound);
        self
    }

    #[must_use]
    pub fn ge(mut self, bound: f64) -> Self {
        self.constraints.ge = Some(bound);
        self
    }

    #[must_use]
    pub fn lt(mut self, bound: f64) -> Self {
        self.constraints.lt = Some(bound);
        self
    }

    #[must_use]
    pub fn le(mut self, bound: f64) -> Self {
        self.constraints.le = Some(bound);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// A named nested object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Wrap into a shareable object type.
    #[must_use]
    pub fn into_type(self) -> SemanticType {
        SemanticType::Object(Arc::new(self))
    }
}

/// A declared endpoint input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub source: ParameterSource,
    pub field: FieldSpec,
}

impl ParameterSpec {
    pub fn path(field: FieldSpec) -> Self {
        Self {
            source: ParameterSource::Path,
            field,
        }
    }

    pub fn query(field: FieldSpec) -> Self {
        Self {
            source: ParameterSource::Query,
            field,
        }
    }

    pub fn body_field(field: FieldSpec) -> Self {
        Self {
            source: ParameterSource::BodyField,
            field,
        }
    }

    pub fn body_model(field: FieldSpec) -> Self {
        Self {
            source: ParameterSource::BodyModel,
            field,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.field.name
    }
}

/// How declared body parameters map onto the JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyLayout {
    /// A lone body model is the whole payload; anything else is keyed by name
    #[default]
    Auto,
    /// Always keyed by parameter name
    Embedded,
}
