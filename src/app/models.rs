//! Body models and enums used by the tutorial endpoints.
//!
//! Each model has two faces: a [`ModelSpec`] the validator checks requests
//! against, and a serde struct handlers receive once validation passed.

use crate::schema::{EnumSpec, FieldSpec, ModelSpec, SemanticType};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelName {
    Alexnet,
    Resnet,
    Lenet,
}

impl ModelName {
    pub const ALL: [&'static str; 3] = ["alexnet", "resnet", "lenet"];

    #[must_use]
    pub fn spec() -> EnumSpec {
        EnumSpec::new("ModelName", Self::ALL)
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ModelName::Alexnet => "Deep learning FTW!",
            ModelName::Lenet => "LeCNN all the images",
            ModelName::Resnet => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub name: String,
}

impl Image {
    #[must_use]
    pub fn spec() -> ModelSpec {
        ModelSpec::new("Image")
            .field(FieldSpec::new("url", SemanticType::Url))
            .field(FieldSpec::new("name", SemanticType::String))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub tax: Option<f64>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub images: Option<Vec<Image>>,
}

impl Item {
    #[must_use]
    pub fn spec() -> ModelSpec {
        ModelSpec::new("Item")
            .field(FieldSpec::new("name", SemanticType::String))
            .field(
                FieldSpec::new("description", SemanticType::String)
                    .optional()
                    .max_length(300)
                    .title("The description of the item"),
            )
            .field(
                FieldSpec::new("price", SemanticType::Float)
                    .gt(0.0)
                    .description("Price must be greater than zero"),
            )
            .field(FieldSpec::new("tax", SemanticType::Float).optional())
            .field(
                FieldSpec::new("tags", SemanticType::set_of(SemanticType::String))
                    .default_value(json!([])),
            )
            .field(
                FieldSpec::new("images", SemanticType::list_of(Image::spec().into_type()))
                    .optional(),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub usename: String,
    pub full_name: Option<String>,
}

impl User {
    #[must_use]
    pub fn spec() -> ModelSpec {
        ModelSpec::new("User")
            .field(FieldSpec::new("usename", SemanticType::String))
            .field(FieldSpec::new("full_name", SemanticType::String).optional())
    }
}
