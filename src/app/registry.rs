use super::handlers::{
    CreateItemHandler, GetModelHandler, ReadItemHandler, RootHandler, UpdateItemHandler,
};
use super::models::{Item, ModelName, User};
use crate::dispatcher::Dispatcher;
use crate::middleware::TracingMiddleware;
use crate::router::Router;
use crate::schema::{EndpointDescriptor, FieldSpec, ParameterSpec, SchemaError, SemanticType};
use http::Method;
use serde_json::json;
use std::sync::Arc;

fn extra_param() -> ParameterSpec {
    ParameterSpec::query(FieldSpec::new("extra_param", SemanticType::String).optional())
}

/// Declarations for every tutorial endpoint, in registration order.
///
/// # Errors
///
/// Fails if any declaration does not pass the schema lint.
pub fn build_endpoints() -> Result<Vec<EndpointDescriptor>, SchemaError> {
    Ok(vec![
        EndpointDescriptor::builder("root", Method::GET, "/")
            .summary("First steps")
            .typed(RootHandler)?,
        EndpointDescriptor::builder("create_item", Method::POST, "/items/")
            .summary("Request body")
            .param(ParameterSpec::body_model(FieldSpec::new(
                "item",
                Item::spec().into_type(),
            )))
            .param(extra_param())
            .typed(CreateItemHandler)?,
        EndpointDescriptor::builder("get_model", Method::GET, "/models/{model_name}")
            .summary("Path parameters - predefined values")
            .param(ParameterSpec::path(FieldSpec::new(
                "model_name",
                SemanticType::Enum(ModelName::spec()),
            )))
            .typed(GetModelHandler)?,
        EndpointDescriptor::builder("read_item", Method::GET, "/items/{item_id}")
            .summary("Path, query and string validation")
            .param(ParameterSpec::path(
                FieldSpec::new("item_id", SemanticType::Integer)
                    .title("The ID of the item to get"),
            ))
            .param(ParameterSpec::query(
                FieldSpec::new("skip", SemanticType::Integer).default_value(json!(0)),
            ))
            .param(ParameterSpec::query(
                FieldSpec::new("limit", SemanticType::Integer).default_value(json!(10)),
            ))
            .param(ParameterSpec::query(
                FieldSpec::new("extra_param", SemanticType::String)
                    .optional()
                    .max_length(50),
            ))
            .param(ParameterSpec::query(
                FieldSpec::new("my_bool", SemanticType::Boolean).default_value(json!(false)),
            ))
            .typed(ReadItemHandler)?,
        EndpointDescriptor::builder("update_item", Method::PUT, "/items/{item_id}")
            .summary("Body - multiple parameters")
            .param(ParameterSpec::path(FieldSpec::new(
                "item_id",
                SemanticType::Integer,
            )))
            .param(ParameterSpec::body_model(FieldSpec::new(
                "item",
                Item::spec().into_type(),
            )))
            .param(ParameterSpec::body_model(FieldSpec::new(
                "user",
                User::spec().into_type(),
            )))
            .param(ParameterSpec::body_field(FieldSpec::new(
                "importance",
                SemanticType::Integer,
            )))
            .param(extra_param())
            .typed(UpdateItemHandler)?,
    ])
}

/// Dispatcher with every tutorial endpoint and request logging installed.
///
/// # Errors
///
/// Fails if any declaration does not pass the schema lint.
pub fn build_dispatcher() -> Result<Dispatcher, SchemaError> {
    let router = Router::from_endpoints(build_endpoints()?);
    let mut dispatcher = Dispatcher::with_router(router);
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    Ok(dispatcher)
}
