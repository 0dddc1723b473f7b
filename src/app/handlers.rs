use super::models::{Item, ModelName, User};
use crate::dispatcher::HandlerError;
use crate::typed::Handler;
use serde::{Deserialize, Serialize};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct RootRequest {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Greeting {
    pub message: &'static str,
}

pub struct RootHandler;

impl Handler for RootHandler {
    type Request = RootRequest;
    type Response = Greeting;

    fn handle(&self, _req: RootRequest) -> Result<Greeting, HandlerError> {
        Ok(Greeting {
            message: "Hello World",
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub item: Item,
    pub extra_param: Option<String>,
}

pub struct CreateItemHandler;

impl Handler for CreateItemHandler {
    type Request = CreateItemRequest;
    type Response = Item;

    /// Echoes the validated item; `extra_param` is accepted but not echoed.
    fn handle(&self, req: CreateItemRequest) -> Result<Item, HandlerError> {
        Ok(req.item)
    }
}

#[derive(Debug, Deserialize)]
pub struct GetModelRequest {
    pub model_name: ModelName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub model_name: ModelName,
    pub message: &'static str,
}

pub struct GetModelHandler;

impl Handler for GetModelHandler {
    type Request = GetModelRequest;
    type Response = ModelInfo;

    fn handle(&self, req: GetModelRequest) -> Result<ModelInfo, HandlerError> {
        Ok(ModelInfo {
            model_name: req.model_name,
            message: req.model_name.message(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReadItemRequest {
    pub item_id: i64,
    pub skip: i64,
    pub limit: i64,
    pub extra_param: Option<String>,
    pub my_bool: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadItemResponse {
    pub item_id: i64,
    pub skip: i64,
    pub limit: i64,
    pub my_bool: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_param: Option<String>,
}

pub struct ReadItemHandler;

impl Handler for ReadItemHandler {
    type Request = ReadItemRequest;
    type Response = ReadItemResponse;

    fn handle(&self, req: ReadItemRequest) -> Result<ReadItemResponse, HandlerError> {
        Ok(ReadItemResponse {
            item_id: req.item_id,
            skip: req.skip,
            limit: req.limit,
            my_bool: req.my_bool,
            extra_param: non_empty(req.extra_param),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub item_id: i64,
    pub item: Item,
    pub user: User,
    pub importance: i64,
    pub extra_param: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateItemResponse {
    pub importance: i64,
    pub item: Item,
    pub item_id: i64,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_param: Option<String>,
}

pub struct UpdateItemHandler;

impl Handler for UpdateItemHandler {
    type Request = UpdateItemRequest;
    type Response = UpdateItemResponse;

    fn handle(&self, req: UpdateItemRequest) -> Result<UpdateItemResponse, HandlerError> {
        Ok(UpdateItemResponse {
            importance: req.importance,
            item: req.item,
            item_id: req.item_id,
            user: req.user,
            extra_param: non_empty(req.extra_param),
        })
    }
}

crate::impl_from_args!(
    RootRequest,
    CreateItemRequest,
    GetModelRequest,
    ReadItemRequest,
    UpdateItemRequest,
);
