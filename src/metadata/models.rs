use once_cell::sync::Lazy;
use regex::Regex;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

use crate::model::file_types::FileTypes;
use crate::model::response::BasicMessage;

/// slicer settings for resin prints. Stored as json on the item
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct PrintSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_exposure_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_layers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lift_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lift_speed: Option<f64>,
}

/// everything known about a single item, as returned by the api
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ItemMetadata {
    pub id: u32,
    pub file_path: String,
    pub file_name: String,
    pub file_type: FileTypes,
    pub parent_folder_id: Option<u32>,
    pub description: Option<String>,
    pub date_added: String,
    pub last_modified: String,
    /// tags directly on the item, sorted by name
    pub tags: Vec<String>,
    pub resin: Option<String>,
    pub layer_height: Option<f64>,
    pub supports_needed: bool,
    pub notes: Option<String>,
    pub print_settings: Option<PrintSettings>,
    pub file_size: u64,
}

/// The fields a client sends to create or update an item.
///
/// `file_path` is only read from the body for `POST /metadata`, the other endpoints take it from the url.
/// Any parent id sent by the client is ignored, it is always derived from the path
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct MetadataInput {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    /// a [`FileTypes`] label. The existing type is kept when this is absent
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resin: Option<String>,
    #[serde(default)]
    pub layer_height: Option<f64>,
    #[serde(default)]
    pub supports_needed: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub print_settings: Option<PrintSettings>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
#[serde(crate = "rocket::serde")]
pub struct BatchItem {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// applies the same `updates` to every entry in `items`
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
#[serde(crate = "rocket::serde")]
pub struct BatchRequest {
    #[serde(default)]
    pub items: Option<Vec<BatchItem>>,
    #[serde(default)]
    pub updates: Option<MetadataInput>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct BatchResponse {
    pub total_processed: u32,
    pub success_count: u32,
    pub error_count: u32,
    pub message: String,
}

/// filters for listing metadata. Every `Some` / non-empty filter narrows the result
#[derive(Debug, PartialEq, Clone, Default)]
pub struct MetadataQuery {
    /// items directly tagged with any of these
    pub tags: Vec<String>,
    pub file_type: Option<String>,
    /// only direct children of the item at this path
    pub parent_folder: Option<String>,
    /// substring of the name or description, ignoring case
    pub search: Option<String>,
}

#[derive(Responder)]
pub enum GetMetadataResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<ItemMetadata>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum SaveMetadataResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<ItemMetadata>),
    #[response(status = 400, content_type = "json")]
    BadRequest(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum BatchMetadataResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<BatchResponse>),
    #[response(status = 400, content_type = "json")]
    BadRequest(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum ListMetadataResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<Vec<ItemMetadata>>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum GetHierarchyResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<Vec<ItemMetadata>>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum GetCategoriesResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<Vec<String>>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

// ----------------------------------

//language=RegExp
static PATH_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new("^[^/]+(/[^/]+)*$").unwrap());
//language=RegExp
static DOT_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new("(^|/)\\.{1,2}(/|$)").unwrap());

/// `true` if `path` is relative and made up of only real segments (no empty, `.`, or `..` segments)
pub fn is_valid_item_path(path: &str) -> bool {
    PATH_SHAPE.is_match(path) && !DOT_SEGMENT.is_match(path)
}

impl MetadataQuery {
    pub fn new(
        tags: Vec<String>,
        file_type: Option<String>,
        parent_folder: Option<String>,
        search: Option<String>,
    ) -> Self {
        let not_blank = |s: &String| !s.trim().is_empty();
        Self {
            tags: tags.into_iter().filter(not_blank).collect(),
            file_type: file_type.filter(not_blank),
            parent_folder: parent_folder.filter(not_blank),
            search: search.filter(not_blank),
        }
    }
}
