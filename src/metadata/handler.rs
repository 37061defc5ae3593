use std::path::PathBuf;

use rocket::serde::json::Json;
use rocket::State;

use crate::metadata::models::{
    BatchMetadataResponse, BatchRequest, GetCategoriesResponse, GetHierarchyResponse,
    GetMetadataResponse, ListMetadataResponse, MetadataInput, MetadataQuery, SaveMetadataResponse,
};
use crate::metadata::service;
use crate::model::error::metadata_errors::{GetMetadataError, SaveMetadataError};
use crate::model::response::BasicMessage;
use crate::repository::Database;

/// lists items filtered by tags (any of them), category, parent folder path, and a name/description search
#[get("/?<tag>&<category>&<search>&<parent>")]
pub fn list_metadata(
    tag: Vec<String>,
    category: Option<String>,
    search: Option<String>,
    parent: Option<String>,
    database: &State<Database>,
) -> ListMetadataResponse {
    let query = MetadataQuery::new(tag, category, parent, search);
    match service::query_metadata(&query, database) {
        Ok(items) => ListMetadataResponse::Success(Json::from(items)),
        Err(_) => ListMetadataResponse::GenericError(BasicMessage::new(
            "Failed to retrieve metadata. Check server logs for details",
        )),
    }
}

#[get("/categories")]
pub fn get_categories(database: &State<Database>) -> GetCategoriesResponse {
    match service::get_all_file_types(database) {
        Ok(types) => GetCategoriesResponse::Success(Json::from(types)),
        Err(_) => GetCategoriesResponse::GenericError(BasicMessage::new(
            "Failed to retrieve categories. Check server logs for details",
        )),
    }
}

/// the folders above the item, top of the tree first
#[get("/hierarchy/<path..>")]
pub fn get_hierarchy(path: PathBuf, database: &State<Database>) -> GetHierarchyResponse {
    let path = to_item_path(path);
    match service::get_hierarchy(&path, database) {
        Ok(hierarchy) => GetHierarchyResponse::Success(Json::from(hierarchy)),
        Err(GetMetadataError::NotFound) => {
            GetHierarchyResponse::NotFound(BasicMessage::new(&format!("No item exists at {path}")))
        }
        Err(GetMetadataError::DbError) => GetHierarchyResponse::GenericError(BasicMessage::new(
            "Failed to retrieve hierarchy. Check server logs for details",
        )),
    }
}

#[get("/<path..>", rank = 2)]
pub fn get_metadata(path: PathBuf, database: &State<Database>) -> GetMetadataResponse {
    let path = to_item_path(path);
    match service::get_metadata(&path, database) {
        Ok(metadata) => GetMetadataResponse::Success(Json::from(metadata)),
        Err(GetMetadataError::NotFound) => {
            GetMetadataResponse::NotFound(BasicMessage::new(&format!("No item exists at {path}")))
        }
        Err(GetMetadataError::DbError) => GetMetadataResponse::GenericError(BasicMessage::new(
            "Failed to retrieve metadata. Check server logs for details",
        )),
    }
}

/// saves the metadata for the item at `path`. Any `filePath` in the body is ignored
#[put("/<path..>", data = "<input>")]
pub fn update_metadata(
    path: PathBuf,
    input: Json<MetadataInput>,
    database: &State<Database>,
) -> SaveMetadataResponse {
    let input = MetadataInput {
        file_path: Some(to_item_path(path)),
        ..input.into_inner()
    };
    save(input, database)
}

/// saves the metadata for the item at the body's `filePath`
#[post("/", data = "<input>")]
pub fn create_metadata(input: Json<MetadataInput>, database: &State<Database>) -> SaveMetadataResponse {
    save(input.into_inner(), database)
}

#[post("/batch", data = "<request>")]
pub fn batch_update_metadata(
    request: Json<BatchRequest>,
    database: &State<Database>,
) -> BatchMetadataResponse {
    match service::batch_save(request.into_inner(), database) {
        Ok(summary) => BatchMetadataResponse::Success(Json::from(summary)),
        Err(_) => BatchMetadataResponse::BadRequest(BasicMessage::new(
            "Batch requests need both items and updates",
        )),
    }
}

fn save(input: MetadataInput, database: &Database) -> SaveMetadataResponse {
    match service::save_metadata(input, database) {
        Ok(metadata) => SaveMetadataResponse::Success(Json::from(metadata)),
        Err(SaveMetadataError::MissingFields) => SaveMetadataResponse::BadRequest(
            BasicMessage::new("File path and name are required"),
        ),
        Err(SaveMetadataError::InvalidPath) => SaveMetadataResponse::BadRequest(
            BasicMessage::new("File path must be relative and cannot contain empty, . or .. segments"),
        ),
        Err(SaveMetadataError::InvalidCategory) => SaveMetadataResponse::BadRequest(
            BasicMessage::new("Category is not a known item type"),
        ),
        Err(SaveMetadataError::DbError) => SaveMetadataResponse::GenericError(BasicMessage::new(
            "Failed to save metadata. Check server logs for details",
        )),
    }
}

/// joins the url segments back into a `/`-separated item path
fn to_item_path(path: PathBuf) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
