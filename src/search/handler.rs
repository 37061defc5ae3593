use rocket::serde::json::Json;
use rocket::State;

use crate::model::response::BasicMessage;
use crate::repository::Database;
use crate::search::models::{SearchRequest, SearchResponse};
use crate::search::service;

/// Searches the item tree. `tag` may be passed multiple times and every tag must match.
/// Results are collapsed to the model folders the matches live in
#[get("/?<query>&<tag>&<fileType>")]
#[allow(non_snake_case)]
pub fn search_items(
    query: Option<String>,
    tag: Vec<String>,
    fileType: Option<String>,
    database: &State<Database>,
) -> SearchResponse {
    let request = SearchRequest::new(query, tag, fileType);
    match service::search_database(&request, database) {
        Ok(results) => SearchResponse::Success(Json::from(results)),
        Err(_) => SearchResponse::GenericError(BasicMessage::new("Search failed")),
    }
}
