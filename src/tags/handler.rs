use rocket::serde::json::Json;
use rocket::State;

use crate::model::response::BasicMessage;
use crate::repository::Database;
use crate::tags::models::GetTagsResponse;
use crate::tags::service;

/// lists the names of every tag that has ever been used, sorted
#[get("/")]
pub fn get_all_tags(database: &State<Database>) -> GetTagsResponse {
    match service::get_all_tags(database) {
        Ok(tags) => GetTagsResponse::Success(Json::from(tags)),
        Err(_) => GetTagsResponse::TagDbError(BasicMessage::new(
            "Failed to pull tags from database. Check server logs for details",
        )),
    }
}
