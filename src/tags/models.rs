use rocket::serde::json::Json;

use crate::model::response::BasicMessage;

/// represents a tag in the Tags table of the database. Tags are attached to items through the ItemTags table
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Tag {
    /// the id of the tag
    pub id: u32,
    /// the unique display name of the tag. Matching on it is exact
    pub name: String,
}

#[derive(Responder)]
pub enum GetTagsResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<Vec<String>>),
    #[response(status = 500, content_type = "json")]
    TagDbError(Json<BasicMessage>),
}
