use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

use crate::model::response::BasicMessage;
use crate::sync::SyncStats;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct ApiVersion {
    pub version: String,
}

#[derive(Responder)]
pub enum SyncResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<SyncStats>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

impl ApiVersion {
    pub fn new() -> ApiVersion {
        ApiVersion {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
