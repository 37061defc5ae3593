use rocket::serde::json::Json;
use rocket::State;

use crate::config::ModelsConfig;
use crate::model::error::sync_errors::SyncError;
use crate::model::response::api_responses::{ApiVersion, SyncResponse};
use crate::model::response::BasicMessage;
use crate::repository::Database;
use crate::sync::service::synchronize_database;

#[get("/version")]
pub fn api_version() -> Json<ApiVersion> {
    Json(ApiVersion::new())
}

/// re-scans the models folder and brings the database in line with it
#[post("/sync")]
pub fn sync_models(database: &State<Database>, models: &State<ModelsConfig>) -> SyncResponse {
    match synchronize_database(&models.root, database) {
        Ok(stats) => SyncResponse::Success(Json::from(stats)),
        Err(SyncError::RootNotFound) => SyncResponse::GenericError(BasicMessage::new(
            "The models folder does not exist. Check the models.root config value",
        )),
        Err(_) => SyncResponse::GenericError(BasicMessage::new(
            "Failed to synchronize the models folder. Check server logs for details",
        )),
    }
}
