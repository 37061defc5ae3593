#[macro_use]
extern crate rocket;

use std::fs;
use std::path::Path;

use rocket::{Build, Rocket};

use crate::config::{ModelsConfig, STL_MANAGER_CONFIG};
use crate::handler::api_handler::{api_version, sync_models};
use crate::metadata::handler::{
    batch_update_metadata, create_metadata, get_categories, get_hierarchy, get_metadata,
    list_metadata, update_metadata,
};
use crate::repository::{initialize_db, Database};
use crate::search::handler::search_items;
use crate::sync::service::synchronize_database;
use crate::tags::handler::get_all_tags;

mod config;
mod db_migrations;
mod handler;
mod logging;
mod metadata;
mod model;
mod repository;
mod search;
mod sync;
mod tags;
#[cfg(test)]
mod test;

#[launch]
fn rocket() -> Rocket<Build> {
    let config = &*STL_MANAGER_CONFIG;
    if let Err(e) = logging::init_logger(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
    }
    let database = Database::new(&config.database.location);
    if let Some(parent) = Path::new(&database.location).parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            panic!("Failed to create database folder {}: {e}", parent.display());
        }
    }
    if let Err(e) = initialize_db(&database) {
        panic!("Failed to initialize database: {e:?}");
    }
    if config.models.sync_on_startup {
        // a failed sync isn't fatal, the library can be synced again through the api
        match synchronize_database(&config.models.root, &database) {
            Ok(stats) => log::info!("Startup sync complete: {stats:?}"),
            Err(e) => log::error!("Startup sync failed: {e:?}"),
        }
    }
    build_rocket(database, config.models.clone())
}

/// mounts every route against the passed database and models folder
pub fn build_rocket(database: Database, models: ModelsConfig) -> Rocket<Build> {
    rocket::build()
        .manage(database)
        .manage(models)
        .mount("/api", routes![api_version, sync_models])
        .mount("/search", routes![search_items])
        .mount(
            "/metadata",
            routes![
                list_metadata,
                get_categories,
                get_hierarchy,
                get_metadata,
                update_metadata,
                create_metadata,
                batch_update_metadata
            ],
        )
        .mount("/tags", routes![get_all_tags])
}
