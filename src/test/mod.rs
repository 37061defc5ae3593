use std::fs::{remove_dir_all, remove_file};
use std::path::Path;

use rocket::local::blocking::Client;

use crate::build_rocket;
use crate::config::ModelsConfig;
use crate::model::file_types::FileTypes;
use crate::model::repository::Item;
use crate::repository::{initialize_db, item_repository, Database};
use crate::tags::repository as tag_repository;

/// every test thread gets its own database file, so tests can run in parallel
pub fn test_database() -> Database {
    Database::new(&format!("{}.sqlite", current_thread_name()))
}

/// the models root for the current test thread
pub fn models_dir() -> String {
    format!("./{}_models", current_thread_name())
}

/// models config pointing at [`models_dir`], never syncing on startup
pub fn test_models_config() -> ModelsConfig {
    ModelsConfig {
        root: models_dir(),
        sync_on_startup: false,
    }
}

/// a client for a rocket wired to this thread's database and models folder
pub fn client() -> Client {
    Client::tracked(build_rocket(test_database(), test_models_config())).unwrap()
}

/// deletes any leftover database for this thread and creates a fresh one
pub fn init_db_folder() {
    cleanup();
    initialize_db(&test_database()).unwrap();
}

pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// creates an item with the passed path and type, linking it to the item at the parent path if one exists.
/// Returns the id of the new item
pub fn create_item_db_entry(path: &str, file_type: FileTypes) -> u32 {
    let con = test_database().open_connection().unwrap();
    let parent_id = crate::model::repository::parent_path(path).map(|parent| {
        item_repository::get_item_by_path(parent, &con)
            .unwrap()
            .and_then(|it| it.id)
            .expect("parent item must be created before its children")
    });
    let id = item_repository::create_item(
        &Item {
            id: None,
            path: path.to_string(),
            name: crate::model::repository::last_segment(path).to_string(),
            file_type,
            parent_id,
            description: None,
            date_added: now(),
            last_modified: now(),
            resin: None,
            layer_height: None,
            supports_needed: false,
            notes: None,
            print_settings: None,
            file_size: 0,
        },
        &con,
    )
    .unwrap();
    con.close().unwrap();
    id
}

/// sets the description and notes on the item at `path`
pub fn describe_item(path: &str, description: Option<&str>, notes: Option<&str>) {
    let con = test_database().open_connection().unwrap();
    let mut item = item_repository::get_item_by_path(path, &con).unwrap().unwrap();
    item.description = description.map(str::to_string);
    item.notes = notes.map(str::to_string);
    item_repository::update_item(&item, &con).unwrap();
    con.close().unwrap();
}

/// tags the item with the passed id, creating the tag if it doesn't exist yet
pub fn create_tag_item(name: &str, item_id: u32) {
    let con = test_database().open_connection().unwrap();
    let tag = match tag_repository::get_tag_by_name(name, &con).unwrap() {
        Some(tag) => tag,
        None => tag_repository::create_tag(name, &con).unwrap(),
    };
    tag_repository::add_tag_to_item(item_id, tag.id, &con).unwrap();
    con.close().unwrap();
}

/// builds the tree used throughout the search tests:
///
/// ```text
/// Pub                      (Publisher)
/// Pub/Coll                 (Collection)
/// Pub/Coll/Dragon          (Model, tagged 32mm)
/// Pub/Coll/Dragon/body.stl
/// Pub/Coll/Dragon/head.stl
/// Pub/Coll/Goblin          (Model)
/// Pub/Coll/Goblin/goblin.stl
/// ```
///
/// returns the id of the dragon folder
pub fn create_dragon_tree() -> u32 {
    create_item_db_entry("Pub", FileTypes::Publisher);
    create_item_db_entry("Pub/Coll", FileTypes::Collection);
    let dragon = create_item_db_entry("Pub/Coll/Dragon", FileTypes::Model);
    create_item_db_entry("Pub/Coll/Dragon/body.stl", FileTypes::Stl);
    create_item_db_entry("Pub/Coll/Dragon/head.stl", FileTypes::Stl);
    create_item_db_entry("Pub/Coll/Goblin", FileTypes::Model);
    create_item_db_entry("Pub/Coll/Goblin/goblin.stl", FileTypes::Stl);
    create_tag_item("32mm", dragon);
    dragon
}

pub fn current_thread_name() -> String {
    let current_thread = std::thread::current();
    current_thread
        .name()
        .unwrap_or("main")
        .replace("::", "_")
}

pub fn cleanup() {
    let thread_name = current_thread_name();
    remove_file(Path::new(format!("{thread_name}.sqlite").as_str())).unwrap_or(());
    remove_dir_all(Path::new(models_dir().as_str())).unwrap_or(());
}
