use rocket::http::{ContentType, Status};
use rocket::serde::json::serde_json as serde;

use crate::metadata::models::{BatchResponse, ItemMetadata};
use crate::model::file_types::FileTypes;
use crate::model::response::BasicMessage;
use crate::test::*;

#[test]
fn get_metadata_by_path() {
    init_db_folder();
    create_dragon_tree();
    let client = client();
    let res = client.get("/metadata/Pub/Coll/Dragon").dispatch();
    assert_eq!(Status::Ok, res.status());
    let body: ItemMetadata = serde::from_str(&res.into_string().unwrap()).unwrap();
    assert_eq!("Pub/Coll/Dragon", body.file_path);
    assert_eq!(FileTypes::Model, body.file_type);
    assert_eq!(vec!["32mm".to_string()], body.tags);
    cleanup();
}

#[test]
fn get_metadata_not_found() {
    init_db_folder();
    let client = client();
    let res = client.get("/metadata/Pub/nothing").dispatch();
    assert_eq!(Status::NotFound, res.status());
    cleanup();
}

#[test]
fn put_metadata_uses_path_from_url() {
    init_db_folder();
    create_dragon_tree();
    let client = client();
    let res = client
        .put("/metadata/Pub/Coll/Goblin")
        .header(ContentType::JSON)
        .body(r#"{"filePath":"Somewhere/Else","fileName":"Goblin","category":"Model","tags":["painted"],"supportsNeeded":true}"#)
        .dispatch();
    assert_eq!(Status::Ok, res.status());
    let body: ItemMetadata = serde::from_str(&res.into_string().unwrap()).unwrap();
    assert_eq!("Pub/Coll/Goblin", body.file_path);
    assert_eq!(vec!["painted".to_string()], body.tags);
    assert!(body.supports_needed);
    cleanup();
}

#[test]
fn post_metadata_validates_input() {
    init_db_folder();
    let client = client();
    let res = client
        .post("/metadata")
        .header(ContentType::JSON)
        .body(r#"{"fileName":"orphan"}"#)
        .dispatch();
    assert_eq!(Status::BadRequest, res.status());
    let body: BasicMessage = serde::from_str(&res.into_string().unwrap()).unwrap();
    assert_eq!("File path and name are required", body.message);
    let res = client
        .post("/metadata")
        .header(ContentType::JSON)
        .body(r#"{"filePath":"Pub/orphan.stl","fileName":"orphan.stl","category":"Nope"}"#)
        .dispatch();
    assert_eq!(Status::BadRequest, res.status());
    let res = client
        .post("/metadata")
        .header(ContentType::JSON)
        .body(r#"{"filePath":"Pub/orphan.stl","fileName":"orphan.stl","category":"STL File"}"#)
        .dispatch();
    assert_eq!(Status::Ok, res.status());
    cleanup();
}

#[test]
fn batch_update() {
    init_db_folder();
    create_dragon_tree();
    let client = client();
    let res = client
        .post("/metadata/batch")
        .header(ContentType::JSON)
        .body(r#"{"items":[{"path":"Pub/Coll/Dragon","name":"Dragon"},{"name":"no path"}],"updates":{"resin":"grey"}}"#)
        .dispatch();
    assert_eq!(Status::Ok, res.status());
    let body: BatchResponse = serde::from_str(&res.into_string().unwrap()).unwrap();
    assert_eq!(1, body.success_count);
    assert_eq!(1, body.error_count);
    let res = client
        .post("/metadata/batch")
        .header(ContentType::JSON)
        .body(r#"{"items":[]}"#)
        .dispatch();
    assert_eq!(Status::BadRequest, res.status());
    cleanup();
}

#[test]
fn list_categories_and_filtered_metadata() {
    init_db_folder();
    create_dragon_tree();
    let client = client();
    let res = client.get("/metadata/categories").dispatch();
    assert_eq!(Status::Ok, res.status());
    let categories: Vec<String> = serde::from_str(&res.into_string().unwrap()).unwrap();
    assert!(categories.contains(&"Model".to_string()));
    let res = client.get("/metadata?category=Model&tag=32mm").dispatch();
    assert_eq!(Status::Ok, res.status());
    let items: Vec<ItemMetadata> = serde::from_str(&res.into_string().unwrap()).unwrap();
    assert_eq!(1, items.len());
    assert_eq!("Pub/Coll/Dragon", items[0].file_path);
    cleanup();
}

#[test]
fn hierarchy_lists_ancestors() {
    init_db_folder();
    create_dragon_tree();
    let client = client();
    let res = client.get("/metadata/hierarchy/Pub/Coll/Goblin/goblin.stl").dispatch();
    assert_eq!(Status::Ok, res.status());
    let items: Vec<ItemMetadata> = serde::from_str(&res.into_string().unwrap()).unwrap();
    let paths: Vec<&str> = items.iter().map(|m| m.file_path.as_str()).collect();
    assert_eq!(vec!["Pub", "Pub/Coll", "Pub/Coll/Goblin"], paths);
    let res = client.get("/metadata/hierarchy/Pub/nothing").dispatch();
    assert_eq!(Status::NotFound, res.status());
    cleanup();
}
