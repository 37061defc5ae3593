use std::backtrace::Backtrace;
use std::collections::HashSet;

use rocket::serde::json;
use rusqlite::Connection;

use crate::metadata::models::{
    is_valid_item_path, BatchRequest, BatchResponse, ItemMetadata, MetadataInput, MetadataQuery,
    PrintSettings,
};
use crate::model::error::metadata_errors::{
    BatchMetadataError, GetCategoriesError, GetMetadataError, QueryMetadataError,
    SaveMetadataError,
};
use crate::model::file_types::FileTypes;
use crate::model::repository::{last_segment, parent_path, Item};
use crate::repository::{item_repository, Database};
use crate::tags::repository as tag_repository;
use crate::tags::service as tag_service;

/// retrieves the item at `path` along with its tags
pub fn get_metadata(path: &str, database: &Database) -> Result<ItemMetadata, GetMetadataError> {
    let con = open_connection(database).map_err(|_| GetMetadataError::DbError)?;
    let res = match load_metadata(path, &con) {
        Ok(Some(metadata)) => Ok(metadata),
        Ok(None) => Err(GetMetadataError::NotFound),
        Err(e) => {
            log::error!(
                "Failed to retrieve metadata for {path}. Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            Err(GetMetadataError::DbError)
        }
    };
    con.close().unwrap_or(());
    res
}

/// Creates or updates the item at the input's path, replacing all of its tags.
///
/// The parent is always looked up from the path, and the existing type is kept if no category is passed.
/// Nothing is written unless every step succeeds
pub fn save_metadata(
    input: MetadataInput,
    database: &Database,
) -> Result<ItemMetadata, SaveMetadataError> {
    let path = input
        .file_path
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let name = input
        .file_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if path.is_empty() || name.is_empty() {
        return Err(SaveMetadataError::MissingFields);
    }
    if !is_valid_item_path(&path) {
        log::warn!("Refusing to save metadata for invalid path {path}");
        return Err(SaveMetadataError::InvalidPath);
    }
    let category = match input.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(label) => match FileTypes::from_label(label) {
            Some(file_type) => Some(file_type),
            None => {
                log::warn!("Refusing to save metadata for {path}, {label} is not a category");
                return Err(SaveMetadataError::InvalidCategory);
            }
        },
    };
    let print_settings = match &input.print_settings {
        Some(settings) => Some(json::to_string(settings).map_err(|e| {
            log::error!("Failed to serialize print settings for {path}. Error is {e:?}");
            SaveMetadataError::DbError
        })?),
        None => None,
    };
    let mut con = open_connection(database).map_err(|_| SaveMetadataError::DbError)?;
    let res = save_in_transaction(&path, &name, category, print_settings, &input, &mut con);
    let res = match res {
        Ok(metadata) => Ok(metadata),
        Err(e) => {
            log::error!(
                "Failed to save metadata for {path}. Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            Err(SaveMetadataError::DbError)
        }
    };
    con.close().unwrap_or(());
    res
}

/// saves the same updates to every item in the request. Items without a path or name, and items that fail
/// to save, are counted as errors and don't stop the rest of the batch
pub fn batch_save(
    request: BatchRequest,
    database: &Database,
) -> Result<BatchResponse, BatchMetadataError> {
    let (Some(items), Some(updates)) = (request.items, request.updates) else {
        return Err(BatchMetadataError::MissingFields);
    };
    let mut success_count: u32 = 0;
    let mut error_count: u32 = 0;
    for item in items.iter() {
        let (Some(path), Some(name)) = (&item.path, &item.name) else {
            error_count += 1;
            continue;
        };
        let input = MetadataInput {
            file_path: Some(path.clone()),
            file_name: Some(name.clone()),
            ..updates.clone()
        };
        match save_metadata(input, database) {
            Ok(_) => success_count += 1,
            Err(e) => {
                log::warn!("Failed to save {path} as part of a batch. Error is {e:?}");
                error_count += 1;
            }
        }
    }
    Ok(BatchResponse {
        total_processed: items.len() as u32,
        success_count,
        error_count,
        message: format!(
            "Processed {success_count} items successfully, {error_count} items failed"
        ),
    })
}

/// every item type currently stored, sorted
pub fn get_all_file_types(database: &Database) -> Result<Vec<String>, GetCategoriesError> {
    let con = open_connection(database).map_err(|_| GetCategoriesError::DbError)?;
    let res = item_repository::get_distinct_types(&con).map_err(|e| {
        log::error!(
            "Failed to retrieve item types. Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        GetCategoriesError::DbError
    });
    con.close().unwrap_or(());
    res
}

/// lists the items matching every filter in `query`, ordered by name
pub fn query_metadata(
    query: &MetadataQuery,
    database: &Database,
) -> Result<Vec<ItemMetadata>, QueryMetadataError> {
    let file_type = match &query.file_type {
        Some(label) => match FileTypes::from_label(label) {
            Some(file_type) => Some(file_type),
            // nothing can be stored with a type outside the vocabulary
            None => return Ok(vec![]),
        },
        None => None,
    };
    let con = open_connection(database).map_err(|_| QueryMetadataError::DbError)?;
    let res = item_repository::query_items(
        &query.tags,
        file_type,
        query.parent_folder.as_deref(),
        query.search.as_deref(),
        &con,
    )
    .and_then(|items| {
        items
            .into_iter()
            .map(|item| to_metadata(item, &con))
            .collect::<Result<Vec<ItemMetadata>, rusqlite::Error>>()
    })
    .map_err(|e| {
        log::error!(
            "Failed to query metadata with {query:?}. Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        QueryMetadataError::DbError
    });
    con.close().unwrap_or(());
    res
}

/// the ancestors of the item at `path`, starting at the top of the tree and ending at its direct parent
pub fn get_hierarchy(
    path: &str,
    database: &Database,
) -> Result<Vec<ItemMetadata>, GetMetadataError> {
    let con = open_connection(database).map_err(|_| GetMetadataError::DbError)?;
    let res = match load_hierarchy(path, &con) {
        Ok(Some(hierarchy)) => Ok(hierarchy),
        Ok(None) => Err(GetMetadataError::NotFound),
        Err(e) => {
            log::error!(
                "Failed to retrieve hierarchy for {path}. Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            Err(GetMetadataError::DbError)
        }
    };
    con.close().unwrap_or(());
    res
}

fn open_connection(database: &Database) -> Result<Connection, rusqlite::Error> {
    database.open_connection().inspect_err(|e| {
        log::error!(
            "Failed to open a connection to the database! Error is {e:?}\n{}",
            Backtrace::force_capture()
        )
    })
}

fn save_in_transaction(
    path: &str,
    name: &str,
    category: Option<FileTypes>,
    print_settings: Option<String>,
    input: &MetadataInput,
    con: &mut Connection,
) -> Result<ItemMetadata, rusqlite::Error> {
    let tx = con.transaction()?;
    let now = chrono::Utc::now().to_rfc3339();
    let existing = item_repository::get_item_by_path(path, &tx)?;
    let parent_id = match parent_path(path) {
        Some(parent) => item_repository::get_item_by_path(parent, &tx)?.and_then(|it| it.id),
        None => None,
    };
    let file_type = category
        .or(existing.as_ref().map(|it| it.file_type))
        .unwrap_or(FileTypes::Unknown);
    let item = Item {
        id: existing.as_ref().and_then(|it| it.id),
        path: path.to_string(),
        name: name.to_string(),
        file_type,
        parent_id,
        description: input.description.clone(),
        date_added: input.date_added.clone().unwrap_or_else(|| now.clone()),
        last_modified: input.last_modified.clone().unwrap_or(now),
        resin: input.resin.clone(),
        layer_height: input.layer_height,
        supports_needed: input.supports_needed.unwrap_or(false),
        notes: input.notes.clone(),
        print_settings,
        file_size: existing.as_ref().map(|it| it.file_size).unwrap_or(0),
    };
    let item_id = match item.id {
        Some(id) => {
            item_repository::update_item(&item, &tx)?;
            id
        }
        None => item_repository::create_item(&item, &tx)?,
    };
    item_repository::adopt_children(path, item_id, &tx)?;
    tag_service::set_item_tags(item_id, &input.tags, &tx)?;
    let saved = item_repository::get_item_by_id(item_id, &tx)?;
    let metadata = to_metadata(saved, &tx)?;
    tx.commit()?;
    log::info!("Saved metadata for {path}");
    Ok(metadata)
}

fn load_metadata(path: &str, con: &Connection) -> Result<Option<ItemMetadata>, rusqlite::Error> {
    match item_repository::get_item_by_path(path, con)? {
        Some(item) => Ok(Some(to_metadata(item, con)?)),
        None => Ok(None),
    }
}

/// `None` if there's no item at `path`
fn load_hierarchy(
    path: &str,
    con: &Connection,
) -> Result<Option<Vec<ItemMetadata>>, rusqlite::Error> {
    let Some(item) = item_repository::get_item_by_path(path, con)? else {
        return Ok(None);
    };
    let mut hierarchy: Vec<ItemMetadata> = Vec::new();
    let mut visited: HashSet<u32> = HashSet::new();
    let mut next_parent = item.parent_id;
    while let Some(parent_id) = next_parent {
        if !visited.insert(parent_id) {
            log::warn!("Parent links above {path} form a cycle, stopping at {parent_id}");
            break;
        }
        let parent = match item_repository::get_item_by_id(parent_id, con) {
            Ok(parent) => parent,
            Err(rusqlite::Error::QueryReturnedNoRows) => break,
            Err(e) => return Err(e),
        };
        next_parent = parent.parent_id;
        hierarchy.push(to_metadata(parent, con)?);
    }
    hierarchy.reverse();
    Ok(Some(hierarchy))
}

fn to_metadata(item: Item, con: &Connection) -> Result<ItemMetadata, rusqlite::Error> {
    let id = item.id.unwrap_or_default();
    let tags = tag_repository::get_tags_on_item(id, con)?
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    let print_settings = item
        .print_settings
        .as_deref()
        .and_then(|raw| match json::from_str::<PrintSettings>(raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!(
                    "Print settings for {} are not valid json, ignoring them. Error is {e:?}",
                    item.path
                );
                None
            }
        });
    let file_name = if item.name.is_empty() {
        last_segment(&item.path).to_string()
    } else {
        item.name
    };
    Ok(ItemMetadata {
        id,
        file_path: item.path,
        file_name,
        file_type: item.file_type,
        parent_folder_id: item.parent_id,
        description: item.description,
        date_added: item.date_added,
        last_modified: item.last_modified,
        tags,
        resin: item.resin,
        layer_height: item.layer_height,
        supports_needed: item.supports_needed,
        notes: item.notes,
        print_settings,
        file_size: item.file_size,
    })
}
