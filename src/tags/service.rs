use std::backtrace::Backtrace;

use itertools::Itertools;
use rusqlite::Connection;

use crate::model::error::tag_errors::GetTagsError;
use crate::repository::Database;
use crate::tags::repository as tag_repository;
use crate::tags::Tag;

/// returns the names of every tag in the database, sorted
pub fn get_all_tags(database: &Database) -> Result<Vec<String>, GetTagsError> {
    let con = database.open_connection().map_err(|e| {
        log::error!(
            "Failed to open a connection to retrieve all tags! Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        GetTagsError::DbError
    })?;
    let tags = match tag_repository::get_all_tags(&con) {
        Ok(tags) => tags,
        Err(e) => {
            log::error!(
                "Failed to retrieve all tags! Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            con.close().unwrap_or(());
            return Err(GetTagsError::DbError);
        }
    };
    con.close().unwrap_or(());
    Ok(tags.into_iter().map(|tag| tag.name).collect())
}

/// will return the tag with the passed name, creating it first if it doesn't exist yet
pub fn get_or_create_tag(name: &str, con: &Connection) -> Result<Tag, rusqlite::Error> {
    match tag_repository::get_tag_by_name(name, con)? {
        Some(tag) => Ok(tag),
        None => tag_repository::create_tag(name, con),
    }
}

/// Replaces all tags on the item with the passed list.
///
/// Blank names are skipped and duplicates are only linked once. Tags that don't exist yet are created.
/// This does not check that the item exists, and does not manage a transaction; callers do both
pub fn set_item_tags(item_id: u32, tags: &[String], con: &Connection) -> Result<(), rusqlite::Error> {
    tag_repository::remove_all_tags_from_item(item_id, con)?;
    let names = tags
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .unique();
    for name in names {
        let tag = get_or_create_tag(name, con)?;
        tag_repository::add_tag_to_item(item_id, tag.id, con)?;
    }
    Ok(())
}
