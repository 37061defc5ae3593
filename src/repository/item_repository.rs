use std::backtrace::Backtrace;
use std::rc::Rc;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::model::file_types::FileTypes;
use crate::model::repository::{Item, ItemRef};

/// creates an item record in the database and returns its new id.
/// This does not check that the parent exists or that the path is free, and that must be done before this function is called
pub fn create_item(item: &Item, con: &Connection) -> Result<u32, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/create_item.sql"))?;
    let id = pst.insert(params![
        item.path,
        item.name,
        item.file_type,
        item.parent_id,
        item.description,
        item.date_added,
        item.last_modified,
        item.resin,
        item.layer_height,
        item.supports_needed,
        item.notes,
        item.print_settings,
        item.file_size as i64,
    ])? as u32;
    Ok(id)
}

/// updates the descriptive fields of the item with the same path as `item`.
/// `date_added` and `file_size` are never changed by this function
pub fn update_item(item: &Item, con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/update_item.sql"))?;
    pst.execute(params![
        item.name,
        item.file_type,
        item.parent_id,
        item.description,
        item.last_modified,
        item.resin,
        item.layer_height,
        item.supports_needed,
        item.notes,
        item.print_settings,
        item.path,
    ])?;
    Ok(())
}

/// searches for the item with exactly the passed path.
///
/// if `None` is returned, that means there was no match
pub fn get_item_by_path(path: &str, con: &Connection) -> Result<Option<Item>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/get_item_by_path.sql"))?;
    match pst.query_row(params![path], map_item) {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => {
            log::error!(
                "Failed to get item by path {path}, error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            Err(e)
        }
    }
}

/// retrieves the item with the passed `id`. Fails with [`rusqlite::Error::QueryReturnedNoRows`] if it doesn't exist
pub fn get_item_by_id(id: u32, con: &Connection) -> Result<Item, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/get_item_by_id.sql"))?;
    pst.query_row(params![id], map_item)
}

/// retrieves the direct children of the item with the passed id, ordered by path
pub fn get_child_items(parent_id: u32, con: &Connection) -> Result<Vec<Item>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/get_child_items.sql"))?;
    let rows = pst.query_map(params![parent_id], map_item)?;
    rows.collect()
}

/// returns the paths of every item nested at any depth under the item with the passed id.
/// The item itself is not included
pub fn get_descendant_paths(id: u32, con: &Connection) -> Result<Vec<String>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/item/get_descendant_paths.sql"
    ))?;
    let rows = pst.query_map(params![id], |row| row.get(0))?;
    rows.collect()
}

/// returns the paths of all ancestors of the item at `path` that have the passed type, nearest first.
/// The item itself is never included
pub fn get_ancestor_paths_of_type(
    path: &str,
    file_type: FileTypes,
    con: &Connection,
) -> Result<Vec<String>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/item/get_ancestors_of_type.sql"
    ))?;
    let rows = pst.query_map(params![path, file_type], |row| row.get(0))?;
    rows.collect()
}

/// counts the direct children of the item at `path`. Returns 0 if there is no such item
pub fn count_children(path: &str, con: &Connection) -> Result<u32, rusqlite::Error> {
    con.query_row(
        include_str!("../assets/queries/item/count_children.sql"),
        params![path],
        |row| row.get(0),
    )
}

/// finds the shallowest image nested under the item with the passed id, ties broken by path
pub fn get_first_image_descendant(
    id: u32,
    con: &Connection,
) -> Result<Option<String>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/item/get_first_image_descendant.sql"
    ))?;
    match pst.query_row(params![id], |row| row.get(0)) {
        Ok(path) => Ok(Some(path)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// case-insensitively searches item names, descriptions, and notes for `query`.
/// `query` is matched literally, so `%` and `_` have no special meaning
pub fn search_paths_by_text(query: &str, con: &Connection) -> Result<Vec<String>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/item/search_paths_by_text.sql"
    ))?;
    let rows = pst.query_map(params![query], |row| row.get(0))?;
    rows.collect()
}

pub fn get_paths_by_type(
    file_type: FileTypes,
    con: &Connection,
) -> Result<Vec<String>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/get_paths_by_type.sql"))?;
    let rows = pst.query_map(params![file_type], |row| row.get(0))?;
    rows.collect()
}

/// returns every type label currently stored, sorted
pub fn get_distinct_types(con: &Connection) -> Result<Vec<String>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/item/get_distinct_types.sql"
    ))?;
    let rows = pst.query_map([], |row| row.get(0))?;
    rows.collect()
}

/// filters items the way the metadata listing endpoint needs. Every `Some` filter narrows the result,
/// and the results are ordered by name
pub fn query_items(
    tags: &[String],
    file_type: Option<FileTypes>,
    parent_path: Option<&str>,
    search: Option<&str>,
    con: &Connection,
) -> Result<Vec<Item>, rusqlite::Error> {
    let mut sql = String::from(
        "select distinct i.id, i.path, i.name, i.type, i.parentId, i.description, i.dateAdded, i.lastModified, \
         i.resin, i.layerHeight, i.supportsNeeded, i.notes, i.printSettings, i.fileSize from Items i",
    );
    let mut conditions: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if !tags.is_empty() {
        sql += " join ItemTags it on i.id = it.itemId join Tags t on it.tagId = t.id";
        let placeholders: Vec<String> = tags
            .iter()
            .map(|tag| {
                values.push(Value::Text(tag.clone()));
                format!("?{}", values.len())
            })
            .collect();
        conditions.push(format!("t.name in ({})", placeholders.join(", ")));
    }
    if let Some(file_type) = file_type {
        values.push(Value::Text(file_type.label().to_string()));
        conditions.push(format!("i.type = ?{}", values.len()));
    }
    if let Some(parent_path) = parent_path {
        values.push(Value::Text(parent_path.to_string()));
        conditions.push(format!(
            "i.parentId = (select id from Items where path = ?{})",
            values.len()
        ));
    }
    if let Some(search) = search {
        values.push(Value::Text(search.to_string()));
        let index = values.len();
        conditions.push(format!(
            "(instr(lower(i.name), lower(?{index})) > 0 or instr(lower(coalesce(i.description, '')), lower(?{index})) > 0)"
        ));
    }
    if !conditions.is_empty() {
        sql += " where ";
        sql += &conditions.join(" and ");
    }
    sql += " order by i.name, i.path";
    let mut pst = con.prepare(&sql)?;
    let rows = pst.query_map(params_from_iter(values), map_item)?;
    rows.collect()
}

/// returns the id, path, and last modified date of every item. Used to reconcile the table with the disk
pub fn get_sync_entries(con: &Connection) -> Result<Vec<(ItemRef, String)>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/get_sync_entries.sql"))?;
    let rows = pst.query_map([], |row| {
        Ok((
            ItemRef {
                id: row.get(0)?,
                path: row.get(1)?,
            },
            row.get(2)?,
        ))
    })?;
    rows.collect()
}

pub fn update_last_modified(
    id: u32,
    last_modified: &str,
    file_size: u64,
    con: &Connection,
) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/item/update_last_modified.sql"
    ))?;
    pst.execute(params![last_modified, file_size as i64, id])?;
    Ok(())
}

/// deletes every item with an id in `ids`. Tags on those items and all of their descendants go with them
pub fn delete_items(ids: &[u32], con: &Connection) -> Result<(), rusqlite::Error> {
    if ids.is_empty() {
        return Ok(());
    }
    let values: Rc<Vec<Value>> = Rc::new(ids.iter().map(|id| Value::from(*id)).collect());
    let mut pst = con.prepare(include_str!("../assets/queries/item/delete_items.sql"))?;
    pst.execute(params![values])?;
    Ok(())
}

pub fn set_parent_id(
    id: u32,
    parent_id: Option<u32>,
    con: &Connection,
) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/set_parent_id.sql"))?;
    pst.execute(params![parent_id, id])?;
    Ok(())
}

/// points every item directly under `path` at `parent_id`, for items that were saved before their parent
pub fn adopt_children(path: &str, parent_id: u32, con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/item/adopt_children.sql"))?;
    pst.execute(params![path, parent_id])?;
    Ok(())
}

/// 1. id
/// 2. path
/// 3. name
/// 4. type
/// 5. parentId
/// 6. description
/// 7. dateAdded
/// 8. lastModified
/// 9. resin
/// 10. layerHeight
/// 11. supportsNeeded
/// 12. notes
/// 13. printSettings
/// 14. fileSize
pub fn map_item(row: &rusqlite::Row) -> Result<Item, rusqlite::Error> {
    let file_size: i64 = row.get(13)?;
    Ok(Item {
        id: row.get(0)?,
        path: row.get(1)?,
        name: row.get(2)?,
        file_type: row.get(3)?,
        parent_id: row.get(4)?,
        description: row.get(5)?,
        date_added: row.get(6)?,
        last_modified: row.get(7)?,
        resin: row.get(8)?,
        layer_height: row.get(9)?,
        supports_needed: row.get(10)?,
        notes: row.get(11)?,
        print_settings: row.get(12)?,
        file_size: file_size.max(0) as u64,
    })
}
