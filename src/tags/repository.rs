use std::backtrace::Backtrace;

use rusqlite::Connection;

use crate::model::repository::ItemRef;
use crate::tags::Tag;

/// creates a new tag in the database. This does not check if the tag already exists,
/// so the caller must check that themselves
pub fn create_tag(name: &str, con: &Connection) -> Result<Tag, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/tags/create_tag.sql"))?;
    let id = pst.insert(rusqlite::params![name])? as u32;
    Ok(Tag {
        id,
        name: name.to_string(),
    })
}

/// searches for a tag that exactly matches the passed name.
///
/// if `None` is returned, that means there was no match
pub fn get_tag_by_name(name: &str, con: &Connection) -> Result<Option<Tag>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/tags/get_by_name.sql"))?;
    match pst.query_row(rusqlite::params![name], tag_mapper) {
        Ok(tag) => Ok(Some(tag)),
        Err(e) => {
            // no tag found
            if e == rusqlite::Error::QueryReturnedNoRows {
                Ok(None)
            } else {
                log::error!(
                    "Failed to get tag by name, error is {e:?}\n{}",
                    Backtrace::force_capture()
                );
                Err(e)
            }
        }
    }
}

/// retrieves every tag, sorted by name
pub fn get_all_tags(con: &Connection) -> Result<Vec<Tag>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/tags/get_all_tags.sql"))?;
    let rows = pst.query_map([], tag_mapper)?;
    rows.collect()
}

/// links the tag to the item. Does nothing if the item already has the tag.
/// The caller of this function will need to make sure both the tag and the item exist
pub fn add_tag_to_item(item_id: u32, tag_id: u32, con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/tags/add_tag_to_item.sql"))?;
    pst.execute(rusqlite::params![item_id, tag_id])?;
    Ok(())
}

/// unlinks every tag from the item. The tags themselves are kept
pub fn remove_all_tags_from_item(item_id: u32, con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/tags/remove_all_tags_from_item.sql"
    ))?;
    pst.execute(rusqlite::params![item_id])?;
    Ok(())
}

/// retrieves the tags directly on the item, sorted by name. Tags inherited from ancestors are not included
pub fn get_tags_on_item(item_id: u32, con: &Connection) -> Result<Vec<Tag>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/tags/get_tags_for_item.sql"))?;
    let rows = pst.query_map(rusqlite::params![item_id], tag_mapper)?;
    rows.collect()
}

/// retrieves every item the tag with the passed name is directly on, ordered by path
pub fn get_items_directly_tagged(
    name: &str,
    con: &Connection,
) -> Result<Vec<ItemRef>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/tags/get_items_directly_tagged.sql"
    ))?;
    let rows = pst.query_map(rusqlite::params![name], |row| {
        Ok(ItemRef {
            id: row.get(0)?,
            path: row.get(1)?,
        })
    })?;
    rows.collect()
}

/// maps a [`Tag`] from a database row
fn tag_mapper(row: &rusqlite::Row) -> Result<Tag, rusqlite::Error> {
    let id: u32 = row.get(0)?;
    let name: String = row.get(1)?;
    Ok(Tag { id, name })
}
