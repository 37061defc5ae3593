use std::collections::{HashSet, VecDeque};

use rusqlite::Connection;

use crate::model::file_types::FileTypes;
use crate::model::repository::{Item, ItemRef};
use crate::repository::item_repository;
use crate::search::models::DisplayInfo;
use crate::tags::repository as tag_repository;

/// Everything the search pipeline needs to read from the item tree.
///
/// The pipeline only talks to this trait, so it can run against anything that can answer these questions.
/// [`Connection`] is the real implementation
pub trait SearchStore {
    fn find_item_by_path(&self, path: &str) -> Result<Option<Item>, rusqlite::Error>;

    /// direct children of the item with the passed id
    fn find_items_by_parent(&self, parent_id: u32) -> Result<Vec<Item>, rusqlite::Error>;

    /// paths of every item nested under the item with the passed id at any depth, sorted by path.
    /// The item itself is not included.
    ///
    /// The default walks [`SearchStore::find_items_by_parent`] breadth-first. Ids that were already
    /// visited are skipped, so a cycle in the parent links can't keep it running forever
    fn find_descendant_paths(&self, id: u32) -> Result<Vec<String>, rusqlite::Error> {
        let mut visited: HashSet<u32> = HashSet::from([id]);
        let mut queue: VecDeque<u32> = VecDeque::from([id]);
        let mut paths: Vec<String> = Vec::new();
        while let Some(current) = queue.pop_front() {
            for child in self.find_items_by_parent(current)? {
                let Some(child_id) = child.id else {
                    continue;
                };
                if visited.insert(child_id) {
                    queue.push_back(child_id);
                    paths.push(child.path);
                }
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// paths of the ancestors of `path` with the passed type, nearest first
    fn find_ancestors_of_type(
        &self,
        path: &str,
        file_type: FileTypes,
    ) -> Result<Vec<String>, rusqlite::Error>;

    fn count_children(&self, path: &str) -> Result<u32, rusqlite::Error>;

    /// items the tag is directly on. Exact name match
    fn find_items_directly_tagged(&self, tag: &str) -> Result<Vec<ItemRef>, rusqlite::Error>;

    fn find_paths_by_text(&self, query: &str) -> Result<Vec<String>, rusqlite::Error>;

    fn find_paths_by_type(&self, file_type: FileTypes) -> Result<Vec<String>, rusqlite::Error>;

    /// `None` if there is no item at `path`
    fn get_display_info(&self, path: &str) -> Result<Option<DisplayInfo>, rusqlite::Error>;
}

impl SearchStore for Connection {
    fn find_item_by_path(&self, path: &str) -> Result<Option<Item>, rusqlite::Error> {
        item_repository::get_item_by_path(path, self)
    }

    fn find_items_by_parent(&self, parent_id: u32) -> Result<Vec<Item>, rusqlite::Error> {
        item_repository::get_child_items(parent_id, self)
    }

    fn find_descendant_paths(&self, id: u32) -> Result<Vec<String>, rusqlite::Error> {
        item_repository::get_descendant_paths(id, self)
    }

    fn find_ancestors_of_type(
        &self,
        path: &str,
        file_type: FileTypes,
    ) -> Result<Vec<String>, rusqlite::Error> {
        item_repository::get_ancestor_paths_of_type(path, file_type, self)
    }

    fn count_children(&self, path: &str) -> Result<u32, rusqlite::Error> {
        item_repository::count_children(path, self)
    }

    fn find_items_directly_tagged(&self, tag: &str) -> Result<Vec<ItemRef>, rusqlite::Error> {
        tag_repository::get_items_directly_tagged(tag, self)
    }

    fn find_paths_by_text(&self, query: &str) -> Result<Vec<String>, rusqlite::Error> {
        item_repository::search_paths_by_text(query, self)
    }

    fn find_paths_by_type(&self, file_type: FileTypes) -> Result<Vec<String>, rusqlite::Error> {
        item_repository::get_paths_by_type(file_type, self)
    }

    fn get_display_info(&self, path: &str) -> Result<Option<DisplayInfo>, rusqlite::Error> {
        let Some(item) = self.find_item_by_path(path)? else {
            return Ok(None);
        };
        let item_count = self.count_children(path)?;
        let preview_path = match item.id {
            Some(id) if item.file_type.is_folder_type() => {
                item_repository::get_first_image_descendant(id, self)?
            }
            _ => None,
        };
        Ok(Some(DisplayInfo {
            name: item.name,
            path: item.path,
            file_type: item.file_type,
            item_count,
            preview_path,
            file_size: item.file_size,
            last_modified: item.last_modified,
        }))
    }
}
