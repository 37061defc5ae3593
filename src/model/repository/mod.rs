use super::file_types::FileTypes;

/// represents a row in the Items table. Files and folders share this record, and [`Item::file_type`] says which one it is
#[derive(Debug, PartialEq, Clone)]
pub struct Item {
    /// the id, will only be populated when pulled from the database
    pub id: Option<u32>,
    /// the `/`-separated location of the item relative to the models root. Unique
    pub path: String,
    /// the display name, normally the last segment of [`Item::path`]
    pub name: String,
    pub file_type: FileTypes,
    /// will be None if the item is at the top of the tree
    pub parent_id: Option<u32>,
    pub description: Option<String>,
    /// RFC 3339
    pub date_added: String,
    /// RFC 3339
    pub last_modified: String,
    pub resin: Option<String>,
    pub layer_height: Option<f64>,
    pub supports_needed: bool,
    pub notes: Option<String>,
    /// raw json of the print settings, parsed by the metadata service
    pub print_settings: Option<String>,
    /// size in bytes. Always 0 for folders
    pub file_size: u64,
}

/// the minimal identity of an item, used when only the id and path are needed (e.g. tag lookups)
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ItemRef {
    pub id: u32,
    pub path: String,
}

/// returns everything before the last `/` in `path`, or `None` if `path` is a single segment
pub fn parent_path(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

/// returns the last segment of `path`
pub fn last_segment(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}
