use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};

/// what a sync changed in the database
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(crate = "rocket::serde")]
pub struct SyncStats {
    pub added: u32,
    pub updated: u32,
    pub removed: u32,
    /// the number of entries found under the models root
    pub total: u32,
}

/// a file or folder found under the models root
#[derive(Debug, PartialEq, Clone)]
pub struct ScannedEntry {
    /// `/`-separated and relative to the models root
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    /// lowercase, without the leading `.`
    pub extension: Option<String>,
    /// always 0 for folders
    pub size: u64,
    pub modified: DateTime<Utc>,
}
