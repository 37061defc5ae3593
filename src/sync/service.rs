use std::backtrace::Backtrace;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use walkdir::{DirEntry, WalkDir};

use crate::model::error::sync_errors::SyncError;
use crate::model::file_types::determine_file_type;
use crate::model::repository::{parent_path, Item};
use crate::repository::{item_repository, Database};
use crate::sync::models::{ScannedEntry, SyncStats};

/// opens a connection to `database` and runs [`synchronize`] against it
pub fn synchronize_database(root: &str, database: &Database) -> Result<SyncStats, SyncError> {
    let mut con = database.open_connection().map_err(|e| {
        log::error!(
            "Failed to open a connection to synchronize the models folder! Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        SyncError::DbError
    })?;
    let res = synchronize(Path::new(root), &mut con);
    con.close().unwrap_or(());
    res
}

/// Brings the Items table in line with what is on disk under `root`.
///
/// New entries are added with a type guessed from their location, entries modified since the last sync get their
/// modified date and size refreshed, and rows for entries that no longer exist are deleted along with their tags.
/// Finally every item is re-linked to the item at its parent path. Everything happens in a single transaction
pub fn synchronize(root: &Path, con: &mut Connection) -> Result<SyncStats, SyncError> {
    log::info!("Scanning {} for changes...", root.display());
    let entries = scan_models_root(root)?;
    let tx = con.transaction().map_err(|e| {
        log::error!(
            "Failed to start sync transaction. Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        SyncError::DbError
    })?;
    let stats = match apply_changes(&entries, &tx).and_then(|stats| {
        relink_parents(&tx)?;
        Ok(stats)
    }) {
        Ok(stats) => stats,
        Err(e) => {
            log::error!(
                "Failed to synchronize the database with {}. Error is {e:?}\n{}",
                root.display(),
                Backtrace::force_capture()
            );
            // dropping the transaction rolls it back
            return Err(SyncError::DbError);
        }
    };
    tx.commit().map_err(|e| {
        log::error!(
            "Failed to commit sync transaction. Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        SyncError::DbError
    })?;
    log::info!(
        "Sync finished: {} added, {} updated, {} removed, {} total",
        stats.added,
        stats.updated,
        stats.removed,
        stats.total
    );
    Ok(stats)
}

/// lists every file and folder under `root`, not including `root` itself. Hidden entries and everything inside
/// hidden folders are skipped
pub fn scan_models_root(root: &Path) -> Result<Vec<ScannedEntry>, SyncError> {
    if !root.is_dir() {
        log::error!("Models folder {} does not exist", root.display());
        return Err(SyncError::RootNotFound);
    }
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));
    let mut entries: Vec<ScannedEntry> = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            log::error!(
                "Failed to read entry in {}. Error is {e:?}\n{}",
                root.display(),
                Backtrace::force_capture()
            );
            SyncError::FileSystemError
        })?;
        entries.push(to_scanned_entry(root, &entry)?);
    }
    Ok(entries)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn to_scanned_entry(root: &Path, entry: &DirEntry) -> Result<ScannedEntry, SyncError> {
    let metadata = entry.metadata().map_err(|e| {
        log::error!(
            "Failed to read metadata of {}. Error is {e:?}",
            entry.path().display()
        );
        SyncError::FileSystemError
    })?;
    let relative = entry
        .path()
        .strip_prefix(root)
        .map_err(|_| SyncError::FileSystemError)?;
    let path = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let is_dir = metadata.is_dir();
    let extension = if is_dir {
        None
    } else {
        entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    };
    let modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    Ok(ScannedEntry {
        path,
        name: entry.file_name().to_string_lossy().to_string(),
        is_dir,
        extension,
        size: if is_dir { 0 } else { metadata.len() },
        modified,
    })
}

fn apply_changes(entries: &[ScannedEntry], con: &Connection) -> Result<SyncStats, rusqlite::Error> {
    let existing: HashMap<String, (u32, String)> = item_repository::get_sync_entries(con)?
        .into_iter()
        .map(|(item, last_modified)| (item.path, (item.id, last_modified)))
        .collect();
    let mut stats = SyncStats {
        total: entries.len() as u32,
        ..SyncStats::default()
    };
    let now = Utc::now().to_rfc3339();
    for entry in entries {
        match existing.get(&entry.path) {
            None => {
                item_repository::create_item(&new_item(entry, &now), con)?;
                stats.added += 1;
            }
            Some((id, last_modified)) => {
                let is_newer = DateTime::parse_from_rfc3339(last_modified)
                    .map(|stored| entry.modified > stored)
                    .unwrap_or(true);
                if is_newer {
                    item_repository::update_last_modified(
                        *id,
                        &entry.modified.to_rfc3339(),
                        entry.size,
                        con,
                    )?;
                    stats.updated += 1;
                }
            }
        }
    }
    let on_disk: HashSet<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    let removed: Vec<u32> = existing
        .iter()
        .filter(|(path, _)| !on_disk.contains(path.as_str()))
        .map(|(_, (id, _))| *id)
        .collect();
    item_repository::delete_items(&removed, con)?;
    stats.removed = removed.len() as u32;
    Ok(stats)
}

fn new_item(entry: &ScannedEntry, now: &str) -> Item {
    Item {
        id: None,
        path: entry.path.clone(),
        name: entry.name.clone(),
        file_type: determine_file_type(&entry.path, entry.is_dir, entry.extension.as_deref()),
        parent_id: None,
        description: None,
        date_added: now.to_string(),
        last_modified: entry.modified.to_rfc3339(),
        resin: None,
        layer_height: None,
        supports_needed: false,
        notes: None,
        print_settings: None,
        file_size: entry.size,
    }
}

/// points every item's parentId at the item with its parent path, or null if there isn't one
fn relink_parents(con: &Connection) -> Result<(), rusqlite::Error> {
    let ids_by_path: HashMap<String, u32> = item_repository::get_sync_entries(con)?
        .into_iter()
        .map(|(item, _)| (item.path, item.id))
        .collect();
    for (path, id) in ids_by_path.iter() {
        let parent_id = parent_path(path).and_then(|parent| ids_by_path.get(parent).copied());
        item_repository::set_parent_id(*id, parent_id, con)?;
    }
    Ok(())
}
