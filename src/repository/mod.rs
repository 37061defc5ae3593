use std::path::Path;

use rusqlite::{Connection, OpenFlags, Result};

use crate::db_migrations::migrate_db;

pub mod item_repository;
pub mod metadata_repository;


/// handle to the sqlite database file. Managed by rocket and handed to every handler, so nothing in this crate
/// reaches for a global connection
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub location: String,
}

impl Database {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
        }
    }

    /// opens a new connection to the database. Callers are responsible for closing it.
    ///
    /// foreign keys are enabled and the `rarray` module is loaded on every connection
    pub fn open_connection(&self) -> Result<Connection> {
        let con = Connection::open_with_flags(Path::new(&self.location), OpenFlags::default())?;
        con.pragma_update(None, "foreign_keys", "ON")?;
        rusqlite::vtab::array::load_module(&con)?;
        Ok(con)
    }
}

/// runs init.sql on the database
fn create_db(con: &Connection) -> Result<()> {
    con.execute_batch(include_str!("../assets/init.sql"))
}

/// handles checking if the database exists and is up to the correct version.
/// If not, it either creates or upgrades the database accordingly
pub fn initialize_db(database: &Database) -> Result<()> {
    let con = database.open_connection()?;
    let table_version = match metadata_repository::get_version(&con) {
        Ok(value) => value.parse::<u64>().unwrap_or(1),
        Err(_) => {
            // tables haven't been created yet
            create_db(&con)?;
            1
        }
    };
    migrate_db(&con, table_version)?;
    con.close().map_err(|(_, e)| e)?;
    Ok(())
}
