use rusqlite::{Connection, Result};

/// incrementally upgrades the database for each version the database is behind
pub fn migrate_db(con: &Connection, table_version: u64) -> Result<()> {
    if table_version < 2 {
        log_migration_version(2);
        migrate_v2(con)?;
    }
    Ok(())
}

fn log_migration_version(_version: u64) {
    #[cfg(not(test))]
    log::info!("Migrating database to v{_version}...");
}

/// adds the print settings column and the item type index
fn migrate_v2(con: &Connection) -> Result<()> {
    con.execute_batch(include_str!("./assets/migration/v2.sql"))
}
