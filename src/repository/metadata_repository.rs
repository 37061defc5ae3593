use rusqlite::Connection;

/// retrieves the schema version stored in the metadata table. Fails if the table doesn't exist yet
pub fn get_version(con: &Connection) -> Result<String, rusqlite::Error> {
    con.query_row(
        include_str!("../assets/queries/metadata/get_version.sql"),
        [],
        |row| row.get(0),
    )
}
