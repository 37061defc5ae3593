#[derive(PartialEq, Debug)]
pub enum SyncError {
    /// the models root doesn't exist or isn't a directory
    RootNotFound,
    /// failed to read the models root
    FileSystemError,
    /// an error with the database. Nothing from the failed sync was committed
    DbError,
}
