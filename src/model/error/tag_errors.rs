#[derive(PartialEq, Debug)]
pub enum GetTagsError {
    /// an error with the database
    DbError,
}
