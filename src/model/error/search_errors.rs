#[derive(PartialEq, Debug)]
pub enum SearchError {
    /// the store failed while matching or resolving. No partial results are ever returned
    DbError,
}
