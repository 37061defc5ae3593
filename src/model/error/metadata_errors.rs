#[derive(PartialEq, Debug)]
pub enum GetMetadataError {
    /// no item with the passed path exists
    NotFound,
    /// an error with the database
    DbError,
}

#[derive(PartialEq, Debug)]
pub enum SaveMetadataError {
    /// the path or name is blank
    MissingFields,
    /// the path has empty, `.`, or `..` segments, or starts with `/`
    InvalidPath,
    /// the category is not one of the known item types
    InvalidCategory,
    /// an error with the database
    DbError,
}

#[derive(PartialEq, Debug)]
pub enum GetCategoriesError {
    /// an error with the database
    DbError,
}

#[derive(PartialEq, Debug)]
pub enum QueryMetadataError {
    /// an error with the database
    DbError,
}

#[derive(PartialEq, Debug)]
pub enum BatchMetadataError {
    /// the request is missing its `items` or `updates`
    MissingFields,
}
