pub mod metadata_errors;
pub mod search_errors;
pub mod sync_errors;
pub mod tag_errors;
