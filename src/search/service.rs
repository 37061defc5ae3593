use std::backtrace::Backtrace;
use std::path::Path;

use itertools::Itertools;

use crate::model::error::search_errors::SearchError;
use crate::model::file_types::FileTypes;
use crate::model::repository::last_segment;
use crate::repository::Database;
use crate::search::models::{
    Criterion, CriterionKind, DisplayInfo, FileResult, FileTypeFilter, FolderResult, MatchSet,
    SearchRequest, SearchResult,
};
use crate::search::store::SearchStore;

/// opens a connection to `database` and runs [`search`] against it.
///
/// Requests without any criteria never open a connection
pub fn search_database(
    request: &SearchRequest,
    database: &Database,
) -> Result<Vec<SearchResult>, SearchError> {
    if !request.has_criteria() {
        return Ok(vec![]);
    }
    let con = database.open_connection().map_err(|e| {
        log::error!(
            "Failed to open a connection to search items! Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        SearchError::DbError
    })?;
    let results = search(request, &con);
    con.close().unwrap_or(());
    results
}

/// Finds every item matching all criteria in `request`, collapsed to the model folders the matches live in.
///
/// Criteria are evaluated as text, then tags, then type, and the results keep the order their paths first
/// matched in. Nothing is read from `store` if the request has no criteria
pub fn search<S: SearchStore>(
    request: &SearchRequest,
    store: &S,
) -> Result<Vec<SearchResult>, SearchError> {
    if !request.has_criteria() {
        return Ok(vec![]);
    }
    log::debug!(
        "Searching with query {:?}, tags {:?}, and file type {:?}",
        request.query,
        request.tags,
        request.file_type
    );
    let mut criteria: Vec<Criterion> = Vec::new();
    if let Some(query) = &request.query {
        let matches = find_paths_by_text(query, store).map_err(|e| {
            log::error!(
                "Failed to search items by text. Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            SearchError::DbError
        })?;
        criteria.push(Criterion {
            kind: CriterionKind::Text(query.clone()),
            matches,
        });
    }
    if !request.tags.is_empty() {
        let matches = find_paths_by_tags(&request.tags, store).map_err(|e| {
            log::error!(
                "Failed to search items by tags. Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            SearchError::DbError
        })?;
        criteria.push(Criterion {
            kind: CriterionKind::Tags(request.tags.clone()),
            matches,
        });
    }
    if let Some(filter) = &request.file_type {
        let matches = find_paths_by_file_type(filter, store).map_err(|e| {
            log::error!(
                "Failed to search items by file type. Error is {e:?}\n{}",
                Backtrace::force_capture()
            );
            SearchError::DbError
        })?;
        criteria.push(Criterion {
            kind: CriterionKind::FileType(filter.label().to_string()),
            matches,
        });
    }
    let combined = combine_criteria(&criteria);
    let resolved = resolve_model_folders(&combined, store).map_err(|e| {
        log::error!(
            "Failed to resolve model folders for search results. Error is {e:?}\n{}",
            Backtrace::force_capture()
        );
        SearchError::DbError
    })?;
    let results = assemble_results(&resolved, &criteria, store);
    log::info!(
        "Search matched {} items and returned {} results",
        combined.len(),
        results.len()
    );
    Ok(results)
}

/// paths of every item whose name, description, or notes contain `query`, ignoring case
pub fn find_paths_by_text<S: SearchStore>(
    query: &str,
    store: &S,
) -> Result<MatchSet, rusqlite::Error> {
    Ok(store.find_paths_by_text(query)?.into_iter().collect())
}

/// Paths of every item that has all of `tags`, either directly or through any of its ancestors.
///
/// If the descendants of one tagged item can't be retrieved, only that item's descendants are left out
pub fn find_paths_by_tags<S: SearchStore>(
    tags: &[String],
    store: &S,
) -> Result<MatchSet, rusqlite::Error> {
    let mut combined: Option<MatchSet> = None;
    for tag in tags {
        let mut matches = MatchSet::new();
        for tagged in store.find_items_directly_tagged(tag)? {
            matches.insert(tagged.path.clone());
            match store.find_descendant_paths(tagged.id) {
                Ok(descendants) => matches.extend(descendants),
                Err(e) => log::warn!(
                    "Failed to retrieve descendants of {} for tag {tag}, they will be skipped. Error is {e:?}",
                    tagged.path
                ),
            }
        }
        combined = Some(match combined {
            Some(previous) => previous.intersection(&matches),
            None => matches,
        });
    }
    Ok(combined.unwrap_or_default())
}

/// paths of every item with exactly the passed type. Unrecognized types never match anything
pub fn find_paths_by_file_type<S: SearchStore>(
    filter: &FileTypeFilter,
    store: &S,
) -> Result<MatchSet, rusqlite::Error> {
    match filter {
        FileTypeFilter::Known(file_type) => {
            Ok(store.find_paths_by_type(*file_type)?.into_iter().collect())
        }
        FileTypeFilter::Unrecognized(label) => {
            log::debug!("{label} is not a known file type, nothing can match it");
            Ok(MatchSet::new())
        }
    }
}

/// intersects the match sets of all `criteria`, keeping the order of the first one
pub fn combine_criteria(criteria: &[Criterion]) -> MatchSet {
    let mut iter = criteria.iter();
    let Some(first) = iter.next() else {
        return MatchSet::new();
    };
    iter.fold(first.matches.clone(), |acc, criterion| {
        acc.intersection(&criterion.matches)
    })
}

/// replaces every path with the model folder it belongs to (see [`resolve_model_folder`]), dropping duplicates
pub fn resolve_model_folders<S: SearchStore>(
    candidates: &MatchSet,
    store: &S,
) -> Result<MatchSet, rusqlite::Error> {
    let mut resolved = MatchSet::new();
    for candidate in candidates.iter() {
        resolved.insert(resolve_model_folder(candidate, store)?);
    }
    Ok(resolved)
}

/// Returns `path` if it is a model, otherwise the path of its nearest model ancestor.
///
/// Paths outside of any model, and paths that are no longer in the store, are returned unchanged
pub fn resolve_model_folder<S: SearchStore>(
    path: &str,
    store: &S,
) -> Result<String, rusqlite::Error> {
    if let Some(item) = store.find_item_by_path(path)? {
        if item.file_type == FileTypes::Model {
            return Ok(path.to_string());
        }
    }
    let ancestors = store.find_ancestors_of_type(path, FileTypes::Model)?;
    Ok(ancestors
        .into_iter()
        .next()
        .unwrap_or_else(|| path.to_string()))
}

/// builds the result records for `resolved`, in order. This never fails, items that can't be looked up
/// get a bare folder record instead
pub fn assemble_results<S: SearchStore>(
    resolved: &MatchSet,
    criteria: &[Criterion],
    store: &S,
) -> Vec<SearchResult> {
    resolved
        .iter()
        .map(|path| {
            let reason = match_reason(path, criteria);
            match store.get_display_info(path) {
                Ok(Some(info)) => build_result(info, reason),
                Ok(None) => {
                    log::warn!("No display info found for {path}, returning a bare record");
                    fallback_result(path, reason)
                }
                Err(e) => {
                    log::warn!(
                        "Failed to retrieve display info for {path}, returning a bare record. Error is {e:?}"
                    );
                    fallback_result(path, reason)
                }
            }
        })
        .collect()
}

/// the reasons of every criterion that `path` itself matched, in criteria order
fn match_reason(path: &str, criteria: &[Criterion]) -> String {
    criteria
        .iter()
        .filter(|criterion| criterion.matches.contains(path))
        .map(|criterion| criterion.kind.reason())
        .join(", ")
}

fn build_result(info: DisplayInfo, match_reason: String) -> SearchResult {
    if info.file_type.is_folder_type() {
        return SearchResult::Folder(FolderResult {
            name: info.name,
            path: info.path,
            item_count: info.item_count,
            preview_path: info.preview_path,
            match_reason,
        });
    }
    let extension = Path::new(&info.name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    SearchResult::File(FileResult {
        name: info.name,
        path: info.path,
        extension,
        size: info.file_size,
        modified: info.last_modified,
        match_reason,
    })
}

fn fallback_result(path: &str, match_reason: String) -> SearchResult {
    SearchResult::Folder(FolderResult {
        name: last_segment(path).to_string(),
        path: path.to_string(),
        item_count: 0,
        preview_path: None,
        match_reason,
    })
}
