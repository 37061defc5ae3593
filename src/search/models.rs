use std::collections::HashSet;

use itertools::Itertools;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

use crate::model::file_types::FileTypes;
use crate::model::response::BasicMessage;

/// the validated search parameters. Absent and blank criteria are normalized away here,
/// so every `Some` / non-empty field is an active criterion
#[derive(Debug, PartialEq, Clone, Default)]
pub struct SearchRequest {
    /// free text, matched exactly as typed. Never blank
    pub query: Option<String>,
    /// required tags in the order they were requested, without blanks or duplicates
    pub tags: Vec<String>,
    pub file_type: Option<FileTypeFilter>,
}

/// the file type criterion. Labels outside of [`FileTypes`] are kept so they can still restrict the search
/// (to nothing) and show up in the match reason
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum FileTypeFilter {
    Known(FileTypes),
    Unrecognized(String),
}

/// a set of item paths that remembers the order paths were first inserted in
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    paths: Vec<String>,
    index: HashSet<String>,
}

/// one active criterion and everything that matched it
#[derive(Debug, Clone)]
pub struct Criterion {
    pub kind: CriterionKind,
    pub matches: MatchSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CriterionKind {
    Text(String),
    Tags(Vec<String>),
    FileType(String),
}

/// what the result assembler needs to know about a single item
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    pub name: String,
    pub path: String,
    pub file_type: FileTypes,
    /// number of direct children
    pub item_count: u32,
    /// the shallowest image nested under the item, if any
    pub preview_path: Option<String>,
    pub file_size: u64,
    pub last_modified: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(crate = "rocket::serde", tag = "type")]
pub enum SearchResult {
    #[serde(rename = "folder")]
    Folder(FolderResult),
    #[serde(rename = "file")]
    File(FileResult),
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct FolderResult {
    pub name: String,
    pub path: String,
    pub item_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_path: Option<String>,
    pub match_reason: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct FileResult {
    pub name: String,
    pub path: String,
    /// lowercase, without the leading `.`. Empty if the file has no extension
    pub extension: String,
    pub size: u64,
    pub modified: String,
    pub match_reason: String,
}

#[derive(Responder)]
pub enum SearchResponse {
    #[response(status = 200, content_type = "json")]
    Success(Json<Vec<SearchResult>>),
    #[response(status = 500, content_type = "json")]
    GenericError(Json<BasicMessage>),
}

// ----------------------------------

impl SearchRequest {
    pub fn new(query: Option<String>, tags: Vec<String>, file_type: Option<String>) -> Self {
        let not_blank = |s: &String| !s.trim().is_empty();
        let query = query.filter(not_blank);
        let tags = tags.into_iter().filter(not_blank).unique().collect();
        let file_type = file_type
            .filter(not_blank)
            .map(|label| FileTypeFilter::parse(&label));
        Self {
            query,
            tags,
            file_type,
        }
    }

    /// `false` when nothing was specified, in which case the search yields nothing
    pub fn has_criteria(&self) -> bool {
        self.query.is_some() || !self.tags.is_empty() || self.file_type.is_some()
    }
}

impl FileTypeFilter {
    pub fn parse(label: &str) -> Self {
        match FileTypes::from_label(label) {
            Some(file_type) => Self::Known(file_type),
            None => Self::Unrecognized(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Known(file_type) => file_type.label(),
            Self::Unrecognized(label) => label,
        }
    }
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// adds the path if it isn't already present. Returns `true` if it was added
    pub fn insert(&mut self, path: String) -> bool {
        if self.index.contains(&path) {
            return false;
        }
        self.index.insert(path.clone());
        self.paths.push(path);
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.paths.iter()
    }

    /// the paths in both sets, in the order of `self`
    pub fn intersection(&self, other: &MatchSet) -> MatchSet {
        self.iter()
            .filter(|path| other.contains(path))
            .cloned()
            .collect()
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl FromIterator<String> for MatchSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = MatchSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<String> for MatchSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for path in iter {
            self.insert(path);
        }
    }
}

impl PartialEq for MatchSet {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl CriterionKind {
    /// the human-readable reason shown on results that satisfy this criterion
    pub fn reason(&self) -> String {
        match self {
            Self::Text(query) => format!("Matches \"{query}\""),
            Self::Tags(tags) => format!("Has tags: {}", tags.join(", ")),
            Self::FileType(label) => format!("Type: {label}"),
        }
    }
}

impl SearchResult {
    pub fn path(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.path,
            Self::File(file) => &file.path,
        }
    }

    pub fn match_reason(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.match_reason,
            Self::File(file) => &file.match_reason,
        }
    }
}
