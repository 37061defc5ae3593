use std::fmt::{Display, Formatter};

use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// the fixed vocabulary used to classify every item in the tree.
///
/// The first five variants are folder-like, the rest are file-like. An item is never both
#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Copy, Clone)]
pub enum FileTypes {
    Root,
    Publisher,
    Collection,
    Model,
    Variant,
    #[serde(rename = "STL File")]
    Stl,
    #[serde(rename = "Slicer File")]
    Slicer,
    Image,
    Document,
    Unknown,
}

/// folder names that always mark a variant of a model, no matter how deep they are
static VARIANT_FOLDER_NAMES: [&str; 4] = ["Supported", "Unsupported", "Parts", "Split"];

impl FileTypes {
    /// the label stored in the database and used by the api
    pub fn label(&self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Publisher => "Publisher",
            Self::Collection => "Collection",
            Self::Model => "Model",
            Self::Variant => "Variant",
            Self::Stl => "STL File",
            Self::Slicer => "Slicer File",
            Self::Image => "Image",
            Self::Document => "Document",
            Self::Unknown => "Unknown",
        }
    }

    /// parses an exact label. Returns `None` for anything outside the vocabulary
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Root" => Some(Self::Root),
            "Publisher" => Some(Self::Publisher),
            "Collection" => Some(Self::Collection),
            "Model" => Some(Self::Model),
            "Variant" => Some(Self::Variant),
            "STL File" => Some(Self::Stl),
            "Slicer File" => Some(Self::Slicer),
            "Image" => Some(Self::Image),
            "Document" => Some(Self::Document),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn is_folder_type(&self) -> bool {
        matches!(
            self,
            Self::Root | Self::Publisher | Self::Collection | Self::Model | Self::Variant
        )
    }
}

/// Determines the type of an item based on its relative path, whether it's a directory, and its extension.
///
/// Directories are classified by depth (`Publisher/Collection/Model`), except for the well-known variant folder names.
/// Files are classified by their extension alone
pub fn determine_file_type(path: &str, is_dir: bool, extension: Option<&str>) -> FileTypes {
    if is_dir {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let name = segments.last().copied().unwrap_or_default();
        return match segments.len() {
            0 => FileTypes::Root,
            1 => FileTypes::Publisher,
            2 => FileTypes::Collection,
            _ if VARIANT_FOLDER_NAMES.contains(&name) => FileTypes::Variant,
            3 => FileTypes::Model,
            _ => FileTypes::Variant,
        };
    }
    let Some(extension) = extension else {
        return FileTypes::Unknown;
    };
    match extension.to_ascii_lowercase().as_str() {
        "stl" => FileTypes::Stl,
        "lys" => FileTypes::Slicer,
        "png" | "jpg" | "jpeg" | "gif" | "webp" => FileTypes::Image,
        "pdf" | "txt" | "md" => FileTypes::Document,
        _ => FileTypes::Unknown,
    }
}

impl Display for FileTypes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl ToSql for FileTypes {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.label().into())
    }
}

impl FromSql for FileTypes {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let label = value.as_str()?;
        Ok(Self::from_label(label).unwrap_or_else(|| {
            log::warn!("item type from database {label} does not match any branches in FileTypes::from_label");
            Self::Unknown
        }))
    }
}

impl Default for FileTypes {
    fn default() -> Self {
        Self::Unknown
    }
}

#[cfg(test)]
mod determine_file_type_tests {
    use super::*;

    #[test]
    fn folders_are_classified_by_depth() {
        assert_eq!(FileTypes::Root, determine_file_type("", true, None));
        assert_eq!(FileTypes::Publisher, determine_file_type("Pub", true, None));
        assert_eq!(FileTypes::Collection, determine_file_type("Pub/Coll", true, None));
        assert_eq!(FileTypes::Model, determine_file_type("Pub/Coll/Dragon", true, None));
        assert_eq!(
            FileTypes::Variant,
            determine_file_type("Pub/Coll/Dragon/Extras", true, None)
        );
    }

    #[test]
    fn variant_folder_names_win_over_depth() {
        assert_eq!(
            FileTypes::Variant,
            determine_file_type("Pub/Coll/Supported", true, None)
        );
        assert_eq!(
            FileTypes::Variant,
            determine_file_type("Pub/Coll/Dragon/Parts", true, None)
        );
        // publisher and collection depths are never variants
        assert_eq!(FileTypes::Publisher, determine_file_type("Split", true, None));
    }

    #[test]
    fn files_are_classified_by_extension() {
        assert_eq!(FileTypes::Stl, determine_file_type("a/b.STL", false, Some("STL")));
        assert_eq!(FileTypes::Slicer, determine_file_type("a/b.lys", false, Some("lys")));
        assert_eq!(FileTypes::Image, determine_file_type("a/b.jpeg", false, Some("jpeg")));
        assert_eq!(FileTypes::Document, determine_file_type("a/b.md", false, Some("md")));
        assert_eq!(FileTypes::Unknown, determine_file_type("a/b.zip", false, Some("zip")));
        assert_eq!(FileTypes::Unknown, determine_file_type("a/README", false, None));
    }

    #[test]
    fn labels_round_trip_through_from_label() {
        assert_eq!(Some(FileTypes::Stl), FileTypes::from_label("STL File"));
        assert_eq!(None, FileTypes::from_label("stl file"));
        assert_eq!("Slicer File", FileTypes::Slicer.to_string());
        assert!(FileTypes::Model.is_folder_type());
        assert!(!FileTypes::Image.is_folder_type());
    }
}
