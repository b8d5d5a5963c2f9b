//! Dropbox API request and response types
//!
//! Wire structures for the Dropbox API v2 routes used by the connector.

use serde::{Deserialize, Serialize};

/// Dropbox metadata record (file, folder or deleted entry)
///
/// See: https://www.dropbox.com/developers/documentation/http/documentation#files-get_metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    /// `file`, `folder` or `deleted`. Absent on upload results.
    #[serde(rename = ".tag", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Last path component
    pub name: String,

    /// `id:...`; absent for deleted entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,

    /// File size in bytes (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Metadata {
    pub fn is_folder(&self) -> bool {
        self.tag.as_deref() == Some("folder")
    }
}

/// `files/search_v2` arguments
#[derive(Debug, Serialize)]
pub struct SearchArg<'a> {
    pub query: &'a str,
    pub options: SearchArgOptions,
}

#[derive(Debug, Serialize)]
pub struct SearchArgOptions {
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_categories: Option<Vec<FileCategory>>,
}

/// Union member of `FileCategory`, e.g. `{".tag": "folder"}`
#[derive(Debug, Serialize)]
pub struct FileCategory {
    #[serde(rename = ".tag")]
    pub tag: &'static str,
}

impl FileCategory {
    pub const FOLDER: FileCategory = FileCategory { tag: "folder" };
}

/// `files/search_v2` result
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub matches: Vec<SearchMatch>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchMatch {
    pub metadata: MatchMetadata,
}

/// Search matches wrap the record in `{".tag": "metadata", "metadata": {...}}`;
/// older answers carry the record directly.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MatchMetadata {
    Wrapped { metadata: Metadata },
    Bare(Metadata),
}

impl MatchMetadata {
    pub fn into_metadata(self) -> Metadata {
        match self {
            MatchMetadata::Wrapped { metadata } => metadata,
            MatchMetadata::Bare(metadata) => metadata,
        }
    }
}

/// `files/list_folder` arguments
#[derive(Debug, Serialize)]
pub struct ListFolderArg<'a> {
    /// `""` for the root
    pub path: &'a str,
    pub recursive: bool,
    pub include_deleted: bool,
}

/// `files/list_folder/continue` arguments
#[derive(Debug, Serialize)]
pub struct ListFolderContinueArg<'a> {
    pub cursor: &'a str,
}

/// `files/list_folder` and `files/list_folder/continue` result
#[derive(Debug, Deserialize)]
pub struct ListFolderResult {
    pub entries: Vec<Metadata>,
    pub cursor: String,
    pub has_more: bool,
}

/// Single-path argument (`files/download`, `files/delete_v2`)
#[derive(Debug, Serialize)]
pub struct PathArg<'a> {
    pub path: &'a str,
}

/// Upload write mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Fail (or autorename) when the path exists
    #[default]
    Add,
    /// Replace whatever is at the path
    Overwrite,
}

/// `files/upload` arguments
#[derive(Debug, Serialize)]
pub struct UploadArg<'a> {
    pub path: &'a str,
    pub mode: WriteMode,
    pub autorename: bool,
    pub mute: bool,
}

/// `files/move_v2` arguments
#[derive(Debug, Serialize)]
pub struct RelocationArg<'a> {
    pub from_path: &'a str,
    pub to_path: &'a str,
    pub autorename: bool,
}

/// `files/move_v2` and `files/delete_v2` result
#[derive(Debug, Deserialize)]
pub struct MetadataResult {
    pub metadata: Metadata,
}

/// Error body of a failed route
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_metadata_wrapped_and_bare() {
        let wrapped: SearchMatch = serde_json::from_value(json!({
            "match_type": {".tag": "filename"},
            "metadata": {
                ".tag": "metadata",
                "metadata": {".tag": "file", "name": "report.txt", "id": "id:1",
                             "path_lower": "/report.txt", "path_display": "/Report.txt"}
            }
        }))
        .unwrap();
        assert_eq!(wrapped.metadata.into_metadata().name, "report.txt");

        let bare: SearchMatch = serde_json::from_value(json!({
            "metadata": {".tag": "folder", "name": "Reports", "id": "id:2"}
        }))
        .unwrap();
        let metadata = bare.metadata.into_metadata();
        assert_eq!(metadata.name, "Reports");
        assert!(metadata.is_folder());
    }

    #[test]
    fn test_upload_arg_wire_format() {
        let arg = UploadArg {
            path: "/notes.txt",
            mode: WriteMode::Overwrite,
            autorename: false,
            mute: true,
        };
        assert_eq!(
            serde_json::to_value(&arg).unwrap(),
            json!({"path": "/notes.txt", "mode": "overwrite", "autorename": false, "mute": true})
        );
    }

    #[test]
    fn test_search_arg_folder_category() {
        let arg = SearchArg {
            query: "report",
            options: SearchArgOptions {
                max_results: 20,
                file_categories: Some(vec![FileCategory::FOLDER]),
            },
        };
        assert_eq!(
            serde_json::to_value(&arg).unwrap(),
            json!({"query": "report", "options": {"max_results": 20, "file_categories": [{".tag": "folder"}]}})
        );
    }

    #[test]
    fn test_upload_result_without_tag() {
        let metadata: Metadata = serde_json::from_value(json!({
            "name": "a.txt", "id": "id:3", "path_lower": "/a.txt",
            "path_display": "/a.txt", "size": 5, "rev": "015f"
        }))
        .unwrap();
        assert!(!metadata.is_folder());
        assert_eq!(metadata.size, Some(5));
    }
}
