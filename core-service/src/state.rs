//! Snapshot of everything a host renders.

use crate::command::OutputMode;
use provider_dropbox::ListingEntry;
use serde::{Deserialize, Serialize};

/// Where the current listing came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingSource {
    Search { query: String },
    /// `path` is `""` for the root.
    Folder { path: String },
}

/// The file shown in the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFile {
    pub name: String,
    pub path: String,
    pub content: String,
    /// Edited locally since the last load or save.
    pub dirty: bool,
}

impl OpenFile {
    pub fn new(name: impl Into<String>, path: impl Into<String>, content: String) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content,
            dirty: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// No app key configured; only setup guidance is shown.
    pub setup_required: bool,
    pub signed_in: bool,
    pub listing: Vec<ListingEntry>,
    pub listing_source: Option<ListingSource>,
    pub open_file: Option<OpenFile>,
    /// `Some` while the open file is in edit mode.
    pub edit_buffer: Option<String>,
    pub output_mode: OutputMode,
    pub searching: bool,
    pub saving: bool,
    pub status: String,
}

impl AppState {
    pub fn is_editing(&self) -> bool {
        self.edit_buffer.is_some()
    }

    /// Folder new files are created in. The root unless a folder is listed.
    pub fn current_folder(&self) -> &str {
        match &self.listing_source {
            Some(ListingSource::Folder { path }) => path,
            _ => "",
        }
    }

    /// Drop everything tied to the signed-in account.
    pub(crate) fn reset_session(&mut self) {
        self.signed_in = false;
        self.listing.clear();
        self.listing_source = None;
        self.open_file = None;
        self.edit_buffer = None;
        self.searching = false;
        self.saving = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_folder_defaults_to_root() {
        let mut state = AppState::default();
        assert_eq!(state.current_folder(), "");

        state.listing_source = Some(ListingSource::Search {
            query: "report".into(),
        });
        assert_eq!(state.current_folder(), "");

        state.listing_source = Some(ListingSource::Folder {
            path: "/docs".into(),
        });
        assert_eq!(state.current_folder(), "/docs");
    }

    #[test]
    fn test_reset_session_keeps_output_mode() {
        let mut state = AppState {
            signed_in: true,
            output_mode: OutputMode::Clipboard,
            open_file: Some(OpenFile::new("a.txt", "/a.txt", "x".into())),
            edit_buffer: Some("y".into()),
            saving: true,
            ..AppState::default()
        };

        state.reset_session();

        assert!(!state.signed_in);
        assert!(state.open_file.is_none());
        assert!(!state.is_editing());
        assert!(!state.saving);
        assert_eq!(state.output_mode, OutputMode::Clipboard);
    }
}
