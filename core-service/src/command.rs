//! User intents accepted by the [`FileBrowser`](crate::FileBrowser).
//!
//! Hosts translate clicks and key presses into [`Command`] values; the
//! browser answers every command with the resulting status line.

use serde::{Deserialize, Serialize};

/// What opening a file does with its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Show the file in the viewer.
    #[default]
    View,
    /// Copy the file to the clipboard without opening it.
    Clipboard,
}

/// The user's answer to a destructive-action prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confirmation {
    Confirmed,
    Declined,
    /// The prompt was closed without an answer.
    Dismissed,
}

impl Confirmation {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SignIn,
    /// Finish a sign-in from the query the host was reloaded with.
    CompleteSignIn,
    SignOut,
    Search {
        query: String,
        #[serde(default)]
        folders_only: bool,
    },
    ListFolder {
        path: String,
    },
    Open {
        path: String,
        name: String,
        #[serde(default)]
        is_folder: bool,
    },
    BeginEdit,
    UpdateEdit {
        text: String,
    },
    EndEdit,
    Save,
    CreateFile {
        name: String,
        #[serde(default)]
        content: String,
    },
    Rename {
        path: String,
        new_name: String,
    },
    Delete {
        path: String,
        confirmation: Confirmation,
    },
    CopyContent,
    Clear,
    SetOutputMode {
        mode: OutputMode,
    },
}

impl Command {
    /// Stable name used in logs and `OperationFailed` events.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SignIn => "sign_in",
            Command::CompleteSignIn => "complete_sign_in",
            Command::SignOut => "sign_out",
            Command::Search { .. } => "search",
            Command::ListFolder { .. } => "list_folder",
            Command::Open { .. } => "open",
            Command::BeginEdit => "begin_edit",
            Command::UpdateEdit { .. } => "update_edit",
            Command::EndEdit => "end_edit",
            Command::Save => "save",
            Command::CreateFile { .. } => "create_file",
            Command::Rename { .. } => "rename",
            Command::Delete { .. } => "delete",
            Command::CopyContent => "copy_content",
            Command::Clear => "clear",
            Command::SetOutputMode { .. } => "set_output_mode",
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Command::Search {
            query: query.into(),
            folders_only: false,
        }
    }

    pub fn open_file(path: impl Into<String>, name: impl Into<String>) -> Self {
        Command::Open {
            path: path.into(),
            name: name.into(),
            is_folder: false,
        }
    }
}
