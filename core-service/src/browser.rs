//! # File Browser
//!
//! The state machine behind the UI: every [`Command`] runs against the shared
//! [`AppState`] and answers with the new status line.
//!
//! ## Overview
//!
//! - Sign-in is delegated to [`AuthManager`]; file operations go through a
//!   [`DropboxConnector`] built from the current access token.
//! - State lives behind an async `RwLock` that is released before every
//!   network call, so a slow request never blocks other commands.
//! - `searching` and `saving` reject duplicates of the same command while one
//!   is in flight. Other commands interleave; the last response wins.
//! - Remote failures become `Error: <msg>` (`Error saving: <msg>` for saves)
//!   and leave the browser interactive.
//!
//! Without an app key the browser is in setup-required mode: every command
//! answers with the setup guidance and nothing touches the network.

use crate::command::{Command, Confirmation, OutputMode};
use crate::error::{CoreError, Result};
use crate::state::{AppState, ListingSource, OpenFile};
use crate::BrowserDependencies;
use bridge_traits::{http::HttpClient, Clipboard};
use core_auth::AuthManager;
use core_runtime::config::AppConfig;
use core_runtime::error::SETUP_GUIDANCE;
use core_runtime::events::{CoreEvent, EventBus, FileEvent, StatusEvent};
use provider_dropbox::{
    normalize_path, sort_listing, DropboxConnector, SearchOptions, UploadOptions,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Dropbox file browser for a single signed-in account.
pub struct FileBrowser {
    config: AppConfig,
    /// `None` in setup-required mode.
    auth: Option<AuthManager>,
    http_client: Arc<dyn HttpClient>,
    clipboard: Option<Arc<dyn Clipboard>>,
    event_bus: EventBus,
    state: RwLock<AppState>,
}

impl FileBrowser {
    pub fn new(config: AppConfig, deps: BrowserDependencies) -> Self {
        let auth = if config.requires_setup() {
            warn!("No Dropbox app key configured; showing setup guidance");
            None
        } else {
            match AuthManager::from_app_config(
                &config,
                Arc::clone(&deps.http_client),
                deps.session_store,
                deps.navigator,
                deps.event_bus.clone(),
            ) {
                Ok(manager) => Some(manager),
                Err(e) => {
                    warn!(error = %e, "Auth setup failed; showing setup guidance");
                    None
                }
            }
        };

        let state = AppState {
            setup_required: auth.is_none(),
            status: if auth.is_none() {
                SETUP_GUIDANCE.to_string()
            } else {
                String::new()
            },
            ..AppState::default()
        };

        Self {
            config,
            auth,
            http_client: deps.http_client,
            clipboard: deps.clipboard,
            event_bus: deps.event_bus,
            state: RwLock::new(state),
        }
    }

    /// Run one command and return the resulting status line.
    ///
    /// Never fails: errors are reported through the status and an
    /// `OperationFailed` event.
    #[instrument(skip_all, fields(command = command.name()))]
    pub async fn execute(&self, command: Command) -> String {
        let Some(auth) = self.auth.as_ref() else {
            debug!("Setup required; command ignored");
            return self.set_status(SETUP_GUIDANCE).await;
        };

        let operation = command.name();
        let is_save = matches!(command, Command::Save);

        match self.dispatch(auth, command).await {
            Ok(Some(status)) => self.set_status(status).await,
            Ok(None) => self.status().await,
            Err(err) => {
                warn!(error = %err, "Command failed");
                if !matches!(err, CoreError::Auth(_)) {
                    self.emit(FileEvent::OperationFailed {
                        operation: operation.to_string(),
                        message: err.to_string(),
                    });
                }
                self.set_status(failure_status(&err, is_save)).await
            }
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> AppState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> String {
        self.state.read().await.status.clone()
    }

    pub fn is_setup_required(&self) -> bool {
        self.auth.is_none()
    }

    pub fn auth(&self) -> Option<&AuthManager> {
        self.auth.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// `Ok(None)` leaves the status untouched.
    async fn dispatch(&self, auth: &AuthManager, command: Command) -> Result<Option<String>> {
        match command {
            Command::SignIn => {
                auth.begin_sign_in().await?;
                Ok(Some("Redirecting to Dropbox...".to_string()))
            }
            Command::CompleteSignIn => self.complete_sign_in(auth).await,
            Command::SignOut => {
                auth.sign_out().await;
                self.state.write().await.reset_session();
                Ok(Some("Signed out".to_string()))
            }
            Command::Search {
                query,
                folders_only,
            } => self.search(auth, &query, folders_only).await,
            Command::ListFolder { path } => self.list_folder(auth, &path).await,
            Command::Open {
                path,
                name,
                is_folder,
            } => {
                if is_folder {
                    self.list_folder(auth, &path).await
                } else {
                    self.open(auth, &path, &name).await
                }
            }
            Command::BeginEdit => {
                self.begin_edit().await;
                Ok(None)
            }
            Command::UpdateEdit { text } => {
                if let Some(buffer) = self.state.write().await.edit_buffer.as_mut() {
                    *buffer = text;
                }
                Ok(None)
            }
            Command::EndEdit => {
                self.end_edit().await;
                Ok(None)
            }
            Command::Save => self.save(auth).await,
            Command::CreateFile { name, content } => self.create_file(auth, &name, content).await,
            Command::Rename { path, new_name } => self.rename(auth, &path, &new_name).await,
            Command::Delete { path, confirmation } => {
                self.delete(auth, &path, confirmation).await
            }
            Command::CopyContent => self.copy_content().await,
            Command::Clear => {
                let mut state = self.state.write().await;
                state.open_file = None;
                state.edit_buffer = None;
                Ok(None)
            }
            Command::SetOutputMode { mode } => {
                self.state.write().await.output_mode = mode;
                Ok(None)
            }
        }
    }

    async fn complete_sign_in(&self, auth: &AuthManager) -> Result<Option<String>> {
        match auth.complete_sign_in().await? {
            Some(_session) => {
                self.state.write().await.signed_in = true;
                Ok(Some("Signed in".to_string()))
            }
            None => Ok(None),
        }
    }

    async fn search(
        &self,
        auth: &AuthManager,
        query: &str,
        folders_only: bool,
    ) -> Result<Option<String>> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        let Some(connector) = self.connector(auth).await else {
            debug!("Not signed in; search ignored");
            return Ok(None);
        };

        {
            let mut state = self.state.write().await;
            if state.searching {
                debug!("Search already in flight");
                return Ok(None);
            }
            state.searching = true;
        }
        self.set_status("Searching...").await;

        let options = SearchOptions {
            folders_only,
            max_results: self.config.search_max_results,
        };
        let result = connector.search(query, &options).await;

        let count = {
            let mut state = self.state.write().await;
            state.searching = false;
            let entries = result?;
            if !state.signed_in {
                debug!("Signed out while searching; results dropped");
                return Ok(None);
            }
            state.listing = entries;
            state.listing_source = Some(ListingSource::Search {
                query: query.to_string(),
            });
            state.listing.len()
        };

        self.emit(FileEvent::SearchCompleted {
            query: query.to_string(),
            count,
        });
        Ok(Some(format!("Found {} files", count)))
    }

    async fn list_folder(&self, auth: &AuthManager, path: &str) -> Result<Option<String>> {
        let Some(connector) = self.connector(auth).await else {
            return Ok(None);
        };

        let path = normalize_path(path);
        let shown = if path.is_empty() { "/" } else { path.as_str() };
        self.set_status(format!("Loading {}...", shown)).await;

        let entries = connector.list_folder(&path).await?;
        let count = entries.len();
        {
            let mut state = self.state.write().await;
            if !state.signed_in {
                debug!("Signed out while listing; entries dropped");
                return Ok(None);
            }
            state.listing = entries;
            state.listing_source = Some(ListingSource::Folder { path: path.clone() });
        }

        self.emit(FileEvent::FolderListed { path, count });
        Ok(Some(format!("Found {} items", count)))
    }

    async fn open(&self, auth: &AuthManager, path: &str, name: &str) -> Result<Option<String>> {
        let Some(connector) = self.connector(auth).await else {
            return Ok(None);
        };
        let mode = self.state.read().await.output_mode;

        self.set_status(format!("Fetching {}...", name)).await;
        let content = connector.download(path).await?;

        match mode {
            OutputMode::Clipboard => {
                self.write_clipboard(&content).await?;
                self.emit(FileEvent::CopiedToClipboard {
                    name: name.to_string(),
                });
                Ok(Some(format!("Copied \"{}\" to clipboard", name)))
            }
            OutputMode::View => {
                {
                    let mut state = self.state.write().await;
                    state.open_file = Some(OpenFile::new(name, path, content));
                    state.edit_buffer = None;
                }
                self.emit(FileEvent::Opened {
                    path: path.to_string(),
                    name: name.to_string(),
                });
                Ok(Some(format!("Loaded \"{}\"", name)))
            }
        }
    }

    async fn begin_edit(&self) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if state.edit_buffer.is_none() {
            state.edit_buffer = state.open_file.as_ref().map(|file| file.content.clone());
        }
    }

    async fn end_edit(&self) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let Some(buffer) = state.edit_buffer.take() else {
            return;
        };
        if let Some(file) = state.open_file.as_mut() {
            if file.content != buffer {
                file.content = buffer;
                file.dirty = true;
            }
        }
    }

    #[instrument(skip_all)]
    async fn save(&self, auth: &AuthManager) -> Result<Option<String>> {
        let Some(connector) = self.connector(auth).await else {
            return Ok(None);
        };

        let (name, path, content) = {
            let mut state = self.state.write().await;
            if state.saving {
                debug!("Save already in flight");
                return Ok(None);
            }
            let Some(file) = state.open_file.as_ref() else {
                return Ok(None);
            };
            let content = state
                .edit_buffer
                .clone()
                .unwrap_or_else(|| file.content.clone());
            let target = (file.name.clone(), file.path.clone(), content);
            state.saving = true;
            target
        };

        self.set_status(format!("Saving \"{}\"...", name)).await;
        let result = connector
            .upload(&path, content.clone(), &UploadOptions::overwrite())
            .await;

        {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            state.saving = false;
            result?;

            // Another file may have been opened while the upload ran.
            if let Some(file) = state
                .open_file
                .as_mut()
                .filter(|file| same_path(&file.path, &path))
            {
                file.content = content;
                file.dirty = false;
                state.edit_buffer = None;
            }
        }

        info!("File saved");
        self.emit(FileEvent::Saved {
            path,
            name: name.clone(),
        });
        Ok(Some(format!("Saved \"{}\" successfully!", name)))
    }

    async fn create_file(
        &self,
        auth: &AuthManager,
        name: &str,
        content: String,
    ) -> Result<Option<String>> {
        let name = validate_name(name)?;
        let Some(connector) = self.connector(auth).await else {
            return Ok(None);
        };

        let folder = self.state.read().await.current_folder().to_string();
        let path = format!("{}/{}", folder, name);

        self.set_status(format!("Creating \"{}\"...", name)).await;
        let entry = connector
            .upload(&path, content.clone(), &UploadOptions::create())
            .await?;

        {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            let showing_folder = matches!(
                &state.listing_source,
                Some(ListingSource::Folder { path }) if *path == folder
            );
            if showing_folder {
                state.listing.retain(|item| !same_path(&item.path, &entry.path));
                state.listing.push(entry.clone());
                sort_listing(&mut state.listing);
            }
            state.open_file = Some(OpenFile::new(
                entry.name.clone(),
                entry.path.clone(),
                content,
            ));
            state.edit_buffer = None;
        }

        self.emit(FileEvent::Created {
            path: entry.path,
            name: entry.name.clone(),
        });
        Ok(Some(format!("Created \"{}\"", entry.name)))
    }

    async fn rename(
        &self,
        auth: &AuthManager,
        path: &str,
        new_name: &str,
    ) -> Result<Option<String>> {
        let new_name = validate_name(new_name)?;
        let current_name = self.entry_name(path).await;
        if current_name == new_name {
            debug!("Name unchanged; nothing to rename");
            return Ok(None);
        }
        let Some(connector) = self.connector(auth).await else {
            return Ok(None);
        };

        let parent = path.rsplit_once('/').map_or("", |(parent, _)| parent);
        let to_path = format!("{}/{}", parent, new_name);

        self.set_status(format!("Renaming \"{}\"...", current_name)).await;
        let entry = connector.move_entry(path, &to_path, true).await?;

        {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            for item in state
                .listing
                .iter_mut()
                .filter(|item| same_path(&item.path, path))
            {
                *item = entry.clone();
            }
            if matches!(state.listing_source, Some(ListingSource::Folder { .. })) {
                sort_listing(&mut state.listing);
            }
            if let Some(file) = state.open_file.as_mut() {
                if same_path(&file.path, path) {
                    file.name = entry.name.clone();
                    file.path = entry.path.clone();
                } else if let Some(rest) = strip_folder(&file.path, path) {
                    file.path = format!("{}{}", entry.path, rest);
                }
            }
        }

        self.emit(FileEvent::Renamed {
            from: path.to_string(),
            to: entry.path,
            name: entry.name.clone(),
        });
        Ok(Some(format!("Renamed \"{}\" to \"{}\"", current_name, entry.name)))
    }

    async fn delete(
        &self,
        auth: &AuthManager,
        path: &str,
        confirmation: Confirmation,
    ) -> Result<Option<String>> {
        if !confirmation.is_confirmed() {
            debug!(?confirmation, "Delete not confirmed");
            return Ok(Some("Delete cancelled".to_string()));
        }
        let Some(connector) = self.connector(auth).await else {
            return Ok(None);
        };

        let name = self.entry_name(path).await;
        self.set_status(format!("Deleting \"{}\"...", name)).await;
        connector.delete(path).await?;

        {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            state.listing.retain(|item| {
                !same_path(&item.path, path) && strip_folder(&item.path, path).is_none()
            });
            let open_removed = state.open_file.as_ref().map_or(false, |file| {
                same_path(&file.path, path) || strip_folder(&file.path, path).is_some()
            });
            if open_removed {
                state.open_file = None;
                state.edit_buffer = None;
            }
        }

        self.emit(FileEvent::Deleted {
            path: path.to_string(),
        });
        Ok(Some(format!("Deleted \"{}\"", name)))
    }

    async fn copy_content(&self) -> Result<Option<String>> {
        let (name, text) = {
            let state = self.state.read().await;
            let Some(file) = state.open_file.as_ref() else {
                return Ok(None);
            };
            let text = state
                .edit_buffer
                .clone()
                .unwrap_or_else(|| file.content.clone());
            (file.name.clone(), text)
        };

        self.write_clipboard(&text).await?;
        self.emit(FileEvent::CopiedToClipboard { name: name.clone() });
        Ok(Some(format!("Copied \"{}\" to clipboard", name)))
    }

    async fn connector(&self, auth: &AuthManager) -> Option<DropboxConnector> {
        let token = auth.access_token().await?;
        Some(
            DropboxConnector::new(
                Arc::clone(&self.http_client),
                self.config.endpoints.clone(),
                token,
            )
            .with_timeout(self.config.request_timeout),
        )
    }

    async fn write_clipboard(&self, text: &str) -> Result<()> {
        let clipboard = self
            .clipboard
            .as_ref()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "clipboard".to_string(),
                message: "this host cannot copy text".to_string(),
            })?;
        clipboard.write_text(text).await?;
        Ok(())
    }

    /// Display name for `path`: the listed or open entry's name, else the
    /// last path segment.
    async fn entry_name(&self, path: &str) -> String {
        let state = self.state.read().await;
        state
            .listing
            .iter()
            .find(|item| same_path(&item.path, path))
            .map(|item| item.name.clone())
            .or_else(|| {
                state
                    .open_file
                    .as_ref()
                    .filter(|file| same_path(&file.path, path))
                    .map(|file| file.name.clone())
            })
            .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(path).to_string())
    }

    async fn set_status(&self, status: impl Into<String>) -> String {
        let status = status.into();
        self.state.write().await.status = status.clone();
        self.event_bus
            .emit(CoreEvent::Status(StatusEvent::new(status.clone())))
            .ok();
        status
    }

    fn emit(&self, event: FileEvent) {
        self.event_bus.emit(CoreEvent::Files(event)).ok();
    }
}

fn failure_status(err: &CoreError, is_save: bool) -> String {
    match err {
        CoreError::Auth(e) => e.to_string(),
        _ if is_save => format!("Error saving: {}", err),
        _ => format!("Error: {}", err),
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    let reason = if trimmed.is_empty() {
        "name is empty"
    } else if trimmed.contains('/') {
        "name contains '/'"
    } else {
        return Ok(trimmed);
    };
    Err(CoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Dropbox paths are case-insensitive.
fn same_path(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Remainder of `path` below `folder`, starting with `/`.
fn strip_folder<'a>(path: &'a str, folder: &str) -> Option<&'a str> {
    let head = path.get(..folder.len())?;
    let rest = &path[folder.len()..];
    (same_path(head, folder) && rest.starts_with('/')).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::storage::{MemorySessionStore, SessionStore};
    use bridge_traits::Navigator;
    use core_auth::CODE_VERIFIER_KEY;
    use mockall::mock;
    use std::sync::Mutex as StdMutex;

    mock! {
        pub HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    struct FakeNavigator(StdMutex<Option<String>>);

    impl Navigator for FakeNavigator {
        fn redirect(&self, _url: &str) -> BridgeResult<()> {
            Ok(())
        }

        fn current_url(&self) -> BridgeResult<Option<String>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn replace_url(&self, url: &str) -> BridgeResult<()> {
            *self.0.lock().unwrap() = Some(url.to_string());
            Ok(())
        }
    }

    fn config(client_id: Option<&str>) -> AppConfig {
        let mut builder = AppConfig::builder().redirect_uri("http://localhost:3000");
        if let Some(id) = client_id {
            builder = builder.client_id(id);
        }
        builder.build().unwrap()
    }

    async fn browser(http: MockHttpClient, client_id: Option<&str>) -> FileBrowser {
        let store = Arc::new(MemorySessionStore::new());
        store.set(CODE_VERIFIER_KEY, "verifier").await.unwrap();
        let deps = BrowserDependencies {
            http_client: Arc::new(http),
            session_store: store,
            navigator: Arc::new(FakeNavigator(StdMutex::new(Some(
                "http://localhost:3000/?code=abc".to_string(),
            )))),
            clipboard: None,
            event_bus: EventBus::new(32),
        };
        FileBrowser::new(config(client_id), deps)
    }

    fn expect_token(http: &mut MockHttpClient) {
        http.expect_execute()
            .withf(|req| req.url.ends_with("/oauth2/token"))
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"access_token":"sl.token"}"#)));
    }

    async fn open_file(browser: &FileBrowser, name: &str, content: &str) {
        browser.state.write().await.open_file =
            Some(OpenFile::new(name, format!("/{}", name), content.to_string()));
    }

    #[tokio::test]
    async fn test_setup_mode_only_restates_guidance() {
        // No expectations: any request fails the test.
        let browser = browser(MockHttpClient::new(), None).await;

        assert!(browser.is_setup_required());
        assert!(browser.state().await.setup_required);

        for command in [
            Command::SignIn,
            Command::CompleteSignIn,
            Command::search("report"),
        ] {
            assert_eq!(browser.execute(command).await, SETUP_GUIDANCE);
        }
    }

    #[tokio::test]
    async fn test_blank_app_key_requires_setup() {
        let browser = browser(MockHttpClient::new(), Some("   ")).await;
        assert!(browser.is_setup_required());
    }

    #[tokio::test]
    async fn test_complete_sign_in_sets_signed_in() {
        let mut http = MockHttpClient::new();
        expect_token(&mut http);
        let browser = browser(http, Some("app-key")).await;

        assert_eq!(browser.execute(Command::CompleteSignIn).await, "Signed in");
        assert!(browser.state().await.signed_in);
    }

    #[tokio::test]
    async fn test_search_is_noop_when_blank_or_signed_out() {
        let browser = browser(MockHttpClient::new(), Some("app-key")).await;

        assert_eq!(browser.execute(Command::search("   ")).await, "");
        assert_eq!(browser.execute(Command::search("report")).await, "");
        assert!(browser.state().await.listing_source.is_none());
    }

    #[tokio::test]
    async fn test_search_failure_clears_busy_flag() {
        let mut http = MockHttpClient::new();
        expect_token(&mut http);
        http.expect_execute()
            .withf(|req| req.url.ends_with("/2/files/search_v2"))
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    409,
                    r#"{"error_summary":"path/not_found/.."}"#,
                ))
            });
        let browser = browser(http, Some("app-key")).await;
        browser.execute(Command::CompleteSignIn).await;

        let status = browser.execute(Command::search("report")).await;

        assert_eq!(status, "Error: path/not_found/..");
        assert!(!browser.state().await.searching);
    }

    #[tokio::test]
    async fn test_duplicate_search_is_ignored_while_busy() {
        let mut http = MockHttpClient::new();
        expect_token(&mut http);
        let browser = browser(http, Some("app-key")).await;
        browser.execute(Command::CompleteSignIn).await;
        browser.state.write().await.searching = true;

        let status = browser.execute(Command::search("report")).await;

        assert_eq!(status, "Signed in");
    }

    #[tokio::test]
    async fn test_edit_cycle_marks_dirty_only_on_change() {
        let browser = browser(MockHttpClient::new(), Some("app-key")).await;
        open_file(&browser, "a.txt", "hello").await;

        browser.execute(Command::BeginEdit).await;
        assert_eq!(browser.state().await.edit_buffer.as_deref(), Some("hello"));
        browser.execute(Command::EndEdit).await;
        assert!(!browser.state().await.open_file.unwrap().dirty);

        browser.execute(Command::BeginEdit).await;
        browser
            .execute(Command::UpdateEdit {
                text: "hello world".into(),
            })
            .await;
        browser.execute(Command::EndEdit).await;

        let state = browser.state().await;
        let file = state.open_file.unwrap();
        assert!(state.edit_buffer.is_none());
        assert_eq!(file.content, "hello world");
        assert!(file.dirty);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let browser = browser(MockHttpClient::new(), Some("app-key")).await;
        open_file(&browser, "a.txt", "hello").await;

        for confirmation in [Confirmation::Declined, Confirmation::Dismissed] {
            let status = browser
                .execute(Command::Delete {
                    path: "/a.txt".into(),
                    confirmation,
                })
                .await;
            assert_eq!(status, "Delete cancelled");
        }
        assert!(browser.state().await.open_file.is_some());
    }

    #[tokio::test]
    async fn test_rename_to_same_name_sends_nothing() {
        let browser = browser(MockHttpClient::new(), Some("app-key")).await;
        open_file(&browser, "a.txt", "hello").await;

        let status = browser
            .execute(Command::Rename {
                path: "/a.txt".into(),
                new_name: " a.txt ".into(),
            })
            .await;

        assert_eq!(status, "");
        assert_eq!(browser.state().await.open_file.unwrap().name, "a.txt");
    }

    #[tokio::test]
    async fn test_copy_without_clipboard_reports_error() {
        let browser = browser(MockHttpClient::new(), Some("app-key")).await;
        open_file(&browser, "a.txt", "hello").await;

        let status = browser.execute(Command::CopyContent).await;

        assert!(status.starts_with("Error: Capability missing: clipboard"));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name(" notes.txt ").unwrap(), "notes.txt");
        assert!(validate_name("  ").is_err());
        assert!(validate_name("a/b.txt").is_err());
    }

    #[test]
    fn test_strip_folder_matches_whole_segments() {
        assert_eq!(strip_folder("/docs/a.txt", "/docs"), Some("/a.txt"));
        assert_eq!(strip_folder("/Docs/a.txt", "/docs"), Some("/a.txt"));
        assert_eq!(strip_folder("/docsx/a.txt", "/docs"), None);
        assert_eq!(strip_folder("/docs", "/docs"), None);
    }

    #[test]
    fn test_failure_status_prefixes() {
        let err = CoreError::Provider(provider_dropbox::DropboxError::Network(
            "connection reset".into(),
        ));
        assert_eq!(failure_status(&err, false), "Error: connection reset");
        assert_eq!(failure_status(&err, true), "Error saving: connection reset");

        let err = CoreError::Auth(core_auth::AuthError::Rejected("invalid_grant".into()));
        assert_eq!(failure_status(&err, false), "Auth failed: invalid_grant");
    }
}
