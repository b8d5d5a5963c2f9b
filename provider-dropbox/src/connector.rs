//! Dropbox API connector implementation
//!
//! Builds the HTTP requests for each supported route, sends them through the
//! host [`HttpClient`] and normalizes the answers into [`ListingEntry`] values.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_runtime::config::{DropboxEndpoints, DEFAULT_SEARCH_MAX_RESULTS};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{DropboxError, Result};
use crate::listing::{sort_listing, ListingEntry};
use crate::types::{
    ApiErrorBody, FileCategory, ListFolderArg, ListFolderContinueArg, ListFolderResult,
    Metadata, MetadataResult, PathArg, RelocationArg, SearchArg, SearchArgOptions, SearchResult,
    UploadArg, WriteMode,
};

/// Header carrying the JSON argument of content routes
pub const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Options for [`DropboxConnector::search`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Restrict matches to folders
    pub folders_only: bool,
    /// Result cap, sent as `options.max_results` and enforced locally
    pub max_results: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            folders_only: false,
            max_results: DEFAULT_SEARCH_MAX_RESULTS,
        }
    }
}

/// Options for [`DropboxConnector::upload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    pub mode: WriteMode,
    pub autorename: bool,
}

impl UploadOptions {
    /// Replace the existing file (saves)
    pub fn overwrite() -> Self {
        Self {
            mode: WriteMode::Overwrite,
            autorename: false,
        }
    }

    /// Create a new file, renamed by the server on collision
    pub fn create() -> Self {
        Self {
            mode: WriteMode::Add,
            autorename: true,
        }
    }
}

/// Dropbox API connector
///
/// Stateless apart from the bearer token; build one per session.
///
/// # Example
///
/// ```ignore
/// use provider_dropbox::{DropboxConnector, SearchOptions};
///
/// let connector = DropboxConnector::new(http_client, endpoints, access_token);
/// let entries = connector.search("report", &SearchOptions::default()).await?;
/// ```
pub struct DropboxConnector {
    http_client: Arc<dyn HttpClient>,
    endpoints: DropboxEndpoints,
    access_token: String,
    timeout: Option<Duration>,
}

impl DropboxConnector {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        endpoints: DropboxEndpoints,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            endpoints,
            access_token: access_token.into(),
            timeout: None,
        }
    }

    /// Per-request timeout handed to the transport.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Search by name and content.
    ///
    /// A blank query returns no entries without issuing a request. Provider
    /// order is preserved.
    #[instrument(skip(self), fields(folders_only = options.folders_only))]
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<ListingEntry>> {
        if query.trim().is_empty() {
            debug!("Blank search query; nothing to do");
            return Ok(Vec::new());
        }

        let arg = SearchArg {
            query,
            options: SearchArgOptions {
                max_results: options.max_results,
                file_categories: options.folders_only.then(|| vec![FileCategory::FOLDER]),
            },
        };

        let result: SearchResult = self.rpc("files/search_v2", &arg).await?;

        let entries: Vec<ListingEntry> = result
            .matches
            .into_iter()
            .map(|m| ListingEntry::from(m.metadata.into_metadata()))
            .filter(|entry| !options.folders_only || entry.is_folder)
            .take(options.max_results as usize)
            .collect();

        info!(count = entries.len(), "Search completed");
        Ok(entries)
    }

    /// List the direct children of `path`, following pagination, sorted
    /// folders-first then by name.
    #[instrument(skip(self))]
    pub async fn list_folder(&self, path: &str) -> Result<Vec<ListingEntry>> {
        let path = normalize_path(path);
        let arg = ListFolderArg {
            path: &path,
            recursive: false,
            include_deleted: false,
        };

        let mut page: ListFolderResult = self.rpc("files/list_folder", &arg).await?;
        let mut metadata = std::mem::take(&mut page.entries);

        while page.has_more {
            debug!(fetched = metadata.len(), "Fetching next listing page");
            let arg = ListFolderContinueArg {
                cursor: &page.cursor,
            };
            page = self.rpc("files/list_folder/continue", &arg).await?;
            metadata.append(&mut page.entries);
        }

        let mut entries: Vec<ListingEntry> = metadata
            .into_iter()
            .filter(|m| m.tag.as_deref() != Some("deleted"))
            .map(ListingEntry::from)
            .collect();
        sort_listing(&mut entries);

        info!(count = entries.len(), "Folder listed");
        Ok(entries)
    }

    /// Download a file as text.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Must not be called for
    /// folders.
    #[instrument(skip(self))]
    pub async fn download(&self, path: &str) -> Result<String> {
        let request = self.content_request("files/download", &PathArg { path })?;
        let response = self.send(request).await?;

        info!(bytes = response.body.len(), "Downloaded file");
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }

    /// Upload `content` to `path`; returns the stored entry, whose path may
    /// differ from `path` after an autorename.
    #[instrument(skip(self, content), fields(mode = ?options.mode, autorename = options.autorename))]
    pub async fn upload(
        &self,
        path: &str,
        content: impl Into<Bytes>,
        options: &UploadOptions,
    ) -> Result<ListingEntry> {
        let content = content.into();
        let arg = UploadArg {
            path,
            mode: options.mode,
            autorename: options.autorename,
            mute: true,
        };

        let request = self
            .content_request("files/upload", &arg)?
            .header("Content-Type", "application/octet-stream")
            .body(content);

        let response = self.send(request).await?;
        let metadata: Metadata = parse_json(&response)?;

        info!("Upload completed");
        Ok(ListingEntry::from(metadata))
    }

    /// Move (rename) an entry; returns the entry as the server stored it.
    #[instrument(skip(self))]
    pub async fn move_entry(
        &self,
        from_path: &str,
        to_path: &str,
        autorename: bool,
    ) -> Result<ListingEntry> {
        let arg = RelocationArg {
            from_path,
            to_path,
            autorename,
        };
        let result: MetadataResult = self.rpc("files/move_v2", &arg).await?;

        let entry = ListingEntry::from(result.metadata);
        info!(to = %entry.path, "Entry moved");
        Ok(entry)
    }

    /// Delete a file or folder. Confirmation is the caller's job.
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<ListingEntry> {
        let result: MetadataResult = self.rpc("files/delete_v2", &PathArg { path }).await?;

        info!("Entry deleted");
        Ok(ListingEntry::from(result.metadata))
    }

    async fn rpc<A, T>(&self, route: &str, arg: &A) -> Result<T>
    where
        A: Serialize,
        T: DeserializeOwned,
    {
        let request = self
            .authorized(HttpMethod::Post, self.endpoints.rpc(route))
            .json(arg)
            .map_err(|e| DropboxError::InvalidRequest(e.to_string()))?;

        let response = self.send(request).await?;
        parse_json(&response)
    }

    fn content_request<A: Serialize + ?Sized>(&self, route: &str, arg: &A) -> Result<HttpRequest> {
        let arg = header_safe_json(arg)?;
        Ok(self
            .authorized(HttpMethod::Post, self.endpoints.content(route))
            .header(API_ARG_HEADER, arg))
    }

    fn authorized(&self, method: HttpMethod, url: String) -> HttpRequest {
        let request = HttpRequest::new(method, url).bearer_token(self.access_token.as_str());
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(url = %url, error = %e, "Dropbox request failed");
            DropboxError::from(e)
        })?;

        if response.is_success() {
            return Ok(response);
        }

        let message = serde_json::from_slice::<ApiErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.error_summary)
            .filter(|summary| !summary.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", response.status));

        warn!(url = %url, status = response.status, error = %message, "Dropbox API error");
        Err(DropboxError::Api {
            status: response.status,
            message,
        })
    }
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(DropboxError::from)
}

/// Dropbox path form: `""` for the root, otherwise one leading slash and
/// no trailing one.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        String::new()
    } else {
        format!("/{}", path)
    }
}

/// Serialize `value` as JSON that is safe to put in an HTTP header.
///
/// Characters outside ASCII are written as `\uXXXX` escapes (UTF-16 surrogate
/// pairs above the BMP), which Dropbox decodes back.
pub fn header_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    if json.is_ascii() {
        return Ok(json);
    }

    let mut escaped = String::with_capacity(json.len() + 16);
    for ch in json.chars() {
        if ch.is_ascii() {
            escaped.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                // Writing to a String cannot fail.
                let _ = write!(escaped, "\\u{:04x}", unit);
            }
        }
    }
    Ok(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use mockall::mock;
    use serde_json::{json, Value};

    mock! {
        pub HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn connector(http: MockHttpClient) -> DropboxConnector {
        DropboxConnector::new(Arc::new(http), DropboxEndpoints::default(), "sl.token")
    }

    fn json_body(request: &HttpRequest) -> Value {
        serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap()
    }

    fn api_arg(request: &HttpRequest) -> Value {
        serde_json::from_str(request.header_value(API_ARG_HEADER).unwrap()).unwrap()
    }

    fn ok(body: Value) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse::new(200, body.to_string()))
    }

    fn file(name: &str) -> Value {
        json!({".tag": "file", "name": name, "id": format!("id:{}", name),
               "path_lower": format!("/{}", name.to_lowercase()),
               "path_display": format!("/{}", name)})
    }

    fn folder(name: &str) -> Value {
        json!({".tag": "folder", "name": name, "id": format!("id:{}", name),
               "path_lower": format!("/{}", name.to_lowercase()),
               "path_display": format!("/{}", name)})
    }

    #[tokio::test]
    async fn test_search_request_and_mapping() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.url == "https://api.dropboxapi.com/2/files/search_v2"
                    && req.header_value("Authorization") == Some("Bearer sl.token")
                    && json_body(req)
                        == json!({"query": "report", "options": {"max_results": 20}})
            })
            .times(1)
            .returning(|_| {
                ok(json!({
                    "matches": [
                        {"metadata": {".tag": "metadata", "metadata": file("Report.txt")}},
                        {"metadata": folder("Reports")},
                    ],
                    "has_more": false
                }))
            });

        let entries = connector(http)
            .search("report", &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Report.txt");
        assert_eq!(entries[0].path, "/report.txt");
        assert!(!entries[0].is_folder);
        assert!(entries[1].is_folder);
    }

    #[tokio::test]
    async fn test_search_preserves_order_and_caps_results() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(1).returning(|_| {
            let matches: Vec<Value> = (0..25)
                .rev()
                .map(|i| json!({"metadata": {"metadata": file(&format!("f{:02}.txt", i))}}))
                .collect();
            ok(json!({ "matches": matches, "has_more": true }))
        });

        let entries = connector(http)
            .search("f", &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(entries.len(), 20);
        assert_eq!(entries[0].name, "f24.txt");
        assert_eq!(entries[19].name, "f05.txt");
    }

    #[tokio::test]
    async fn test_search_folders_only() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                json_body(req)["options"]["file_categories"] == json!([{".tag": "folder"}])
            })
            .times(1)
            .returning(|_| ok(json!({"matches": [{"metadata": {"metadata": folder("Music")}}]})));

        let options = SearchOptions {
            folders_only: true,
            ..Default::default()
        };
        let entries = connector(http).search("mu", &options).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_folder);
    }

    #[tokio::test]
    async fn test_blank_search_issues_no_request() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(0);

        let entries = connector(http)
            .search("   ", &SearchOptions::default())
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_list_folder_paginates_and_sorts() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url.ends_with("/2/files/list_folder")
                    && json_body(req)["path"] == json!("")
            })
            .times(1)
            .returning(|_| {
                ok(json!({
                    "entries": [file("zeta.txt"), folder("Work")],
                    "cursor": "c1",
                    "has_more": true
                }))
            });
        http.expect_execute()
            .withf(|req| {
                req.url.ends_with("/2/files/list_folder/continue")
                    && json_body(req) == json!({"cursor": "c1"})
            })
            .times(1)
            .returning(|_| {
                ok(json!({
                    "entries": [file("Alpha.txt"), folder("archive")],
                    "cursor": "c2",
                    "has_more": false
                }))
            });

        let entries = connector(http).list_folder("/").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["archive", "Work", "Alpha.txt", "zeta.txt"]);
    }

    #[tokio::test]
    async fn test_download_uses_api_arg_header() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url == "https://content.dropboxapi.com/2/files/download"
                    && api_arg(req) == json!({"path": "/notes.txt"})
                    && req.body.is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "hello\nworld")));

        let content = connector(http).download("/notes.txt").await.unwrap();
        assert_eq!(content, "hello\nworld");
    }

    #[tokio::test]
    async fn test_upload_overwrite() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url == "https://content.dropboxapi.com/2/files/upload"
                    && api_arg(req)
                        == json!({"path": "/notes.txt", "mode": "overwrite", "autorename": false, "mute": true})
                    && req.header_value("Content-Type") == Some("application/octet-stream")
                    && req.body.as_deref() == Some(b"new text".as_slice())
            })
            .times(1)
            .returning(|_| {
                ok(json!({"name": "notes.txt", "id": "id:n", "path_lower": "/notes.txt",
                          "path_display": "/notes.txt", "size": 8}))
            });

        let entry = connector(http)
            .upload("/notes.txt", "new text".to_string(), &UploadOptions::overwrite())
            .await
            .unwrap();
        assert_eq!(entry.path, "/notes.txt");
    }

    #[tokio::test]
    async fn test_upload_create_returns_autorenamed_entry() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                let arg = api_arg(req);
                arg["mode"] == json!("add") && arg["autorename"] == json!(true)
            })
            .returning(|_| {
                ok(json!({"name": "todo (1).txt", "id": "id:t", "path_lower": "/todo (1).txt",
                          "path_display": "/todo (1).txt"}))
            });

        let entry = connector(http)
            .upload("/todo.txt", "", &UploadOptions::create())
            .await
            .unwrap();
        assert_eq!(entry.name, "todo (1).txt");
    }

    #[tokio::test]
    async fn test_move_returns_server_assigned_path() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url.ends_with("/2/files/move_v2")
                    && json_body(req)
                        == json!({"from_path": "/a.txt", "to_path": "/b.txt", "autorename": true})
            })
            .times(1)
            .returning(|_| ok(json!({"metadata": file("b (1).txt")})));

        let entry = connector(http)
            .move_entry("/a.txt", "/b.txt", true)
            .await
            .unwrap();
        assert_eq!(entry.name, "b (1).txt");
        assert_eq!(entry.path, "/b (1).txt");
    }

    #[tokio::test]
    async fn test_delete() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url.ends_with("/2/files/delete_v2") && json_body(req) == json!({"path": "/a.txt"})
            })
            .times(1)
            .returning(|_| ok(json!({"metadata": file("a.txt")})));

        assert!(connector(http).delete("/a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_error_summary_is_surfaced() {
        let mut http = MockHttpClient::new();
        http.expect_execute().returning(|_| {
            Ok(HttpResponse::new(
                409,
                r#"{"error_summary": "path/conflict/file/..", "error": {".tag": "path"}}"#,
            ))
        });

        let err = connector(http)
            .upload("/a.txt", "x", &UploadOptions::overwrite())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "path/conflict/file/..");
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn test_unparseable_error_falls_back_to_status() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(HttpResponse::new(503, "<html>unavailable</html>")));

        let err = connector(http).download("/a.txt").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Transport("Failed to fetch".to_string())));

        let err = connector(http).list_folder("").await.unwrap_err();
        assert!(matches!(err, DropboxError::Network(_)));
        assert_eq!(err.to_string(), "Failed to fetch");
    }

    #[test]
    fn test_header_safe_json() {
        let json = header_safe_json(&json!({"path": "/Café/😀.txt"})).unwrap();
        assert!(json.is_ascii());
        assert_eq!(json, r#"{"path":"/Caf\u00e9/\ud83d\ude00.txt"}"#);

        let decoded: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded["path"], "/Café/😀.txt");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("/"), "");
        assert_eq!(normalize_path("Docs/"), "/Docs");
        assert_eq!(normalize_path("/Docs/Work"), "/Docs/Work");
    }

    #[tokio::test]
    async fn test_timeout_is_forwarded() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| req.timeout == Some(Duration::from_secs(5)))
            .times(1)
            .returning(|_| ok(json!({"metadata": file("a.txt")})));

        let connector = connector(http).with_timeout(Some(Duration::from_secs(5)));
        assert!(connector.delete("/a.txt").await.is_ok());
    }
}
