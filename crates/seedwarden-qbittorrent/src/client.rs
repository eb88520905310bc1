//! Authenticated session against the qBittorrent Web API.
//!
//! # Design
//! - One login per process; the session cookie is attached to every request.
//! - Read failures are connection-level and abort the run; mutation failures
//!   are reported per torrent so callers can keep going.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use seedwarden_torrent_core::{
    AddTorrentFile, RemoveTorrent, TorrentClient, TorrentError, TorrentRecord, TorrentResult,
};
use tracing::{debug, info};
use url::Url;

use crate::wire::{WireFile, WireTorrent, WireTracker};

const SESSION_COOKIE: &str = "SID";
const LOGIN_OK: &str = "Ok.";
const CLIENT_FAILS: &str = "Fails.";

/// Connection parameters for [`QbitClient::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOptions<'a> {
    /// Base URL including scheme, e.g. `http://localhost:8080`.
    pub base_url: &'a str,
    /// Web UI user; login is skipped when absent.
    pub username: Option<&'a str>,
    /// Web UI password.
    pub password: Option<&'a str>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Authenticated qBittorrent Web API client.
#[derive(Debug, Clone)]
pub struct QbitClient {
    http: Client,
    api_root: Url,
    session: Option<String>,
}

impl QbitClient {
    /// Authenticate and probe the API version.
    ///
    /// # Errors
    ///
    /// Returns [`TorrentError::Connection`] when the URL is invalid, the
    /// server is unreachable, or the credentials are rejected.
    pub async fn connect(options: &ConnectOptions<'_>) -> TorrentResult<Self> {
        let api_root = Url::parse(&format!("{}/api/v2/", options.base_url.trim_end_matches('/')))
            .map_err(|err| TorrentError::Connection {
                operation: "connect",
                detail: format!("invalid client url {}", options.base_url),
                source: Some(Box::new(err)),
            })?;
        let http = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|err| connection("connect", "failed to build HTTP client", err))?;

        let mut client = Self {
            http,
            api_root,
            session: None,
        };
        if let Some(username) = options.username {
            client.session = client
                .login(username, options.password.unwrap_or_default())
                .await?;
        }

        let version = client.version().await?;
        info!(url = options.base_url, version = %version, "connected to qBittorrent");
        Ok(client)
    }

    async fn login(&self, username: &str, password: &str) -> TorrentResult<Option<String>> {
        let response = self
            .http
            .post(self.endpoint("login", "auth/login")?)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|err| connection("login", "login request failed", err))?;

        let status = response.status();
        let session = session_cookie(&response);
        let body = response
            .text()
            .await
            .map_err(|err| connection("login", "login response unreadable", err))?;
        if !status.is_success() || body.trim() != LOGIN_OK {
            return Err(TorrentError::Connection {
                operation: "login",
                detail: format!("login rejected with status {status}"),
                source: None,
            });
        }
        debug!(session = session.is_some(), "login accepted");
        Ok(session)
    }

    async fn version(&self) -> TorrentResult<String> {
        let response = self
            .send_read("version", self.get("version", "app/version")?)
            .await?;
        let version = response
            .text()
            .await
            .map_err(|err| connection("version", "version response unreadable", err))?;
        debug!(version = %version, "client version");
        Ok(version)
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> TorrentResult<Url> {
        self.api_root
            .join(path)
            .map_err(|_| TorrentError::InvalidResponse {
                operation,
                reason: "invalid endpoint path",
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(sid) => request.header(COOKIE, format!("{SESSION_COOKIE}={sid}")),
            None => request,
        }
    }

    fn get(&self, operation: &'static str, path: &str) -> TorrentResult<RequestBuilder> {
        Ok(self.authorize(self.http.get(self.endpoint(operation, path)?)))
    }

    fn post(&self, operation: &'static str, path: &str) -> TorrentResult<RequestBuilder> {
        Ok(self.authorize(self.http.post(self.endpoint(operation, path)?)))
    }

    async fn send_read(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> TorrentResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| connection(operation, "request failed", err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TorrentError::Connection {
                operation,
                detail: format!("unexpected status {status}"),
                source: None,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> TorrentResult<T> {
        let response = self
            .send_read(operation, self.get(operation, path)?.query(query))
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|_| TorrentError::InvalidResponse {
                operation,
                reason: "response body did not match the expected shape",
            })
    }

    async fn send_mutation(
        &self,
        operation: &'static str,
        hash: &str,
        request: RequestBuilder,
    ) -> TorrentResult<StatusCode> {
        let response = request
            .send()
            .await
            .map_err(|err| connection(operation, "request failed", err))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(status);
        }
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() || body.trim() == CLIENT_FAILS {
            return Err(TorrentError::OperationFailed {
                operation,
                hash: Some(hash.to_string()),
                source: format!("client answered {status}: {}", body.trim()).into(),
            });
        }
        Ok(status)
    }

    async fn post_form(
        &self,
        operation: &'static str,
        path: &str,
        hash: &str,
        form: &[(&str, &str)],
    ) -> TorrentResult<StatusCode> {
        let request = self.post(operation, path)?.form(form);
        self.send_mutation(operation, hash, request).await
    }

    async fn torrent_action(
        &self,
        operation: &'static str,
        path: &str,
        hash: &str,
        extra: &[(&str, &str)],
    ) -> TorrentResult<()> {
        let mut form = vec![("hashes", hash)];
        form.extend_from_slice(extra);
        let status = self.post_form(operation, path, hash, &form).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(not_found(operation, hash, path));
        }
        Ok(())
    }
}

#[async_trait]
impl TorrentClient for QbitClient {
    async fn list_torrents(&self) -> TorrentResult<Vec<TorrentRecord>> {
        let torrents: Vec<WireTorrent> = self
            .get_json(
                "list_torrents",
                "torrents/info",
                &[("sort", "added_on"), ("reverse", "true")],
            )
            .await?;

        let mut records = Vec::with_capacity(torrents.len());
        for torrent in torrents {
            let trackers: Vec<WireTracker> = self
                .get_json("list_trackers", "torrents/trackers", &[("hash", torrent.hash.as_str())])
                .await?;
            let files: Vec<WireFile> = self
                .get_json("list_files", "torrents/files", &[("hash", torrent.hash.as_str())])
                .await?;
            records.push(torrent.into_record(trackers, files));
        }
        debug!(count = records.len(), "torrent list fetched");
        Ok(records)
    }

    async fn set_category(&self, hash: &str, category: &str) -> TorrentResult<()> {
        self.torrent_action(
            "set_category",
            "torrents/setCategory",
            hash,
            &[("category", category)],
        )
        .await
    }

    async fn add_tags(&self, hash: &str, tags: &[String]) -> TorrentResult<()> {
        let joined = tags.join(",");
        self.torrent_action("add_tags", "torrents/addTags", hash, &[("tags", joined.as_str())])
            .await
    }

    async fn remove_torrent(&self, hash: &str, options: RemoveTorrent) -> TorrentResult<()> {
        let delete_files = if options.with_data { "true" } else { "false" };
        // Unknown hashes are ignored by the client, so a repeated removal succeeds.
        self.torrent_action(
            "remove_torrent",
            "torrents/delete",
            hash,
            &[("deleteFiles", delete_files)],
        )
        .await
    }

    async fn resume_torrent(&self, hash: &str) -> TorrentResult<()> {
        // Client 5.x renamed resume to start.
        let status = self
            .post_form("resume_torrent", "torrents/resume", hash, &[("hashes", hash)])
            .await?;
        if status == StatusCode::NOT_FOUND {
            return self
                .torrent_action("resume_torrent", "torrents/start", hash, &[])
                .await;
        }
        Ok(())
    }

    async fn recheck(&self, hash: &str) -> TorrentResult<()> {
        self.torrent_action("recheck", "torrents/recheck", hash, &[])
            .await
    }

    async fn add_torrent(&self, request: AddTorrentFile) -> TorrentResult<()> {
        let operation = "add_torrent";
        let file_name = request.file_name.clone();
        let part = Part::bytes(request.bytes)
            .file_name(request.file_name)
            .mime_str("application/x-bittorrent")
            .map_err(|err| TorrentError::OperationFailed {
                operation,
                hash: None,
                source: Box::new(err),
            })?;
        let paused = if request.paused { "true" } else { "false" };
        let mut form = Form::new()
            .part("torrents", part)
            .text("savepath", request.save_path)
            .text("paused", paused)
            .text("stopped", paused);
        if let Some(category) = request.category {
            form = form.text("category", category);
        }

        let status = self
            .send_mutation(operation, &file_name, self.post(operation, "torrents/add")?.multipart(form))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Err(not_found(operation, &file_name, "torrents/add"));
        }
        Ok(())
    }
}

fn connection(operation: &'static str, detail: &str, err: reqwest::Error) -> TorrentError {
    TorrentError::Connection {
        operation,
        detail: detail.to_string(),
        source: Some(Box::new(err)),
    }
}

fn not_found(operation: &'static str, hash: &str, path: &str) -> TorrentError {
    TorrentError::OperationFailed {
        operation,
        hash: Some(hash.to_string()),
        source: format!("endpoint {path} not available").into(),
    }
}

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find_map(|pair| {
            pair.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;

    const SID: &str = "session-token";

    fn login_mock(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/auth/login")
                .form_urlencoded_tuple("username", "admin")
                .form_urlencoded_tuple("password", "secret");
            then.status(200)
                .header("set-cookie", format!("SID={SID}; HttpOnly; path=/"))
                .body("Ok.");
        })
    }

    fn version_mock(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/app/version")
                .header("cookie", format!("SID={SID}"));
            then.status(200).body("v4.6.2");
        })
    }

    async fn connected(server: &MockServer) -> TorrentResult<QbitClient> {
        let base_url = server.base_url();
        QbitClient::connect(&ConnectOptions {
            base_url: &base_url,
            username: Some("admin"),
            password: Some("secret"),
            timeout: Duration::from_secs(5),
        })
        .await
    }

    #[tokio::test]
    async fn connect_logs_in_and_reuses_session_cookie() -> Result<()> {
        let server = MockServer::start_async().await;
        let login = login_mock(&server);
        let version = version_mock(&server);

        connected(&server).await?;

        login.assert();
        version.assert();
        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_is_a_connection_error() {
        let server = MockServer::start_async().await;
        let _login = server.mock(|when, then| {
            when.method(POST).path("/api/v2/auth/login");
            then.status(200).body("Fails.");
        });

        let result = connected(&server).await;
        assert!(matches!(
            result,
            Err(TorrentError::Connection {
                operation: "login",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_error() {
        let result = QbitClient::connect(&ConnectOptions {
            base_url: "http://127.0.0.1:1",
            username: None,
            password: None,
            timeout: Duration::from_secs(1),
        })
        .await;
        assert!(matches!(result, Err(TorrentError::Connection { .. })));
    }

    #[tokio::test]
    async fn list_torrents_joins_trackers_and_files() -> Result<()> {
        let server = MockServer::start_async().await;
        let _login = login_mock(&server);
        let _version = version_mock(&server);
        let info = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/torrents/info")
                .query_param("sort", "added_on")
                .query_param("reverse", "true");
            then.status(200).json_body(json!([{
                "hash": "h1",
                "name": "Movie.2020",
                "save_path": "/data/Movies",
                "progress": 1.0,
                "state": "pausedUP",
                "tags": "tl",
                "category": "movies",
                "size": 42
            }]));
        });
        let _trackers = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/torrents/trackers")
                .query_param("hash", "h1");
            then.status(200).json_body(json!([
                {"url": "** [DHT] **", "msg": ""},
                {"url": "https://tracker.example/announce/key", "msg": "Unregistered torrent"}
            ]));
        });
        let _files = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/torrents/files")
                .query_param("hash", "h1");
            then.status(200)
                .json_body(json!([{"name": "Movie.2020/movie.mkv", "size": 42}]));
        });

        let client = connected(&server).await?;
        let torrents = client.list_torrents().await?;

        info.assert();
        assert_eq!(torrents.len(), 1);
        let torrent = &torrents[0];
        assert_eq!(torrent.category.as_deref(), Some("movies"));
        assert!(torrent.is_complete());
        assert_eq!(torrent.representative_message(), Some("Unregistered torrent"));
        assert_eq!(torrent.files[0].size_bytes, 42);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_listing_is_invalid_response() -> Result<()> {
        let server = MockServer::start_async().await;
        let _login = login_mock(&server);
        let _version = version_mock(&server);
        let _info = server.mock(|when, then| {
            when.method(GET).path("/api/v2/torrents/info");
            then.status(200).body("not json");
        });

        let client = connected(&server).await?;
        assert!(matches!(
            client.list_torrents().await,
            Err(TorrentError::InvalidResponse { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn mutations_post_forms_with_hash() -> Result<()> {
        let server = MockServer::start_async().await;
        let _login = login_mock(&server);
        let _version = version_mock(&server);
        let category = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/torrents/setCategory")
                .header("cookie", format!("SID={SID}"))
                .form_urlencoded_tuple("hashes", "h1")
                .form_urlencoded_tuple("category", "movies");
            then.status(200);
        });
        let delete = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/torrents/delete")
                .form_urlencoded_tuple("hashes", "h1")
                .form_urlencoded_tuple("deleteFiles", "true");
            then.status(200);
        });
        let tags = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/torrents/addTags")
                .form_urlencoded_tuple("tags", "a,b");
            then.status(200);
        });

        let client = connected(&server).await?;
        client.set_category("h1", "movies").await?;
        client
            .remove_torrent("h1", RemoveTorrent { with_data: true })
            .await?;
        client
            .add_tags("h1", &["a".to_string(), "b".to_string()])
            .await?;

        category.assert();
        delete.assert();
        tags.assert();
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_is_operation_failed() -> Result<()> {
        let server = MockServer::start_async().await;
        let _login = login_mock(&server);
        let _version = version_mock(&server);
        let _category = server.mock(|when, then| {
            when.method(POST).path("/api/v2/torrents/setCategory");
            then.status(409).body("Category does not exist");
        });

        let client = connected(&server).await?;
        let err = client.set_category("h1", "missing").await;
        assert!(matches!(
            err,
            Err(TorrentError::OperationFailed {
                operation: "set_category",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn resume_falls_back_to_start_endpoint() -> Result<()> {
        let server = MockServer::start_async().await;
        let _login = login_mock(&server);
        let _version = version_mock(&server);
        let _resume = server.mock(|when, then| {
            when.method(POST).path("/api/v2/torrents/resume");
            then.status(404);
        });
        let start = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/torrents/start")
                .form_urlencoded_tuple("hashes", "h1");
            then.status(200);
        });

        let client = connected(&server).await?;
        client.resume_torrent("h1").await?;
        start.assert();
        Ok(())
    }

    #[tokio::test]
    async fn add_torrent_uploads_multipart() -> Result<()> {
        let server = MockServer::start_async().await;
        let _login = login_mock(&server);
        let _version = version_mock(&server);
        let add = server.mock(|when, then| {
            when.method(POST).path("/api/v2/torrents/add");
            then.status(200).body("Ok.");
        });

        let client = connected(&server).await?;
        client
            .add_torrent(AddTorrentFile {
                file_name: "Movie.2020.torrent".to_string(),
                bytes: b"d4:infod4:name5:demoee".to_vec(),
                save_path: "/data/Movies".to_string(),
                category: Some("movies".to_string()),
                paused: true,
            })
            .await?;
        add.assert();
        Ok(())
    }
}
