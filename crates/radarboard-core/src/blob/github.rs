//! Archive stored in a GitHub repository, through the contents API
//!
//! Versions are the blob SHAs GitHub reports; a PUT carrying a stale SHA is
//! rejected with 409 (or 422 when creating over an existing file).

use super::{validate_path, Blob, BlobEntry, BlobStore, PutOutcome};
use crate::error::CoreError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
const USER_AGENT: &str = concat!("radarboard/", env!("CARGO_PKG_VERSION"));

/// Repository coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    /// `owner/name`
    pub repo: String,
    pub branch: String,
    pub api_base: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            repo: String::new(),
            branch: "main".to_string(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct DirEntryResponse {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: FileResponse,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

/// Blob store backed by the GitHub contents API
#[derive(Debug, Clone)]
pub struct GithubBlobStore {
    http: reqwest::Client,
    settings: GithubSettings,
    token: String,
}

impl GithubBlobStore {
    pub fn new(settings: GithubSettings, token: impl Into<String>) -> Result<Self, CoreError> {
        if settings.repo.split('/').filter(|s| !s.is_empty()).count() != 2 {
            return Err(CoreError::InvalidConfig {
                message: format!("github.repo must be owner/name, got {:?}", settings.repo),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CoreError::InvalidConfig {
                message: format!("HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            settings,
            token: token.into(),
        })
    }

    /// Build with the token from `GITHUB_TOKEN`
    pub fn from_env(settings: GithubSettings) -> Result<Self, CoreError> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CoreError::MissingCredential {
                name: TOKEN_ENV.to_string(),
            })?;
        Self::new(settings, token)
    }

    pub fn settings(&self) -> &GithubSettings {
        &self.settings
    }

    fn contents_url(&self, path: &str) -> String {
        contents_url(&self.settings, path)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, CoreError> {
        builder.send().await.map_err(|source| CoreError::Request {
            url: url.to_string(),
            source,
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        url: &str,
    ) -> Result<T, CoreError> {
        let bytes = response.bytes().await.map_err(|source| CoreError::Request {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| CoreError::JsonParse {
            context: url.to_string(),
            source,
        })
    }

    async fn http_error(response: reqwest::Response, url: &str) -> CoreError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.message)
            .unwrap_or_default();
        CoreError::Http {
            url: url.to_string(),
            status,
            message,
        }
    }
}

#[async_trait]
impl BlobStore for GithubBlobStore {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list(&self, dir: &str) -> Result<Vec<BlobEntry>, CoreError> {
        let dir = dir.trim_matches('/');
        if !dir.is_empty() {
            validate_path(dir)?;
        }
        let url = self.contents_url(dir);
        let builder = self
            .request(reqwest::Method::GET, &url)
            .query(&[("ref", self.settings.branch.as_str())]);
        let response = self.send(builder, &url).await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(CoreError::DirectoryNotFound {
                    path: PathBuf::from(dir),
                })
            }
            _ => return Err(Self::http_error(response, &url).await),
        }

        let listing: Vec<DirEntryResponse> = Self::json(response, &url).await?;
        let mut entries: Vec<BlobEntry> = listing
            .into_iter()
            .filter(|e| e.kind == "file")
            .map(|e| BlobEntry::new(dir, &e.name))
            .collect();
        entries.sort();

        tracing::debug!(dir, count = entries.len(), "Listed GitHub directory");
        Ok(entries)
    }

    async fn get(&self, path: &str) -> Result<Blob, CoreError> {
        validate_path(path)?;
        let url = self.contents_url(path);
        let builder = self
            .request(reqwest::Method::GET, &url)
            .query(&[("ref", self.settings.branch.as_str())]);
        let response = self.send(builder, &url).await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(CoreError::BlobNotFound {
                    path: path.to_string(),
                })
            }
            _ => return Err(Self::http_error(response, &url).await),
        }

        let file: FileResponse = Self::json(response, &url).await?;
        Ok(Blob {
            path: path.to_string(),
            content: file_text(path, &file)?,
            version: file.sha,
        })
    }

    async fn put(
        &self,
        path: &str,
        content: &str,
        expected: Option<&str>,
        message: &str,
    ) -> Result<PutOutcome, CoreError> {
        validate_path(path)?;
        let url = self.contents_url(path);
        let body = PutRequest {
            message,
            content: STANDARD.encode(content.as_bytes()),
            branch: &self.settings.branch,
            sha: expected,
        };
        let builder = self.request(reqwest::Method::PUT, &url).json(&body);
        let response = self.send(builder, &url).await?;

        match response.status() {
            status if status.is_success() => {
                let written: PutResponse = Self::json(response, &url).await?;
                Ok(PutOutcome::Written {
                    version: written.content.sha,
                })
            }
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                tracing::debug!(path, status = %response.status(), "GitHub rejected stale write");
                Ok(PutOutcome::Conflict)
            }
            _ => Err(Self::http_error(response, &url).await),
        }
    }
}

fn contents_url(settings: &GithubSettings, path: &str) -> String {
    let base = settings.api_base.trim_end_matches('/');
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("{}/repos/{}/contents", base, settings.repo)
    } else {
        format!("{}/repos/{}/contents/{}", base, settings.repo, path)
    }
}

/// Files over 1 MB come back with `encoding: none` and no content
fn file_text(path: &str, file: &FileResponse) -> Result<String, CoreError> {
    if file.encoding != "base64" {
        tracing::warn!(path, encoding = %file.encoding, "Contents API returned no inline content");
        return Err(CoreError::BlobEncoding {
            path: path.to_string(),
        });
    }
    decode_content(path, &file.content)
}

/// GitHub wraps base64 content at 60 columns
fn decode_content(path: &str, encoded: &str) -> Result<String, CoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| CoreError::BlobEncoding {
            path: path.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|_| CoreError::BlobEncoding {
        path: path.to_string(),
    })
}
