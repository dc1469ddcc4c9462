//! GitHub-backed record store.
//!
//! Talks to the REST contents API with a blocking client:
//!
//! - `GET    /repos/{owner}/{repo}/contents/{path}?ref={branch}`
//! - `PUT    /repos/{owner}/{repo}/contents/{path}` (create, or update with `sha`)
//! - `DELETE /repos/{owner}/{repo}/contents/{path}` (with `sha`)
//! - `GET    /repos/{owner}/{repo}/git/trees/{branch}?recursive=1`
//!
//! Blob SHAs serve as revision tokens; the API rejects a stale `sha` with
//! 409, which maps to `PreconditionFailed`.

use crate::config::GithubConfig;
use crate::error::{RecipeError, Result};
use crate::store::RecordStore;
use crate::types::{EntryKind, Revision, StoredObject, TreeEntry};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// API version header value this client was written against.
const API_VERSION: &str = "2022-11-28";

/// Longest response body quoted in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Record store backed by a GitHub repository.
pub struct GithubStore {
    client: Client,
    api_url: Url,
    owner: String,
    name: String,
    branch: String,
}

impl GithubStore {
    /// Creates a store for `repo` ("owner/name") on `branch`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a malformed repository or API URL and
    /// `Unconfigured` for an empty token.
    pub fn new(
        api_url: &str,
        repo: &str,
        branch: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let (owner, name) = parse_repo(repo)?;
        let api_url = Url::parse(api_url)
            .map_err(|e| RecipeError::ConfigError(format!("invalid api_url '{}': {}", api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(RecipeError::ConfigError(format!(
                "api_url '{}' cannot be a base URL",
                api_url
            )));
        }
        if token.trim().is_empty() {
            return Err(RecipeError::Unconfigured("access token is empty".to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| RecipeError::ConfigError("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .user_agent(concat!("recipe_core/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RecipeError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            owner: owner.to_string(),
            name: name.to_string(),
            branch: branch.to_string(),
        })
    }

    /// Creates a store from configuration, reading the token from the
    /// environment variable named by `token_env`.
    ///
    /// # Errors
    ///
    /// Returns `Unconfigured` if the repository or the token is missing.
    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        let repo = config
            .repo
            .as_deref()
            .ok_or_else(|| RecipeError::Unconfigured("github.repo is not set".to_string()))?;
        let token = std::env::var(&config.token_env).map_err(|_| {
            RecipeError::Unconfigured(format!("environment variable {} is not set", config.token_env))
        })?;
        Self::new(
            &config.api_url,
            repo,
            &config.branch,
            &token,
            config.timeout(),
        )
    }

    /// Returns "owner/name".
    pub fn repo(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Returns the branch commits go to.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// URL of `/repos/{owner}/{repo}/{segments...}`.
    fn repo_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.api_url.clone();
        {
            // cannot_be_a_base was rejected in new()
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty()
                    .extend(["repos", self.owner.as_str(), self.name.as_str()])
                    .extend(segments);
            }
        }
        url
    }

    fn contents_url(&self, path: &str) -> Url {
        self.repo_url(std::iter::once("contents").chain(path.split('/')))
    }

    fn put(&self, path: &str, content: &[u8], sha: Option<&str>, message: &str) -> Result<Revision> {
        let body = PutContents {
            message,
            content: STANDARD.encode(content),
            branch: &self.branch,
            sha,
        };
        let response = self
            .client
            .put(self.contents_url(path))
            .json(&body)
            .send()
            .map_err(transport_error)?;
        let response = check_status(response, path, sha.is_some())?;

        let written: WriteResponse = response.json().map_err(transport_error)?;
        Ok(Revision::new(written.content.sha))
    }
}

impl RecordStore for GithubStore {
    fn read(&self, path: &str) -> Result<StoredObject> {
        let mut url = self.contents_url(path);
        url.query_pairs_mut().append_pair("ref", &self.branch);

        let response = self.client.get(url).send().map_err(transport_error)?;
        let response = check_status(response, path, false)?;
        let file: ContentsFile = response.json().map_err(|e| {
            RecipeError::InvalidResponse(format!("{} is not a file: {}", path, e))
        })?;

        let content = decode_content(&file)?;
        let revision = Revision::new(file.sha);
        debug!(path, revision = revision.short(), "read");
        Ok(StoredObject { content, revision })
    }

    fn create(&self, path: &str, content: &[u8], message: &str) -> Result<Revision> {
        let revision = self.put(path, content, None, message)?;
        debug!(path, message, revision = revision.short(), "created");
        Ok(revision)
    }

    fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &Revision,
        message: &str,
    ) -> Result<Revision> {
        let revision = self.put(path, content, Some(expected.as_str()), message)?;
        debug!(path, message, revision = revision.short(), "updated");
        Ok(revision)
    }

    fn delete(&self, path: &str, expected: &Revision, message: &str) -> Result<()> {
        let body = DeleteContents {
            message,
            sha: expected.as_str(),
            branch: &self.branch,
        };
        let response = self
            .client
            .delete(self.contents_url(path))
            .json(&body)
            .send()
            .map_err(transport_error)?;
        check_status(response, path, true)?;
        debug!(path, message, "deleted");
        Ok(())
    }

    fn list_tree(&self, root: &str) -> Result<Vec<TreeEntry>> {
        let mut url = self.repo_url(["git", "trees", self.branch.as_str()]);
        url.query_pairs_mut().append_pair("recursive", "1");

        let response = self.client.get(url).send().map_err(transport_error)?;
        let response = check_status(response, &self.branch, false)?;
        let tree: TreeResponse = response.json().map_err(transport_error)?;

        if tree.truncated {
            warn!(
                repo = %self.repo(),
                "tree listing was truncated by the API; some categories may be missing"
            );
        }
        Ok(entries_under(tree, root))
    }
}

/// Body of a create/update request.
#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Body of a delete request.
#[derive(Serialize)]
struct DeleteContents<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

/// File returned by the contents API.
#[derive(Deserialize)]
struct ContentsFile {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

/// Response of a create/update request.
#[derive(Deserialize)]
struct WriteResponse {
    content: WrittenFile,
}

#[derive(Deserialize)]
struct WrittenFile {
    sha: String,
}

/// Response of the git trees API.
#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<RawTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct RawTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Error body returned by the API.
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Splits "owner/name".
fn parse_repo(repo: &str) -> Result<(&str, &str)> {
    match repo.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(RecipeError::ConfigError(format!(
            "github.repo must look like 'owner/name', got '{}'",
            repo
        ))),
    }
}

/// Decodes the base64 payload of a contents response.
fn decode_content(file: &ContentsFile) -> Result<Vec<u8>> {
    if file.encoding != "base64" {
        return Err(RecipeError::InvalidResponse(format!(
            "unsupported content encoding '{}'",
            file.encoding
        )));
    }
    // The API wraps base64 at 60 columns
    let compact: String = file.content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| RecipeError::InvalidResponse(format!("invalid base64 content: {}", e)))
}

/// Keeps blob and tree entries strictly below `root`.
fn entries_under(tree: TreeResponse, root: &str) -> Vec<TreeEntry> {
    let prefix = format!("{}/", root.trim_matches('/'));
    tree.tree
        .into_iter()
        .filter(|entry| entry.path.starts_with(&prefix))
        .filter_map(|entry| {
            let kind = match entry.kind.as_str() {
                "tree" => EntryKind::Tree,
                "blob" => EntryKind::Blob,
                // submodules
                _ => return None,
            };
            Some(TreeEntry {
                path: entry.path,
                kind,
            })
        })
        .collect()
}

/// Passes successful responses through and maps failures onto the store
/// error taxonomy.
fn check_status(response: Response, path: &str, with_precondition: bool) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(classify_status(status, path, with_precondition, &body))
}

fn classify_status(
    status: StatusCode,
    path: &str,
    with_precondition: bool,
    body: &str,
) -> RecipeError {
    match status {
        StatusCode::NOT_FOUND => RecipeError::NotFound(path.to_string()),
        StatusCode::CONFLICT => RecipeError::PreconditionFailed {
            path: path.to_string(),
        },
        // Missing `sha` on an existing file, or a `sha` that does not match
        StatusCode::UNPROCESSABLE_ENTITY if with_precondition => RecipeError::PreconditionFailed {
            path: path.to_string(),
        },
        StatusCode::UNPROCESSABLE_ENTITY => RecipeError::AlreadyExists(path.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RecipeError::Unconfigured(format!("credentials rejected ({})", status))
        }
        _ => {
            let mut message: String = match serde_json::from_str::<ApiError>(body) {
                Ok(err) => err.message,
                Err(_) => body.chars().take(MAX_ERROR_BODY).collect(),
            };
            if message.is_empty() {
                message = status.canonical_reason().unwrap_or("unknown").to_string();
            }
            RecipeError::Http {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> RecipeError {
    if e.is_decode() {
        RecipeError::InvalidResponse(e.to_string())
    } else {
        RecipeError::Unreachable(e.to_string())
    }
}
