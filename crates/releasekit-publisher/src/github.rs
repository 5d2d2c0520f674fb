//! GitHub REST client for git objects and releases.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use releasekit_core::hosting::{GitObjects, NewCommit, Release, ReleaseHost, TreeItem};
use releasekit_core::{Artifact, Error, Outcome};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API errors.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Reference conflict: {0}")]
    Conflict(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<GitHubError> for Error {
    fn from(e: GitHubError) -> Self {
        match e {
            GitHubError::Conflict(message) => Error::ReferenceConflict(message),
            other => Error::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ShaResponse,
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    id: u64,
    tag_name: String,
    upload_url: String,
}

/// Client bound to one repository.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        }
    }

    /// Point the client at another API root (GitHub Enterprise, tests).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "releasekit")
            .header("Accept", "application/vnd.github+json")
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder, action: &str) -> Result<T, GitHubError> {
        let response = request
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message: format!("{} failed: {}", action, text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Upload endpoint from a release's `upload_url` template.
fn asset_url(upload_url: &str, name: &str) -> String {
    let base = upload_url.split('{').next().unwrap_or(upload_url);
    format!("{}?name={}", base, urlencoding::encode(name))
}

#[async_trait]
impl GitObjects for GitHubClient {
    async fn get_ref(&self, reference: &str) -> Outcome<String> {
        let url = self.repo_url(&format!("git/ref/{}", reference));
        match Self::send::<RefResponse>(self.request(Method::GET, &url), "Get reference").await {
            Ok(found) => Ok(found.object.sha),
            Err(GitHubError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(Error::ReferenceConflict(format!("{} does not exist", reference)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_blob(&self, content: Bytes) -> Outcome<String> {
        let url = self.repo_url("git/blobs");
        let payload = json!({
            "content": STANDARD.encode(&content),
            "encoding": "base64",
        });

        let created: ShaResponse =
            Self::send(self.request(Method::POST, &url).json(&payload), "Create blob").await?;
        debug!(sha = %created.sha, size = content.len(), "Blob created");
        Ok(created.sha)
    }

    async fn create_tree(&self, items: &[TreeItem]) -> Outcome<String> {
        let url = self.repo_url("git/trees");
        let payload = json!({ "tree": items });

        let created: ShaResponse =
            Self::send(self.request(Method::POST, &url).json(&payload), "Create tree").await?;
        Ok(created.sha)
    }

    async fn create_commit(&self, commit: &NewCommit) -> Outcome<String> {
        let url = self.repo_url("git/commits");

        let created: ShaResponse =
            Self::send(self.request(Method::POST, &url).json(commit), "Create commit").await?;
        Ok(created.sha)
    }

    async fn update_ref(&self, reference: &str, sha: &str, force: bool) -> Outcome<()> {
        let url = self.repo_url(&format!("git/refs/{}", reference));
        let payload = json!({ "sha": sha, "force": force });

        let request = self.request(Method::PATCH, &url).json(&payload);
        match Self::send::<serde_json::Value>(request, "Update reference").await {
            Ok(_) => {
                info!(reference = %reference, sha = %sha, "Reference updated");
                Ok(())
            }
            Err(GitHubError::Api { status, message })
                if status == StatusCode::CONFLICT.as_u16()
                    || status == StatusCode::UNPROCESSABLE_ENTITY.as_u16() =>
            {
                Err(GitHubError::Conflict(message).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ReleaseHost for GitHubClient {
    async fn create_release(&self, tag: &str, commit_sha: &str) -> Outcome<Release> {
        let url = self.repo_url("releases");
        let payload = json!({
            "tag_name": tag,
            "target_commitish": commit_sha,
            "name": tag,
            "draft": false,
            "prerelease": false,
        });

        let created: ReleaseResponse =
            Self::send(self.request(Method::POST, &url).json(&payload), "Create release").await?;
        info!(tag = %created.tag_name, id = created.id, "Release created");

        Ok(Release {
            id: created.id,
            tag: created.tag_name,
            upload_url: created.upload_url,
        })
    }

    async fn upload_asset(&self, release: &Release, artifact: &Artifact) -> Outcome<()> {
        let content = tokio::fs::read(&artifact.path).await?;
        let url = asset_url(&release.upload_url, &artifact.name);

        let request = self
            .request(Method::POST, &url)
            .header("Content-Type", "application/octet-stream")
            .body(content);
        let _: serde_json::Value = Self::send(request, "Upload asset").await?;

        info!(asset = %artifact.name, release = %release.tag, "Asset uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use releasekit_core::ErrorKind;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GitHubClient {
        GitHubClient::new("acme", "sample", "token-123").with_api_url(server.uri())
    }

    #[tokio::test]
    async fn test_get_ref_returns_commit_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/sample/git/ref/heads/gh-pages"))
            .and(header("Authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ref": "refs/heads/gh-pages",
                "object": { "sha": "abc123", "type": "commit" }
            })))
            .mount(&server)
            .await;

        let sha = client(&server).get_ref("heads/gh-pages").await.unwrap();
        assert_eq!(sha, "abc123");
    }

    #[tokio::test]
    async fn test_missing_ref_is_reference_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/sample/git/ref/heads/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let err = client(&server).get_ref("heads/nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceConflict);
    }

    #[tokio::test]
    async fn test_blob_is_sent_base64_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/sample/git/blobs"))
            .and(body_json(json!({ "content": "aGVsbG8=", "encoding": "base64" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "b1" })))
            .expect(1)
            .mount(&server)
            .await;

        let sha = client(&server)
            .create_blob(Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert_eq!(sha, "b1");
    }

    #[tokio::test]
    async fn test_tree_items_serialize_with_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/sample/git/trees"))
            .and(body_json(json!({
                "tree": [{ "path": "index.html", "mode": "100644", "type": "blob", "sha": "b1" }]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "t1" })))
            .mount(&server)
            .await;

        let sha = client(&server)
            .create_tree(&[TreeItem::blob("index.html", "b1")])
            .await
            .unwrap();
        assert_eq!(sha, "t1");
    }

    #[tokio::test]
    async fn test_rejected_ref_update_is_reference_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/acme/sample/git/refs/heads/gh-pages"))
            .and(body_json(json!({ "sha": "c2", "force": true })))
            .respond_with(ResponseTemplate::new(422).set_body_string("Update is not a fast forward"))
            .mount(&server)
            .await;

        let err = client(&server)
            .update_ref("heads/gh-pages", "c2", true)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceConflict);
        assert!(err.to_string().contains("not a fast forward"));
    }

    #[tokio::test]
    async fn test_server_error_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/sample/git/commits"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let commit = NewCommit {
            message: "Site update".into(),
            tree: "t1".into(),
            parents: vec!["c1".into()],
        };
        let err = client(&server).create_commit(&commit).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
    }

    #[tokio::test]
    async fn test_release_and_asset_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/sample/releases"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 7,
                "tag_name": "v1.4.2",
                "upload_url": format!("{}/uploads/releases/7/assets{{?name,label}}", server.uri()),
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/uploads/releases/7/assets"))
            .and(query_param("name", "Sample_x64.exe"))
            .and(header("Content-Type", "application/octet-stream"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Sample_x64.exe");
        std::fs::write(&file, b"exe").unwrap();

        let github = client(&server);
        let release = github.create_release("v1.4.2", "abc123").await.unwrap();
        assert_eq!(release.id, 7);
        assert_eq!(release.tag, "v1.4.2");

        github
            .upload_asset(&release, &Artifact::from_path(file))
            .await
            .unwrap();
    }

    #[test]
    fn test_asset_url_strips_template() {
        assert_eq!(
            asset_url("https://uploads.example/releases/1/assets{?name,label}", "A B.zip"),
            "https://uploads.example/releases/1/assets?name=A%20B.zip"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let github = GitHubClient::new("acme", "sample", "token-123");
        assert!(!format!("{:?}", github).contains("token-123"));
    }
}
