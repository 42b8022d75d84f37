//! Repository-scoped API client
//!
//! Every method maps one domain operation onto one HTTP call and returns
//! the response untouched. Status codes are not interpreted here: a 422 is
//! an `Ok` response the caller inspects, and only transport failures come
//! back as errors. Nothing is retried, because create calls are not
//! idempotent.

use crate::api::payloads::{NewIssue, NewRepository, NewTag, RepositoryUpdate, TagBody};
use crate::transport::{ApiResponse, HttpMethod, Transport, TransportRequest, TransportResult};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Owner/repository pair a client is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    owner: String,
    repository: String,
}

impl ResourceIdentity {
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repository)
    }
}

/// Typed façade over the repository-hosting endpoints
///
/// The transport is shared, not owned: several clients bound to different
/// repositories can sit on one `Arc<dyn Transport>`.
#[derive(Clone)]
pub struct RepositoryClient {
    transport: Arc<dyn Transport>,
    identity: ResourceIdentity,
    base_url: String,
}

impl fmt::Debug for RepositoryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryClient")
            .field("identity", &self.identity)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RepositoryClient {
    /// Creates a client bound to `identity`
    ///
    /// A trailing `/` on `base_url` is dropped so paths join cleanly.
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        identity: ResourceIdentity,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            identity,
            base_url,
        }
    }

    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/repos/{owner}/{repo}` followed by `suffix`
    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url, self.identity.owner, self.identity.repository, suffix
        )
    }

    fn user_repos_url(&self) -> String {
        format!("{}/user/repos", self.base_url)
    }

    async fn send(&self, request: TransportRequest) -> TransportResult<ApiResponse> {
        tracing::debug!("{} {}", request.method, request.url);
        let response = self.transport.request(request).await?;
        tracing::debug!("-> {} {}", response.status(), response.status_text());
        Ok(response)
    }

    async fn send_json<B: Serialize>(
        &self,
        method: HttpMethod,
        url: String,
        body: &B,
    ) -> TransportResult<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.send(TransportRequest::new(method, url).with_json(body))
            .await
    }

    /// Opens an issue on the bound repository; 201 on success
    pub async fn create_issue<I, S>(
        &self,
        title: &str,
        body: &str,
        labels: I,
    ) -> TransportResult<ApiResponse>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let issue = NewIssue {
            title: title.to_string(),
            body: body.to_string(),
            labels: labels.into_iter().map(Into::into).collect(),
        };
        self.send_json(HttpMethod::Post, self.repo_url("/issues"), &issue)
            .await
    }

    /// Creates a repository for the authenticated user; 201 on success
    ///
    /// User-scoped: the bound identity is not used.
    pub async fn create_repository(&self, data: &NewRepository) -> TransportResult<ApiResponse> {
        self.send_json(HttpMethod::Post, self.user_repos_url(), data)
            .await
    }

    /// Deletes the bound repository; 204 on success
    pub async fn delete_repository(&self) -> TransportResult<ApiResponse> {
        self.send(TransportRequest::new(HttpMethod::Delete, self.repo_url("")))
            .await
    }

    /// Lists repositories of the authenticated user
    ///
    /// User-scoped: the bound identity is not used.
    pub async fn list_user_repositories(&self) -> TransportResult<ApiResponse> {
        self.send(TransportRequest::new(HttpMethod::Get, self.user_repos_url()))
            .await
    }

    /// Lists public repositories of the bound owner (`GET /users/{owner}/repos`)
    pub async fn list_owner_repositories(&self) -> TransportResult<ApiResponse> {
        let url = format!("{}/users/{}/repos", self.base_url, self.identity.owner);
        self.send(TransportRequest::new(HttpMethod::Get, url)).await
    }

    /// Applies a partial update to the bound repository with `PATCH`
    pub async fn update_repository(
        &self,
        data: &RepositoryUpdate,
    ) -> TransportResult<ApiResponse> {
        self.send_json(HttpMethod::Patch, self.repo_url(""), data)
            .await
    }

    /// Creates an annotated tag object named `tag_name`
    pub async fn create_tag(&self, tag_name: &str, data: &NewTag) -> TransportResult<ApiResponse> {
        let body = TagBody {
            tag: tag_name,
            details: data,
        };
        self.send_json(HttpMethod::Post, self.repo_url("/tags"), &body)
            .await
    }

    /// Lists tags of the bound repository
    pub async fn list_repository_tags(&self) -> TransportResult<ApiResponse> {
        self.send(TransportRequest::new(HttpMethod::Get, self.repo_url("/tags")))
            .await
    }
}
