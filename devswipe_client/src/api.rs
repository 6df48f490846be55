use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::credentials::{AuthSession, Credentials};
use crate::error::ApiError;
use crate::models::{
    AuthResponse, Comment, CommentRequest, CommentsResponse, CreateProjectRequest, FeedPage,
    FeedResponse, FollowersResponse, FollowingResponse, HealthResponse, InteractionRequest,
    LoginRequest, MessageResponse, Project, ProjectStats, ProjectsResponse, RegisterRequest,
    SearchResponse, UpdateProfileRequest, UpdateProjectRequest, User,
};
use crate::normalize;

/// The two calls the feed session makes against the backend.
///
/// `ApiClient` is the production implementation; tests substitute an
/// in-process fake.
#[async_trait]
pub trait FeedBackend: Send + Sync {
    async fn fetch_feed(&self, page: u32, limit: u32, session_id: &str)
        -> Result<FeedPage, ApiError>;

    async fn submit_interaction(&self, request: &InteractionRequest) -> Result<(), ApiError>;
}

/// Signal sent when the backend rejects the stored credentials. The
/// application reacts by showing its login surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExpired;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    credentials: Credentials,
    expiry_subscriber: Arc<Mutex<Option<flume::Sender<SessionExpired>>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_credentials(config, Credentials::new())
    }

    pub fn with_credentials(config: &ClientConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let base_url = sanitize_base_url(config.base_url.clone())?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Network(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            base_url,
            client,
            credentials,
            expiry_subscriber: Arc::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Subscribes to credential expiry, replacing any earlier subscriber.
    ///
    /// Expiries raised before this call are not delivered. At most one signal
    /// waits in the receiver; further 401s are folded into it until it is read.
    pub fn session_expired(&self) -> flume::Receiver<SessionExpired> {
        let (tx, rx) = flume::bounded(1);
        *self.expiry_subscriber.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    // Auth

    pub async fn register(&self, input: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let url = self.url("/auth/register")?;
        let auth: AuthResponse = self.send(self.client.post(url).json(input)).await?;
        self.store_credentials(&auth);
        Ok(auth)
    }

    pub async fn login(&self, input: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let url = self.url("/auth/login")?;
        let auth: AuthResponse = self.send(self.client.post(url).json(input)).await?;
        self.store_credentials(&auth);
        Ok(auth)
    }

    pub fn logout(&self) {
        self.credentials.clear();
    }

    pub async fn get_profile(&self) -> Result<User, ApiError> {
        let url = self.url("/users/me")?;
        self.send(self.client.get(url)).await
    }

    pub async fn update_profile(&self, input: &UpdateProfileRequest) -> Result<MessageResponse, ApiError> {
        let url = self.url("/users/me")?;
        self.send(self.client.put(url).json(input)).await
    }

    // Social

    pub async fn follow_user(&self, user_id: i64) -> Result<MessageResponse, ApiError> {
        let url = self.url(&format!("/users/{user_id}/follow"))?;
        self.send(self.client.post(url)).await
    }

    pub async fn unfollow_user(&self, user_id: i64) -> Result<MessageResponse, ApiError> {
        let url = self.url(&format!("/users/{user_id}/follow"))?;
        self.send(self.client.delete(url)).await
    }

    pub async fn followers(&self, user_id: i64, limit: u32, offset: u32) -> Result<Vec<User>, ApiError> {
        let url = self.paged_url(&format!("/users/{user_id}/followers"), limit, offset)?;
        let response: FollowersResponse = self.send(self.client.get(url)).await?;
        Ok(response.followers)
    }

    pub async fn following(&self, user_id: i64, limit: u32, offset: u32) -> Result<Vec<User>, ApiError> {
        let url = self.paged_url(&format!("/users/{user_id}/following"), limit, offset)?;
        let response: FollowingResponse = self.send(self.client.get(url)).await?;
        Ok(response.following)
    }

    // Projects

    pub async fn get_feed(&self, page: u32, limit: u32, session_id: Option<&str>) -> Result<FeedResponse, ApiError> {
        let mut url = self.url("/projects/feed")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            query.append_pair("limit", &limit.to_string());
            if let Some(session_id) = session_id.filter(|id| !id.is_empty()) {
                query.append_pair("session_id", session_id);
            }
        }
        self.send(self.client.get(url)).await
    }

    pub async fn get_project(&self, project_id: i64) -> Result<Project, ApiError> {
        let url = self.url(&format!("/projects/{project_id}"))?;
        self.send(self.client.get(url)).await
    }

    pub async fn create_project(&self, input: &CreateProjectRequest) -> Result<Project, ApiError> {
        let url = self.url("/projects")?;
        self.send(self.client.post(url).json(input)).await
    }

    pub async fn update_project(&self, project_id: i64, input: &UpdateProjectRequest) -> Result<Project, ApiError> {
        let url = self.url(&format!("/projects/{project_id}"))?;
        self.send(self.client.put(url).json(input)).await
    }

    pub async fn delete_project(&self, project_id: i64) -> Result<MessageResponse, ApiError> {
        let url = self.url(&format!("/projects/{project_id}"))?;
        self.send(self.client.delete(url)).await
    }

    pub async fn user_projects(&self, user_id: i64, limit: u32, offset: u32) -> Result<Vec<Project>, ApiError> {
        let url = self.paged_url(&format!("/users/{user_id}/projects"), limit, offset)?;
        let response: ProjectsResponse = self.send(self.client.get(url)).await?;
        Ok(response.projects)
    }

    pub async fn search_projects(&self, keyword: &str, limit: u32, offset: u32) -> Result<SearchResponse, ApiError> {
        let mut url = self.paged_url("/projects/search", limit, offset)?;
        url.query_pairs_mut().append_pair("q", keyword);
        self.send(self.client.get(url)).await
    }

    pub async fn project_stats(&self, project_id: i64) -> Result<ProjectStats, ApiError> {
        let url = self.url(&format!("/projects/{project_id}/stats"))?;
        self.send(self.client.get(url)).await
    }

    pub async fn interact(&self, request: &InteractionRequest) -> Result<MessageResponse, ApiError> {
        let url = self.url(&format!("/projects/{}/interact", request.project_id))?;
        self.send(self.client.post(url).json(request)).await
    }

    // Comments

    pub async fn add_comment(&self, project_id: i64, input: &CommentRequest) -> Result<Comment, ApiError> {
        let url = self.url(&format!("/projects/{project_id}/comments"))?;
        self.send(self.client.post(url).json(input)).await
    }

    pub async fn comments(&self, project_id: i64, limit: u32, offset: u32) -> Result<Vec<Comment>, ApiError> {
        let url = self.paged_url(&format!("/projects/{project_id}/comments"), limit, offset)?;
        let response: CommentsResponse = self.send(self.client.get(url)).await?;
        Ok(response.comments)
    }

    /// `GET /health` lives at the server root rather than under the API prefix.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        url.set_path("/health");
        url.set_query(None);
        self.send(self.client.get(url)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match self.credentials.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::AuthExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), error_message(status, &body)));
        }
        response.json::<T>().await.map_err(|err| ApiError::Decode(err.to_string()))
    }

    fn store_credentials(&self, auth: &AuthResponse) {
        self.credentials.set(AuthSession {
            token: auth.token.clone(),
            user_id: auth.user_id,
            username: auth.username.clone(),
        });
    }

    fn expire_session(&self) {
        tracing::warn!(base_url = %self.base_url, "backend rejected credentials; clearing session");
        self.credentials.clear();
        let mut subscriber = self.expiry_subscriber.lock().unwrap_or_else(PoisonError::into_inner);
        let disconnected = match subscriber.as_ref() {
            Some(tx) => matches!(tx.try_send(SessionExpired), Err(flume::TrySendError::Disconnected(_))),
            None => false,
        };
        if disconnected {
            *subscriber = None;
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|err| ApiError::InvalidUrl(format!("{joined}: {err}")))
    }

    fn paged_url(&self, path: &str, limit: u32, offset: u32) -> Result<Url, ApiError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }
}

#[async_trait]
impl FeedBackend for ApiClient {
    async fn fetch_feed(&self, page: u32, limit: u32, session_id: &str) -> Result<FeedPage, ApiError> {
        let response = self.get_feed(page, limit, Some(session_id)).await?;
        Ok(FeedPage {
            items: response.projects.into_iter().map(normalize::feed_item).collect(),
            has_more: response.has_more,
        })
    }

    async fn submit_interaction(&self, request: &InteractionRequest) -> Result<(), ApiError> {
        self.interact(request).await.map(|_| ())
    }
}

/// Pulls the `error` field out of a backend error body, falling back to the
/// raw text or the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

/// Normalizes a configured API root to `scheme://host[:port]/prefix` with no
/// trailing slash, so `url()` can join paths with a single `/`.
fn sanitize_base_url(raw: String) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let base = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    Url::parse(&base)
        .map(|_| base.clone())
        .map_err(|err| ApiError::InvalidUrl(format!("{base}: {err}")))
}
