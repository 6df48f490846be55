use serde::{Deserialize, Serialize};

use crate::normalize;

// Wire types mirror the REST payloads. List-valued fields are normalized
// during deserialization by the helpers in `normalize`.

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "normalize::optional_string")]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "normalize::optional_string")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "normalize::string_list")]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub is_creator: bool,
    #[serde(default)]
    pub follower_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Concept,
    #[default]
    Demo,
    Mvp,
    Launched,
}

impl ProjectStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "concept" => Some(Self::Concept),
            "demo" => Some(Self::Demo),
            "mvp" => Some(Self::Mvp),
            "launched" => Some(Self::Launched),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Demo => "demo",
            Self::Mvp => "mvp",
            Self::Launched => "launched",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProjectTag {
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    pub tag_name: String,
    /// tech, domain, function, stage or hackathon
    #[serde(default)]
    pub tag_type: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "normalize::optional_string")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "normalize::string_list")]
    pub image_urls: Vec<String>,
    #[serde(default, deserialize_with = "normalize::optional_string")]
    pub project_url: Option<String>,
    #[serde(default, deserialize_with = "normalize::project_status")]
    pub status: ProjectStatus,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub dislike_count: i64,
    #[serde(default)]
    pub super_like_count: i64,
    #[serde(default)]
    pub skip_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub tags: Vec<ProjectTag>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectsResponse {
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProjectStats {
    pub project_id: i64,
    #[serde(default)]
    pub like_rate: f64,
    #[serde(default)]
    pub view_rate: f64,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub total_views: i64,
    #[serde(default)]
    pub total_likes: i64,
    #[serde(default)]
    pub total_dislikes: i64,
    #[serde(default)]
    pub total_comments: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

// Interactions

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Like,
    Dislike,
    SuperLike,
    Skip,
    Bookmark,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::SuperLike => "super_like",
            Self::Skip => "skip",
            Self::Bookmark => "bookmark",
        }
    }
}

/// Reason a user gives when passing on a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StructuredFeedback {
    NotInterested,
    UnclearProblem,
    EasyTech,
    ExistingProducts,
    PoorDemo,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InteractionRequest {
    pub project_id: i64,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub view_duration: f64,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_feedback: Option<StructuredFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// Comments

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub project_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub content: String,
    #[serde(default)]
    pub is_technical: bool,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct CommentRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub is_technical: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

// Auth and social

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowersResponse {
    #[serde(default)]
    pub followers: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowingResponse {
    #[serde(default)]
    pub following: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

// Feed cards

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    pub id: i64,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTag {
    pub id: i64,
    pub name: String,
    pub category: String,
}

/// Server-confirmed counters as of the last page that carried this item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemStats {
    pub like_count: i64,
    pub view_count: i64,
    pub comment_count: i64,
}

/// One swipeable project card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub media: Option<MediaRef>,
    pub owner: OwnerSummary,
    pub tags: Vec<FeedTag>,
    pub status: ProjectStatus,
    pub stats: ItemStats,
}

impl FeedItem {
    /// Minimal card, mostly useful for tests and previews.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            media: None,
            owner: OwnerSummary {
                id: 0,
                display_name: String::new(),
                avatar_url: None,
            },
            tags: Vec::new(),
            status: ProjectStatus::default(),
            stats: ItemStats::default(),
        }
    }
}

/// A page of feed cards as handed to the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub has_more: bool,
}
