//! Coercions applied to backend payloads at the HTTP boundary.
//!
//! The backend stores list-valued columns such as `image_urls` and
//! `tech_stack` as comma-joined text and sometimes serializes them that way.
//! Everything past this module only ever sees the normalized shape.

use serde::{Deserialize, Deserializer};

use crate::models::{FeedItem, FeedTag, ItemStats, MediaKind, MediaRef, OwnerSummary, Project, ProjectStatus};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "ogv"];

/// Accepts a JSON list of strings, a comma-joined string, or null.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match Option::<Shape>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Shape::Joined(raw)) => split_joined(&raw),
        Some(Shape::List(items)) => items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    })
}

/// Treats empty strings the same as a missing value.
pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

/// Unknown or missing statuses fall back to the backend's column default.
pub fn project_status<'de, D>(deserializer: D) -> Result<ProjectStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(ProjectStatus::parse)
        .unwrap_or_default())
}

pub fn split_joined(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Projects a full project record onto the card the swipe UI shows.
pub fn feed_item(project: Project) -> FeedItem {
    let media = project
        .cover_image
        .clone()
        .or_else(|| project.image_urls.first().cloned())
        .map(|url| MediaRef {
            kind: media_kind(&url),
            url,
        });

    let owner = match project.user {
        Some(user) => OwnerSummary {
            id: user.id,
            display_name: user.username,
            avatar_url: user.avatar_url,
        },
        None => OwnerSummary {
            id: project.user_id,
            display_name: String::new(),
            avatar_url: None,
        },
    };

    let tags = project
        .tags
        .into_iter()
        .map(|tag| FeedTag {
            id: tag.id,
            name: tag.tag_name,
            category: tag.tag_type,
        })
        .collect();

    FeedItem {
        id: project.id,
        title: project.title,
        description: project.description,
        media,
        owner,
        tags,
        status: project.status,
        stats: ItemStats {
            like_count: project.like_count,
            view_count: project.view_count,
            comment_count: project.comment_count,
        },
    }
}

fn media_kind(url: &str) -> MediaKind {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}
