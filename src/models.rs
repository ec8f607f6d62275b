// Data models for the dashboard collections

use crate::error::{Result, StoreError};
use crate::record::{IndexValue, Record};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Record timestamps, kept at millisecond precision
pub type Timestamp = DateTime<Utc>;

pub const DEFAULT_ROLE: &str = "user";
pub const ADMIN_ROLE: &str = "admin";
pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_CATEGORY: &str = "general";

const EXCERPT_CHARS: usize = 150;
const WORDS_PER_MINUTE: usize = 200;

/// Registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
    #[serde(with = "iso8601")]
    pub updated_at: Timestamp,
}

/// Input for creating a user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Partial update for a user; `id` and `createdAt` are not representable
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl Record for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn kind() -> &'static str {
        "user"
    }

    fn collection_name() -> &'static str {
        "users"
    }

    fn from_draft(id: u64, draft: NewUser, now: Timestamp) -> Result<Self> {
        let (Some(name), Some(email)) = (present(draft.name), present(draft.email)) else {
            return Err(StoreError::Validation("Name and email are required".to_string()));
        };

        Ok(Self {
            id,
            name,
            email,
            role: draft.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        // Uniqueness is only checked on insert
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("email", &self.email))
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("role".to_string(), IndexValue::from(self.role.as_str()));
        fields
    }
}

/// Blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub likes: u64,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
    #[serde(with = "iso8601")]
    pub updated_at: Timestamp,
}

impl Post {
    /// First 150 characters of the content followed by an ellipsis
    pub fn excerpt(&self) -> String {
        let head: String = self.content.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", head)
    }

    /// Estimated reading time in minutes at 200 words per minute
    pub fn reading_time(&self) -> usize {
        self.content.split_whitespace().count().div_ceil(WORDS_PER_MINUTE)
    }
}

/// Tags accept either a single string or a list of strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    One(String),
    Many(Vec<String>),
}

impl Tags {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Tags::One(tag) => vec![tag],
            Tags::Many(tags) => tags,
        }
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Tags::Many(tags)
    }
}

impl From<&str> for Tags {
    fn from(tag: &str) -> Self {
        Tags::One(tag.to_string())
    }
}

/// Input for creating a post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Tags>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<Tags>) -> Self {
        self.tags = Some(tags.into());
        self
    }
}

/// Partial update for a post; `id` and `createdAt` are not representable
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Tags>,
    pub likes: Option<u64>,
}

impl Record for Post {
    type Draft = NewPost;
    type Patch = PostPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn kind() -> &'static str {
        "post"
    }

    fn collection_name() -> &'static str {
        "posts"
    }

    fn from_draft(id: u64, draft: NewPost, now: Timestamp) -> Result<Self> {
        let (Some(title), Some(content)) = (present(draft.title), present(draft.content)) else {
            return Err(StoreError::Validation("Title and content are required".to_string()));
        };

        Ok(Self {
            id,
            title,
            content,
            author: present(draft.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            category: draft.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: draft.tags.map(Tags::into_vec).unwrap_or_default(),
            likes: 0,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_patch(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags.into_vec();
        }
        if let Some(likes) = patch.likes {
            self.likes = likes;
        }
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("author".to_string(), IndexValue::from(self.author.as_str()));
        fields.insert("category".to_string(), IndexValue::from(self.category.as_str()));
        fields
    }
}

/// Keep a value only if it has non-whitespace content
fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Current time truncated to milliseconds
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// A timestamp strictly later than `prev`: now, or `prev` plus one millisecond
pub fn advance(prev: Timestamp) -> Timestamp {
    let current = now();
    if current > prev {
        current
    } else {
        prev + TimeDelta::milliseconds(1)
    }
}

/// ISO-8601 (RFC 3339, millisecond, `Z` suffix) timestamp serialization
pub mod iso8601 {
    use super::Timestamp;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
