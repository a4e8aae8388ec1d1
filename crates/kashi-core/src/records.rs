//! Backend records as they arrive from the marketplace API.
//!
//! Rows are loosely filled in: usernames and photos may be missing, `null`
//! or empty. The fallbacks are applied here while deserializing so nothing
//! downstream has to check again.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Shown for users without a profile photo.
pub const DEFAULT_AVATAR_URL: &str = "/placeholder-avatar.png";

/// Username shown when a profile has none.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default = "anonymous", deserialize_with = "username_or_anonymous")]
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default = "default_avatar", deserialize_with = "photo_or_default")]
    pub photo: String,
}

/// Seller columns joined onto a product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerSummary {
    #[serde(default = "anonymous", deserialize_with = "username_or_anonymous")]
    pub username: String,
    #[serde(default = "default_avatar", deserialize_with = "photo_or_default")]
    pub photo: String,
}

impl Default for SellerSummary {
    fn default() -> Self {
        Self {
            username: anonymous(),
            photo: default_avatar(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(rename = "users", default, deserialize_with = "null_as_default")]
    pub seller: SellerSummary,
}

impl Product {
    /// The listing thumbnail.
    pub fn main_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub product_id: i64,
    #[serde(default = "anonymous", deserialize_with = "username_or_anonymous")]
    pub username: String,
    #[serde(default = "default_avatar", deserialize_with = "photo_or_default")]
    pub avatar: String,
    pub comment: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

/// A top-level comment with its replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Group flat comment rows into threads.
///
/// Threads are newest first; replies within a thread are oldest first.
/// Replies whose parent is not among `comments` are dropped.
pub fn thread_comments(comments: Vec<Comment>) -> Vec<CommentThread> {
    let (mut top, replies): (Vec<_>, Vec<_>) =
        comments.into_iter().partition(|c| c.parent_id.is_none());

    top.sort_by(|a, b| (&b.created_at, b.id).cmp(&(&a.created_at, a.id)));

    let mut by_parent: HashMap<i64, Vec<Comment>> = HashMap::new();
    for reply in replies {
        if let Some(parent) = reply.parent_id {
            by_parent.entry(parent).or_default().push(reply);
        }
    }

    let threads: Vec<CommentThread> = top
        .into_iter()
        .map(|comment| {
            let mut replies = by_parent.remove(&comment.id).unwrap_or_default();
            replies.sort_by(|a, b| (&a.created_at, a.id).cmp(&(&b.created_at, b.id)));
            CommentThread { comment, replies }
        })
        .collect();

    let orphans: usize = by_parent.values().map(Vec::len).sum();
    if orphans > 0 {
        tracing::debug!(orphans, "dropped replies without a parent");
    }
    threads
}

fn anonymous() -> String {
    ANONYMOUS.to_string()
}

fn default_avatar() -> String {
    DEFAULT_AVATAR_URL.to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn username_or_anonymous<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(non_blank(Option::deserialize(d)?).unwrap_or_else(anonymous))
}

fn photo_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(non_blank(Option::deserialize(d)?).unwrap_or_else(default_avatar))
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::deserialize(d)?.unwrap_or_default())
}

fn null_as_default<'de, D: Deserializer<'de>>(d: D) -> Result<SellerSummary, D::Error> {
    Ok(Option::deserialize(d)?.unwrap_or_default())
}
