//! Following sellers and posting comments on listings.
//!
//! Storage sits behind [`FollowStore`]; this module only decides what may
//! happen. Reads degrade to "not following" and zero counts when the store
//! fails, since a profile page still renders without them. Writes report
//! their errors so the user can try again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::records::UserProfile;

/// A backend call that did not go through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct StoreError(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SocialError {
    #[error("You need to be signed in")]
    NotSignedIn,

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("Comment is empty")]
    EmptyComment,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One row of the `followers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: String,
    pub following_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

/// What the follow button on a profile shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FollowState {
    /// Signed out, or looking at one's own profile.
    Unavailable,
    NotFollowing,
    Following,
}

pub trait FollowStore {
    fn contains(&self, edge: &FollowEdge) -> Result<bool, StoreError>;
    fn insert(&mut self, edge: &FollowEdge) -> Result<(), StoreError>;
    fn delete(&mut self, edge: &FollowEdge) -> Result<(), StoreError>;
    fn counts(&self, user_id: &str) -> Result<FollowCounts, StoreError>;
}

/// Follow data for a profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowSummary {
    pub counts: FollowCounts,
    pub state: FollowState,
}

/// The edge `viewer -> profile_id`, or why there cannot be one.
fn edge(viewer: Option<&str>, profile_id: &str) -> Result<FollowEdge, SocialError> {
    let viewer = viewer.ok_or(SocialError::NotSignedIn)?;
    if viewer == profile_id {
        return Err(SocialError::SelfFollow);
    }
    Ok(FollowEdge {
        follower_id: viewer.to_string(),
        following_id: profile_id.to_string(),
    })
}

pub fn follow_state(viewer: Option<&str>, profile_id: &str, store: &dyn FollowStore) -> FollowState {
    let Ok(edge) = edge(viewer, profile_id) else {
        return FollowState::Unavailable;
    };
    match store.contains(&edge) {
        Ok(true) => FollowState::Following,
        Ok(false) => FollowState::NotFollowing,
        Err(e) => {
            tracing::warn!(profile = profile_id, error = %e, "follow status lookup failed");
            FollowState::NotFollowing
        }
    }
}

pub fn follow_summary(
    viewer: Option<&str>,
    profile_id: &str,
    store: &dyn FollowStore,
) -> FollowSummary {
    let counts = store.counts(profile_id).unwrap_or_else(|e| {
        tracing::warn!(profile = profile_id, error = %e, "follow counts lookup failed");
        FollowCounts::default()
    });
    FollowSummary {
        counts,
        state: follow_state(viewer, profile_id, store),
    }
}

/// Follow `profile_id`, or unfollow when already following. Returns the new
/// state.
pub fn toggle_follow(
    viewer: Option<&str>,
    profile_id: &str,
    store: &mut dyn FollowStore,
) -> Result<FollowState, SocialError> {
    let edge = edge(viewer, profile_id)?;
    if store.contains(&edge)? {
        store.delete(&edge)?;
        tracing::info!(follower = %edge.follower_id, following = %edge.following_id, "unfollowed");
        Ok(FollowState::NotFollowing)
    } else {
        store.insert(&edge)?;
        tracing::info!(follower = %edge.follower_id, following = %edge.following_id, "followed");
        Ok(FollowState::Following)
    }
}

/// A comment or reply being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub product_id: i64,
    pub text: String,
    /// Set when replying to another comment.
    pub parent_id: Option<i64>,
}

/// Row inserted into `comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub product_id: i64,
    pub username: String,
    pub avatar: String,
    pub comment: String,
    pub parent_id: Option<i64>,
}

impl CommentDraft {
    pub fn new(product_id: i64, text: impl Into<String>) -> Self {
        Self {
            product_id,
            text: text.into(),
            parent_id: None,
        }
    }

    pub fn reply(product_id: i64, parent_id: i64, text: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::new(product_id, text)
        }
    }

    /// Build the row to insert, signed with the author's profile.
    pub fn publish(&self, author: Option<&UserProfile>) -> Result<NewComment, SocialError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(SocialError::EmptyComment);
        }
        let author = author.ok_or(SocialError::NotSignedIn)?;
        Ok(NewComment {
            product_id: self.product_id,
            username: author.username.clone(),
            avatar: author.photo.clone(),
            comment: text.to_string(),
            parent_id: self.parent_id,
        })
    }
}
