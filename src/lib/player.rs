use serde::{Deserialize, Serialize};

use crate::UserId;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MemberRole {
    Captain,
    #[default]
    Member,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TeamMember {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(rename = "joinedAt", default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
}

impl TeamMember {
    pub fn new(user_id: UserId, username: impl Into<String>, role: MemberRole) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            joined_at: None,
        }
    }

    pub fn is_captain(&self) -> bool {
        self.role == MemberRole::Captain
    }
}

/// The authenticated user looking at the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: UserId,
    pub username: String,
}

impl Viewer {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}
