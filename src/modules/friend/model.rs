use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::{api::error, modules::user::model::UserResponse};

/// How the two user references of a pair are compared for uniqueness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairOrdering {
    /// (A, B) and (B, A) are distinct records.
    #[default]
    Ordered,
    /// (B, A) is rejected while (A, B) exists.
    Symmetric,
}

impl FromStr for PairOrdering {
    type Err = error::SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordered" => Ok(PairOrdering::Ordered),
            "symmetric" => Ok(PairOrdering::Symmetric),
            other => Err(error::SystemError::config(format!(
                "PAIR_ORDERING must be `ordered` or `symmetric`, got `{other}`"
            ))),
        }
    }
}

impl fmt::Display for PairOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairOrdering::Ordered => f.write_str("ordered"),
            PairOrdering::Symmetric => f.write_str("symmetric"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FriendConstraints {
    pub pair_ordering: PairOrdering,
    pub allow_self_pairs: bool,
}

impl FriendConstraints {
    pub fn symmetric() -> Self {
        FriendConstraints { pair_ordering: PairOrdering::Symmetric, ..Default::default() }
    }

    pub fn check_pair(&self, a: i64, b: i64) -> Result<(), error::SystemError> {
        if a == b && !self.allow_self_pairs {
            return Err(error::SystemError::bad_request("A user cannot be paired with themselves"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FriendResponse {
    pub friendship_id: i64,
    pub id: i64,
    pub username: String,
    pub name: String,
    pub since: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IdOrInfo {
    Id(i64),
    Info(UserResponse),
}

impl IdOrInfo {
    pub fn id(&self) -> i64 {
        match self {
            IdOrInfo::Id(id) => *id,
            IdOrInfo::Info(info) => info.id,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct FriendUserRow {
    pub req_id: i64,
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendUserRow {
    pub fn user(&self) -> UserResponse {
        UserResponse { id: self.user_id, username: self.username.clone(), name: self.name.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequestResponse {
    pub id: i64,
    pub from: IdOrInfo,
    pub to: IdOrInfo,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_ordering_parses_case_insensitively() {
        assert_eq!("Ordered".parse::<PairOrdering>().unwrap(), PairOrdering::Ordered);
        assert_eq!(" symmetric ".parse::<PairOrdering>().unwrap(), PairOrdering::Symmetric);
        assert!(matches!(
            "sorted".parse::<PairOrdering>(),
            Err(error::SystemError::Config(_))
        ));
    }

    #[test]
    fn self_pairs_rejected_unless_allowed() {
        let strict = FriendConstraints::default();
        assert!(matches!(strict.check_pair(1, 1), Err(error::SystemError::BadRequest(_))));
        assert!(strict.check_pair(1, 2).is_ok());

        let lenient = FriendConstraints { allow_self_pairs: true, ..Default::default() };
        assert!(lenient.check_pair(1, 1).is_ok());
    }
}
