use serde::Serialize;
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FriendEntity {
    pub id: i64,
    pub first_user_id: i64,
    pub second_user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendEntity {
    pub fn involves(&self, user_id: i64) -> bool {
        self.first_user_id == user_id || self.second_user_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FriendRequestEntity {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
