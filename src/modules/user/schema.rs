use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub date_joined: chrono::DateTime<chrono::Utc>,
}
