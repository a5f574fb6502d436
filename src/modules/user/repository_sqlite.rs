use crate::{
    api::error,
    modules::user::{
        model::{NewUser, UpdateUser},
        repository::UserRepository,
        schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct UserRepositorySqlite {
    pool: sqlx::SqlitePool,
}

impl UserRepositorySqlite {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositorySqlite {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: &NewUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (username, email, name, date_of_birth, date_joined)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.date_of_birth)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: i64, user: &UpdateUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET
                username      = COALESCE(?2, username),
                email         = COALESCE(?3, email),
                name          = COALESCE(?4, name),
                date_of_birth = CASE WHEN ?5 THEN ?6 ELSE date_of_birth END
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&user.username) // ?2: Option<String>
        .bind(&user.email) // ?3: Option<String>
        .bind(&user.name) // ?4: Option<String>
        .bind(user.date_of_birth.is_some()) // ?5: was date_of_birth provided?
        .bind(user.date_of_birth.flatten()) // ?6: Option<NaiveDate>
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let friends =
            sqlx::query("DELETE FROM friend WHERE first_user_id = ?1 OR second_user_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let requests =
            sqlx::query("DELETE FROM friend_request WHERE sender_id = ?1 OR receiver_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let rows = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        log::debug!("User {id} deleted with {friends} friendships and {requests} requests");

        Ok(true)
    }
}
