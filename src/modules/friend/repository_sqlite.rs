use crate::{
    api::error,
    modules::friend::{
        model::{
            FriendConstraints, FriendRequestResponse, FriendResponse, FriendUserRow, IdOrInfo,
            PairOrdering,
        },
        repository::{FriendRepo, FriendRepository, FriendRequestRepository},
        schema::{FriendEntity, FriendRequestEntity},
    },
};

const FRIEND_PAIR: &str = "friend.first_user_id, friend.second_user_id";
const FRIEND_REQUEST_PAIR: &str = "friend_request.sender_id, friend_request.receiver_id";

const INSERT_FRIEND: &str = r#"
    INSERT INTO friend (first_user_id, second_user_id, created_at)
    VALUES (?1, ?2, ?3)
    RETURNING *
"#;

// The reverse-pair check and the insert are one statement, so no other
// writer can slip the mirrored row in between.
const INSERT_FRIEND_SYMMETRIC: &str = r#"
    INSERT INTO friend (first_user_id, second_user_id, created_at)
    SELECT ?1, ?2, ?3
    WHERE NOT EXISTS (
        SELECT 1 FROM friend WHERE first_user_id = ?2 AND second_user_id = ?1
    )
    RETURNING *
"#;

const INSERT_FRIEND_REQUEST: &str = r#"
    INSERT INTO friend_request (sender_id, receiver_id, created_at)
    VALUES (?1, ?2, ?3)
    RETURNING *
"#;

const INSERT_FRIEND_REQUEST_SYMMETRIC: &str = r#"
    INSERT INTO friend_request (sender_id, receiver_id, created_at)
    SELECT ?1, ?2, ?3
    WHERE NOT EXISTS (
        SELECT 1 FROM friend_request WHERE sender_id = ?2 AND receiver_id = ?1
    )
    RETURNING *
"#;

const NO_FRIENDSHIP_EITHER_ORDER: &str = r#"
    NOT EXISTS (
        SELECT 1 FROM friend
        WHERE (first_user_id = ?1 AND second_user_id = ?2)
           OR (first_user_id = ?2 AND second_user_id = ?1)
    )
"#;

const NO_REVERSE_FRIEND_REQUEST: &str = r#"
    NOT EXISTS (
        SELECT 1 FROM friend_request WHERE sender_id = ?2 AND receiver_id = ?1
    )
"#;

const SELECT_FRIENDSHIP_EITHER_ORDER: &str = r#"
    SELECT * FROM friend
    WHERE (first_user_id = ?1 AND second_user_id = ?2)
       OR (first_user_id = ?2 AND second_user_id = ?1)
    ORDER BY id
    LIMIT 1
"#;

#[derive(Clone)]
pub struct FriendRepositorySqlite {
    pool: sqlx::SqlitePool,
    constraints: FriendConstraints,
}

impl FriendRepositorySqlite {
    pub fn new(pool: sqlx::SqlitePool, constraints: FriendConstraints) -> Self {
        Self { pool, constraints }
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositorySqlite {
    async fn find_friendship(
        &self,
        user_id_a: i64,
        user_id_b: i64,
    ) -> Result<Option<FriendEntity>, error::SystemError> {
        let friendship = sqlx::query_as::<_, FriendEntity>(SELECT_FRIENDSHIP_EITHER_ORDER)
            .bind(user_id_a)
            .bind(user_id_b)
            .fetch_optional(&self.pool)
            .await?;

        Ok(friendship)
    }

    async fn find_friends(&self, user_id: i64) -> Result<Vec<FriendResponse>, error::SystemError> {
        // one row per friend even when both orders are stored
        let friends = sqlx::query_as::<_, FriendResponse>(
            r#"
            SELECT
                MIN(f.id) AS friendship_id,
                u.id,
                u.username,
                u.name,
                MIN(f.created_at) AS since
            FROM friend f
            JOIN users u
                ON u.id = CASE
                    WHEN f.first_user_id = ?1 THEN f.second_user_id
                    ELSE f.first_user_id
                END
            WHERE f.first_user_id = ?1
               OR f.second_user_id = ?1
            GROUP BY u.id
            ORDER BY friendship_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn create_friendship(
        &self,
        first_user_id: i64,
        second_user_id: i64,
    ) -> Result<FriendEntity, error::SystemError> {
        self.constraints.check_pair(first_user_id, second_user_id)?;

        let sql = match self.constraints.pair_ordering {
            PairOrdering::Ordered => INSERT_FRIEND,
            PairOrdering::Symmetric => INSERT_FRIEND_SYMMETRIC,
        };

        sqlx::query_as::<_, FriendEntity>(sql)
            .bind(first_user_id)
            .bind(second_user_id)
            .bind(chrono::Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                error::SystemError::uniqueness(FRIEND_PAIR, "Friendship exists in reverse order")
            })
    }

    async fn delete_friendship(
        &self,
        user_id_a: i64,
        user_id_b: i64,
    ) -> Result<u64, error::SystemError> {
        let rows = sqlx::query(
            r#"
            DELETE FROM friend
            WHERE (first_user_id = ?1 AND second_user_id = ?2)
               OR (first_user_id = ?2 AND second_user_id = ?1)
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositorySqlite {
    async fn find_friend_request_by_id(
        &self,
        request_id: i64,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request =
            sqlx::query_as::<_, FriendRequestEntity>("SELECT * FROM friend_request WHERE id = ?1")
                .bind(request_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(request)
    }

    async fn find_friend_request_from_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendUserRow>(
            r#"
            SELECT
                fr.id AS req_id,
                u.id AS user_id,
                u.username,
                u.name,
                fr.created_at
            FROM friend_request fr
            JOIN users u
                ON fr.receiver_id = u.id
            WHERE fr.sender_id = ?1
            ORDER BY fr.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| FriendRequestResponse {
                id: r.req_id,
                from: IdOrInfo::Id(user_id),
                to: IdOrInfo::Info(r.user()),
                created_at: r.created_at,
            })
            .collect())
    }

    async fn find_friend_request_to_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendUserRow>(
            r#"
            SELECT
                fr.id AS req_id,
                u.id AS user_id,
                u.username,
                u.name,
                fr.created_at
            FROM friend_request fr
            JOIN users u
                ON fr.sender_id = u.id
            WHERE fr.receiver_id = ?1
            ORDER BY fr.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| FriendRequestResponse {
                id: r.req_id,
                from: IdOrInfo::Info(r.user()),
                to: IdOrInfo::Id(user_id),
                created_at: r.created_at,
            })
            .collect())
    }

    async fn create_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.constraints.check_pair(sender_id, receiver_id)?;

        let sql = match self.constraints.pair_ordering {
            PairOrdering::Ordered => INSERT_FRIEND_REQUEST,
            PairOrdering::Symmetric => INSERT_FRIEND_REQUEST_SYMMETRIC,
        };

        sqlx::query_as::<_, FriendRequestEntity>(sql)
            .bind(sender_id)
            .bind(receiver_id)
            .bind(chrono::Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                error::SystemError::uniqueness(
                    FRIEND_REQUEST_PAIR,
                    "Friend request exists in reverse order",
                )
            })
    }

    async fn create_friend_request_unless_friends(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.constraints.check_pair(sender_id, receiver_id)?;

        let mut sql = format!(
            "INSERT INTO friend_request (sender_id, receiver_id, created_at) \
             SELECT ?1, ?2, ?3 WHERE {NO_FRIENDSHIP_EITHER_ORDER}"
        );
        if self.constraints.pair_ordering == PairOrdering::Symmetric {
            sql.push_str(" AND ");
            sql.push_str(NO_REVERSE_FRIEND_REQUEST);
        }
        sql.push_str(" RETURNING *");

        let request = sqlx::query_as::<_, FriendRequestEntity>(&sql)
            .bind(sender_id)
            .bind(receiver_id)
            .bind(chrono::Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        if let Some(request) = request {
            return Ok(request);
        }

        if self.find_friendship(sender_id, receiver_id).await?.is_some() {
            Err(error::SystemError::uniqueness(FRIEND_PAIR, "Users are already friends"))
        } else {
            Err(error::SystemError::uniqueness(
                FRIEND_REQUEST_PAIR,
                "Friend request exists in reverse order",
            ))
        }
    }

    async fn delete_friend_request(&self, request_id: i64) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM friend_request WHERE id = ?1")
            .bind(request_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositorySqlite {
    fn constraints(&self) -> FriendConstraints {
        self.constraints
    }

    async fn accept_friend_request_atomic(
        &self,
        request_id: i64,
        user_id: i64,
    ) -> Result<FriendEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        // claiming the request with a write takes the lock before anything is read
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "DELETE FROM friend_request WHERE id = ?1 RETURNING *",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(request) = request else {
            tx.rollback().await?;
            return Err(error::SystemError::not_found("Friend request not found"));
        };

        if request.receiver_id != user_id {
            tx.rollback().await?;
            return Err(error::SystemError::forbidden(
                "You are not allowed to accept this friend request",
            ));
        }

        let existing = sqlx::query_as::<_, FriendEntity>(SELECT_FRIENDSHIP_EITHER_ORDER)
            .bind(request.sender_id)
            .bind(request.receiver_id)
            .fetch_optional(&mut *tx)
            .await?;

        let friendship = match existing {
            Some(friendship) => friendship,
            None => {
                sqlx::query_as::<_, FriendEntity>(INSERT_FRIEND)
                    .bind(request.sender_id)
                    .bind(request.receiver_id)
                    .bind(chrono::Utc::now())
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;

        Ok(friendship)
    }
}
