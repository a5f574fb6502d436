use std::sync::Arc;

use crate::{
    configs::{connect_in_memory, run_migrations},
    modules::{
        friend::{
            model::FriendConstraints, repository_sqlite::FriendRepositorySqlite,
            service::FriendService,
        },
        user::{
            model::NewUser, repository_sqlite::UserRepositorySqlite, schema::UserEntity,
            service::UserService,
        },
    },
};

mod user;

pub(crate) type FriendSvc = FriendService<FriendRepositorySqlite, UserRepositorySqlite>;

pub(crate) struct Harness {
    pub pool: sqlx::SqlitePool,
    pub users: UserService,
    pub friends: FriendSvc,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_constraints(FriendConstraints::default()).await
    }

    pub async fn with_constraints(constraints: FriendConstraints) -> Self {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let user_repo = UserRepositorySqlite::new(pool.clone());
        let friend_repo = FriendRepositorySqlite::new(pool.clone(), constraints);

        let users = UserService::with_dependencies(Arc::new(user_repo.clone()));
        let friends = FriendService::with_dependencies(Arc::new(friend_repo), Arc::new(user_repo));

        Harness { pool, users, friends }
    }

    pub async fn user(&self, username: &str) -> UserEntity {
        self.users
            .create_user(NewUser::new(username, format!("{username}@x.com"), username))
            .await
            .unwrap()
    }

    pub async fn count(&self, sql: &str, id: i64) -> i64 {
        sqlx::query_scalar::<_, i64>(sql).bind(id).fetch_one(&self.pool).await.unwrap()
    }
}
