use crate::{
    api::error,
    modules::user::{
        model::{NewUser, UpdateUser},
        schema::UserEntity,
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError>;
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;
    async fn create(&self, user: &NewUser) -> Result<UserEntity, error::SystemError>;
    async fn update(&self, id: i64, user: &UpdateUser) -> Result<UserEntity, error::SystemError>;

    /// Removes the user together with every friend and friend request row
    /// naming them, in one transaction. Returns `false` if no such user.
    async fn delete(&self, id: i64) -> Result<bool, error::SystemError>;
}
