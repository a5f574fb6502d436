use log::info;
use std::sync::Arc;
use validator::Validate;

use crate::api::error;
use crate::modules::user::model::{NewUser, UpdateUser, UserResponse};
use crate::modules::user::{repository::UserRepository, schema::UserEntity};
use crate::utils::normalize_email;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn with_dependencies(repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo }
    }

    pub async fn create_user(&self, user: NewUser) -> Result<UserEntity, error::SystemError> {
        user.validate()?;

        let user = NewUser { email: normalize_email(&user.email), ..user };
        let created = self.repo.create(&user).await?;
        info!("User {} created with id {}", created.username, created.id);
        Ok(created)
    }

    pub async fn get_user(&self, id: i64) -> Result<UserEntity, error::SystemError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<UserEntity, error::SystemError> {
        self.repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn get_public_profile(
        &self,
        username: &str,
    ) -> Result<UserResponse, error::SystemError> {
        self.get_user_by_username(username).await.map(UserResponse::from)
    }

    pub async fn update_user(
        &self,
        id: i64,
        user: UpdateUser,
    ) -> Result<UserEntity, error::SystemError> {
        if user.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }
        user.validate()?;

        let user = UpdateUser { email: user.email.as_deref().map(normalize_email), ..user };
        let updated = self.repo.update(id, &user).await?;
        info!("User {} updated", id);
        Ok(updated)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), error::SystemError> {
        if !self.repo.delete(id).await? {
            return Err(error::SystemError::not_found("User not found"));
        }
        info!("User {} deleted", id);
        Ok(())
    }
}
