use std::sync::Arc;

use log::{debug, info};

use crate::{
    api::error,
    modules::{
        friend::{
            model::{FriendRequestResponse, FriendResponse},
            repository::FriendRepo,
            schema::{FriendEntity, FriendRequestEntity},
        },
        user::repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct FriendService<R, U>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
}

impl<R, U> FriendService<R, U>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(friend_repo: Arc<R>, user_repo: Arc<U>) -> Self {
        info!(
            "FriendService initialized with {} pair ordering",
            friend_repo.constraints().pair_ordering
        );
        FriendService { friend_repo, user_repo }
    }

    pub async fn are_friends(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<bool, error::SystemError> {
        let friendship = self.friend_repo.find_friendship(user_id, friend_id).await?;
        Ok(friendship.is_some())
    }

    pub async fn create_friendship(
        &self,
        first_user_id: i64,
        second_user_id: i64,
    ) -> Result<FriendEntity, error::SystemError> {
        let friendship = self.friend_repo.create_friendship(first_user_id, second_user_id).await?;
        info!(
            "Friendship {} created between {} and {}",
            friendship.id, first_user_id, second_user_id
        );
        Ok(friendship)
    }

    pub async fn create_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = self.friend_repo.create_friend_request(sender_id, receiver_id).await?;
        info!("Friend request {} created from {} to {}", request.id, sender_id, receiver_id);
        Ok(request)
    }

    /// Like [`Self::create_friend_request`], but refuses users who are already
    /// friends. The friendship check is part of the insert statement.
    pub async fn send_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request =
            self.friend_repo.create_friend_request_unless_friends(sender_id, receiver_id).await?;
        info!("Friend request {} sent from {} to {}", request.id, sender_id, receiver_id);
        Ok(request)
    }

    pub async fn accept_friend_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> Result<FriendEntity, error::SystemError> {
        let friendship = self.friend_repo.accept_friend_request_atomic(request_id, user_id).await?;
        info!("Friend request {} accepted, friendship {}", request_id, friendship.id);
        Ok(friendship)
    }

    pub async fn decline_friend_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> Result<(), error::SystemError> {
        let request = self.find_request(request_id).await?;

        if request.receiver_id != user_id {
            return Err(error::SystemError::forbidden(
                "You are not allowed to decline this friend request",
            ));
        }

        self.delete_request(request_id).await?;
        info!("Friend request {} declined", request_id);
        Ok(())
    }

    pub async fn cancel_friend_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> Result<(), error::SystemError> {
        let request = self.find_request(request_id).await?;

        if request.sender_id != user_id {
            return Err(error::SystemError::forbidden(
                "You are not allowed to cancel this friend request",
            ));
        }

        self.delete_request(request_id).await?;
        info!("Friend request {} cancelled", request_id);
        Ok(())
    }

    pub async fn list_friends(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        let friends = self.friend_repo.find_friends(user_id).await?;
        debug!("User {} has {} friends", user_id, friends.len());
        Ok(friends)
    }

    pub async fn list_friends_of_username(
        &self,
        username: &str,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        self.friend_repo.find_friends(user.id).await
    }

    /// Incoming requests first, then outgoing.
    pub async fn list_friend_requests(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        let (requests_to, requests_from) = tokio::try_join!(
            self.friend_repo.find_friend_request_to_user(user_id),
            self.friend_repo.find_friend_request_from_user(user_id),
        )?;

        let mut all = Vec::with_capacity(requests_to.len() + requests_from.len());
        all.extend(requests_to);
        all.extend(requests_from);
        Ok(all)
    }

    pub async fn remove_friendship(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<(), error::SystemError> {
        let removed = self.friend_repo.delete_friendship(user_id, friend_id).await?;
        if removed == 0 {
            return Err(error::SystemError::not_found("Friendship not found"));
        }
        info!("Friendship between {} and {} removed", user_id, friend_id);
        Ok(())
    }

    async fn find_request(
        &self,
        request_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.friend_repo
            .find_friend_request_by_id(request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))
    }

    async fn delete_request(&self, request_id: i64) -> Result<(), error::SystemError> {
        if !self.friend_repo.delete_friend_request(request_id).await? {
            return Err(error::SystemError::not_found("Friend request not found"));
        }
        Ok(())
    }
}
