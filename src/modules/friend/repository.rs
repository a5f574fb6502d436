use crate::api::error;
use crate::modules::friend::model::{FriendConstraints, FriendRequestResponse, FriendResponse};
use crate::modules::friend::schema::{FriendEntity, FriendRequestEntity};

#[async_trait::async_trait]
pub trait FriendRepository {
    /// Looks up a friendship between two users in either order.
    async fn find_friendship(
        &self,
        user_id_a: i64,
        user_id_b: i64,
    ) -> Result<Option<FriendEntity>, error::SystemError>;

    async fn find_friends(&self, user_id: i64) -> Result<Vec<FriendResponse>, error::SystemError>;

    async fn create_friendship(
        &self,
        first_user_id: i64,
        second_user_id: i64,
    ) -> Result<FriendEntity, error::SystemError>;

    /// Deletes the friendship in both orders, returning the number of rows removed.
    async fn delete_friendship(
        &self,
        user_id_a: i64,
        user_id_b: i64,
    ) -> Result<u64, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    async fn find_friend_request_by_id(
        &self,
        request_id: i64,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_friend_request_from_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;

    async fn find_friend_request_to_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;

    async fn create_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    /// Like `create_friend_request`, but the insert itself refuses users who
    /// are already friends in either order.
    async fn create_friend_request_unless_friends(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn delete_friend_request(&self, request_id: i64) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRepo: FriendRepository + FriendRequestRepository + Send + Sync {
    fn constraints(&self) -> FriendConstraints;

    /// Turns a pending request addressed to `user_id` into a friendship and
    /// removes the request, in one transaction.
    async fn accept_friend_request_atomic(
        &self,
        request_id: i64,
        user_id: i64,
    ) -> Result<FriendEntity, error::SystemError>;
}
