use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::future::join_all;

use super::Harness;
use crate::{
    api::error::SystemError,
    modules::user::model::{NewUser, UpdateUser, UserResponse},
};

#[tokio::test]
async fn create_user_persists_all_fields() {
    let h = Harness::new().await;
    let dob = NaiveDate::from_ymd_opt(1990, 4, 2).unwrap();

    let alice = h
        .users
        .create_user(NewUser::new("alice", "alice@Example.COM", "Alice Liddell").born_on(dob))
        .await
        .unwrap();

    assert!(alice.id > 0);
    assert_eq!(alice.username, "alice");
    assert_eq!(alice.email, "alice@example.com");
    assert_eq!(alice.name, "Alice Liddell");
    assert_eq!(alice.date_of_birth, Some(dob));

    let fetched = h.users.get_user(alice.id).await.unwrap();
    assert_eq!(fetched, alice);
}

#[tokio::test]
async fn duplicate_email_is_a_uniqueness_violation() {
    let h = Harness::new().await;
    h.users.create_user(NewUser::new("alice", "a@x.com", "Alice")).await.unwrap();

    let err = h.users.create_user(NewUser::new("alice2", "a@x.com", "Alice")).await.unwrap_err();

    assert!(matches!(err, SystemError::UniquenessViolation(_)), "{err:?}");
    assert_eq!(err.to_string(), "Uniqueness Violation: Email already exists");
}

#[tokio::test]
async fn email_domain_case_does_not_bypass_uniqueness() {
    let h = Harness::new().await;
    h.users.create_user(NewUser::new("alice", "a@x.com", "Alice")).await.unwrap();

    let err = h.users.create_user(NewUser::new("other", "a@X.COM", "Other")).await.unwrap_err();

    assert!(matches!(err, SystemError::UniquenessViolation(_)));
}

#[tokio::test]
async fn duplicate_username_is_a_uniqueness_violation() {
    let h = Harness::new().await;
    h.users.create_user(NewUser::new("alice", "a@x.com", "Alice")).await.unwrap();

    let err = h.users.create_user(NewUser::new("alice", "b@x.com", "Alice")).await.unwrap_err();

    assert!(matches!(err, SystemError::UniquenessViolation(_)));
    assert_eq!(err.to_string(), "Uniqueness Violation: Username already exists");
}

#[tokio::test]
async fn concurrent_duplicate_emails_admit_exactly_one() {
    let h = Arc::new(Harness::new().await);

    let attempts = (0..8).map(|i| {
        let h = h.clone();
        async move {
            h.users.create_user(NewUser::new(format!("user{i}"), "same@x.com", "Same")).await
        }
    });
    let results = join_all(attempts).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, SystemError::UniquenessViolation(_))));
}

#[tokio::test]
async fn invalid_input_is_rejected_before_storage() {
    let h = Harness::new().await;

    let bad_email = h.users.create_user(NewUser::new("alice", "not-an-email", "Alice")).await;
    assert!(matches!(bad_email, Err(SystemError::BadRequest(_))));

    // emails are stored as given, never trimmed into validity
    let padded = h.users.create_user(NewUser::new("alice", " a@x.com", "Alice")).await;
    assert!(matches!(padded, Err(SystemError::BadRequest(_))));

    let long_name = "n".repeat(256);
    let bad_name = h.users.create_user(NewUser::new("alice", "a@x.com", long_name)).await;
    assert!(matches!(bad_name, Err(SystemError::BadRequest(_))));

    let bad_username = h.users.create_user(NewUser::new("alice smith", "a@x.com", "Alice")).await;
    assert!(matches!(bad_username, Err(SystemError::BadRequest(_))));

    let max_name = "n".repeat(255);
    assert!(h.users.create_user(NewUser::new("alice", "a@x.com", max_name)).await.is_ok());
}

#[tokio::test]
async fn lookup_by_username() {
    let h = Harness::new().await;
    let bob = h.user("bob").await;

    let found = h.users.get_user_by_username("bob").await.unwrap();
    assert_eq!(found.id, bob.id);

    let profile = h.users.get_public_profile("bob").await.unwrap();
    assert_eq!(profile, UserResponse { id: bob.id, username: "bob".into(), name: "bob".into() });

    let missing = h.users.get_user_by_username("nobody").await;
    assert!(matches!(missing, Err(SystemError::NotFound(_))));
}

#[tokio::test]
async fn update_user_changes_only_given_fields() {
    let h = Harness::new().await;
    let dob = NaiveDate::from_ymd_opt(2001, 12, 31).unwrap();
    let alice = h
        .users
        .create_user(NewUser::new("alice", "a@x.com", "Alice").born_on(dob))
        .await
        .unwrap();

    let update = UpdateUser { name: Some("Alice L.".into()), ..Default::default() };
    let updated = h.users.update_user(alice.id, update).await.unwrap();
    assert_eq!(updated.name, "Alice L.");
    assert_eq!(updated.email, "a@x.com");
    assert_eq!(updated.date_of_birth, Some(dob));

    let clear = UpdateUser { date_of_birth: Some(None), ..Default::default() };
    let cleared = h.users.update_user(alice.id, clear).await.unwrap();
    assert_eq!(cleared.date_of_birth, None);
    assert_eq!(cleared.name, "Alice L.");
}

#[tokio::test]
async fn update_user_respects_uniqueness_and_rejects_empty_updates() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    h.user("bob").await;

    let steal = UpdateUser { email: Some("bob@x.com".into()), ..Default::default() };
    let err = h.users.update_user(alice.id, steal).await.unwrap_err();
    assert!(matches!(err, SystemError::UniquenessViolation(_)));

    let empty = h.users.update_user(alice.id, UpdateUser::default()).await;
    assert!(matches!(empty, Err(SystemError::BadRequest(_))));

    let rename = UpdateUser { name: Some("Ghost".into()), ..Default::default() };
    let missing = h.users.update_user(9999, rename).await;
    assert!(matches!(missing, Err(SystemError::NotFound(_))));
}

#[test]
fn update_user_distinguishes_absent_and_null_birth_date() {
    let absent: UpdateUser = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
    assert_eq!(absent.date_of_birth, None);

    let null: UpdateUser = serde_json::from_str(r#"{"date_of_birth":null}"#).unwrap();
    assert_eq!(null.date_of_birth, Some(None));

    let set: UpdateUser = serde_json::from_str(r#"{"date_of_birth":"1999-01-02"}"#).unwrap();
    assert_eq!(set.date_of_birth, Some(NaiveDate::from_ymd_opt(1999, 1, 2)));
}

#[tokio::test]
async fn delete_missing_user_is_not_found() {
    let h = Harness::new().await;
    let result = h.users.delete_user(42).await;
    assert!(matches!(result, Err(SystemError::NotFound(_))));
}
