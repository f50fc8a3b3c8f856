/// Session lifecycle tests: login overwrite, single-use refresh rotation,
/// idempotent logout.
use crate::error::AppError;
use crate::tests::fixtures::*;

#[tokio::test]
async fn login_stores_the_issued_refresh_token() {
    // GIVEN: A registered account
    let (sessions, store, account_id) = session_with_account("chai@example.com");

    // WHEN: The account logs in
    let (_, pair) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("login should succeed");

    // THEN: The stored slot equals the just-issued refresh token
    assert_eq!(store.stored_refresh_token(account_id), Some(pair.refresh_token));
}

#[tokio::test]
async fn second_login_invalidates_the_first_refresh_token() {
    // GIVEN: An account logged in from one client
    let (sessions, store, account_id) = session_with_account("chai@example.com");
    let (_, first) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("first login");

    // WHEN: The account logs in again from another client
    let (_, second) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("second login");

    // THEN: The slot holds the second token and the first can no longer refresh
    assert_eq!(
        store.stored_refresh_token(account_id),
        Some(second.refresh_token)
    );
    let result = sessions.refresh(Some(&first.refresh_token)).await;
    assert!(matches!(result, Err(AppError::StaleToken)));
}

#[tokio::test]
async fn refresh_is_single_use() {
    let (sessions, _, _) = session_with_account("chai@example.com");
    let (_, pair) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("login");

    // First use rotates and succeeds
    sessions
        .refresh(Some(&pair.refresh_token))
        .await
        .expect("first refresh should succeed");

    // Replaying the same token loses against the rotated slot
    let replay = sessions.refresh(Some(&pair.refresh_token)).await;
    assert!(matches!(replay, Err(AppError::StaleToken)));
}

#[tokio::test]
async fn refresh_returns_a_usable_new_pair() {
    let (sessions, store, account_id) = session_with_account("chai@example.com");
    let (_, pair) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("login");

    let (refreshed_id, rotated) = sessions
        .refresh(Some(&pair.refresh_token))
        .await
        .expect("refresh should succeed");

    assert_eq!(refreshed_id, account_id);
    assert_ne!(rotated.refresh_token, pair.refresh_token);
    assert_eq!(
        store.stored_refresh_token(account_id),
        Some(rotated.refresh_token.clone())
    );

    // The rotated refresh token works exactly once more
    sessions
        .refresh(Some(&rotated.refresh_token))
        .await
        .expect("rotated token should refresh");
    let replay = sessions.refresh(Some(&rotated.refresh_token)).await;
    assert!(matches!(replay, Err(AppError::StaleToken)));
}

#[tokio::test]
async fn refresh_without_a_token_is_missing_token() {
    let (sessions, _, _) = session_with_account("chai@example.com");

    assert!(matches!(
        sessions.refresh(None).await,
        Err(AppError::MissingToken)
    ));
    assert!(matches!(
        sessions.refresh(Some("")).await,
        Err(AppError::MissingToken)
    ));
}

#[tokio::test]
async fn refresh_with_a_garbage_token_is_invalid_token() {
    let (sessions, _, _) = session_with_account("chai@example.com");

    let result = sessions.refresh(Some("not-a-token")).await;
    assert!(matches!(result, Err(AppError::InvalidToken)));
}

#[tokio::test]
async fn refresh_after_logout_is_stale() {
    let (sessions, _, account_id) = session_with_account("chai@example.com");
    let (_, pair) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("login");

    sessions.logout(account_id).await.expect("logout");

    // The token still verifies structurally but the slot is empty
    let result = sessions.refresh(Some(&pair.refresh_token)).await;
    assert!(matches!(result, Err(AppError::StaleToken)));
}

#[tokio::test]
async fn logout_is_idempotent() {
    let (sessions, store, account_id) = session_with_account("chai@example.com");
    sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("login");

    sessions.logout(account_id).await.expect("first logout");
    assert_eq!(store.stored_refresh_token(account_id), None);

    sessions.logout(account_id).await.expect("second logout");
    assert_eq!(store.stored_refresh_token(account_id), None);
}

#[tokio::test]
async fn login_with_unknown_identifier_is_not_found() {
    let (sessions, _, _) = session_with_account("chai@example.com");

    let result = sessions.login("nobody@example.com", TEST_PASSWORD).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn login_with_wrong_password_is_invalid_credentials() {
    let (sessions, store, account_id) = session_with_account("chai@example.com");

    let result = sessions.login("chai@example.com", "WrongPassw0rd").await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));

    // A failed login must not touch the refresh slot
    assert_eq!(store.stored_refresh_token(account_id), None);
}

#[tokio::test]
async fn verify_access_accepts_fresh_tokens_and_rejects_refresh_tokens() {
    let (sessions, _, account_id) = session_with_account("chai@example.com");
    let (_, pair) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("login");

    let verified = sessions
        .verify_access(&pair.access_token)
        .expect("access token should verify");
    assert_eq!(verified, account_id);

    // A refresh token is never a valid access credential
    assert!(sessions.verify_access(&pair.refresh_token).is_err());
}

#[tokio::test]
async fn interleaved_logins_and_refreshes_keep_one_active_token() {
    // Account logs in from two clients; only the latest credential survives
    let (sessions, _, _) = session_with_account("chai@example.com");

    let (_, t1) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("first login");
    let (_, t2) = sessions
        .login("chai@example.com", TEST_PASSWORD)
        .await
        .expect("second login");

    // The first client lost its session
    assert!(matches!(
        sessions.refresh(Some(&t1.refresh_token)).await,
        Err(AppError::StaleToken)
    ));

    // The second client rotates normally, then its old token dies too
    let (_, t3) = sessions
        .refresh(Some(&t2.refresh_token))
        .await
        .expect("refresh with the live token");
    assert!(matches!(
        sessions.refresh(Some(&t2.refresh_token)).await,
        Err(AppError::StaleToken)
    ));

    // And the rotated token is the one that now works
    sessions
        .refresh(Some(&t3.refresh_token))
        .await
        .expect("latest token should refresh");
}
