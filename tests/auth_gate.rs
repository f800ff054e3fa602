#![cfg(feature = "inmem-store")]

use convo::auth::{authenticate, AuthUser, TokenService};
use convo::error::ApiError;
use convo::repo::inmem::InMemRepo;
use convo::repo::UserRepo;

fn tokens() -> TokenService {
    TokenService::new(b"test-secret-must-be-32-bytes-long!!")
}

fn is_invalid(r: &Result<AuthUser, ApiError>, msg: &str) -> bool {
    matches!(r, Err(ApiError::InvalidRequest(m)) if m.contains(msg))
}

#[tokio::test]
async fn missing_or_empty_token_rejected() {
    let repo = InMemRepo::new();
    let svc = tokens();
    assert!(is_invalid(&authenticate(&svc, &repo, None).await, "bad authorization header"));
    assert!(is_invalid(&authenticate(&svc, &repo, Some("")).await, "bad authorization header"));
}

#[tokio::test]
async fn garbage_token_rejected() {
    let repo = InMemRepo::new();
    let r = authenticate(&tokens(), &repo, Some("garbage")).await;
    assert!(is_invalid(&r, "malformed token"));
}

#[tokio::test]
async fn token_for_unknown_user_rejected() {
    let repo = InMemRepo::new();
    let svc = tokens();
    let token = svc.issue(999).unwrap();
    let r = authenticate(&svc, &repo, Some(&token)).await;
    assert!(is_invalid(&r, "no such user"));
}

#[tokio::test]
async fn identity_comes_from_the_store_not_the_token() {
    let repo = InMemRepo::new();
    let svc = tokens();
    let alice = repo.create_user("alice", "hash").await.unwrap();
    let token = svc.issue(alice.id).unwrap();

    let user = authenticate(&svc, &repo, Some(&token)).await.unwrap();
    assert_eq!(user, AuthUser { id: alice.id, username: "alice".into() });

    repo.rename_user(alice.id, "alicia").unwrap();
    let user = authenticate(&svc, &repo, Some(&token)).await.unwrap();
    assert_eq!(user.username, "alicia");

    // deleting the row locks the token out
    assert!(repo.remove_user(alice.id).unwrap());
    let r = authenticate(&svc, &repo, Some(&token)).await;
    assert!(is_invalid(&r, "no such user"));
}
