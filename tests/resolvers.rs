#![cfg(feature = "inmem-store")]

use convo::error::ApiError;
use convo::models::{NewThread, Tab};
use convo::repo::inmem::InMemRepo;
use convo::repo::{TabRepo, ThreadRepo, UserRepo};
use convo::resolve::{resolve_node, resolve_thread};
use convo::seed::seed_tabs;

async fn seeded() -> InMemRepo {
    let repo = InMemRepo::new();
    let tabs = vec![Tab { slug: "main".into(), name: "Main".into(), nodes: vec!["general".into(), "random".into()] }];
    seed_tabs(&repo, &tabs).await.unwrap();
    repo
}

#[tokio::test]
async fn known_slug_resolves_to_its_node() {
    let repo = seeded().await;
    let expected = repo.find_node("general").await.unwrap().unwrap();
    let node = resolve_node(&repo, Some("general")).await.unwrap();
    assert_eq!(node, expected);
    assert!(node.id > 0);
}

#[tokio::test]
async fn unknown_or_empty_slug_is_not_found() {
    let repo = seeded().await;
    // no zero-id placeholder node is ever produced
    assert!(matches!(resolve_node(&repo, Some("nope")).await, Err(ApiError::NotFound)));
    assert!(matches!(resolve_node(&repo, Some("")).await, Err(ApiError::NotFound)));
    assert!(matches!(resolve_node(&repo, None).await, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn bad_thread_ids_are_not_found() {
    let repo = seeded().await;
    for raw in ["0", "-3", "abc", "1.5", "", "99999999999999999999"] {
        assert!(
            matches!(resolve_thread(&repo, Some(raw)).await, Err(ApiError::NotFound)),
            "{raw:?} should not resolve"
        );
    }
    assert!(matches!(resolve_thread(&repo, None).await, Err(ApiError::NotFound)));
    // valid shape, no such row
    assert!(matches!(resolve_thread(&repo, Some("12345")).await, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn existing_thread_resolves_to_its_id() {
    let repo = seeded().await;
    let node = repo.find_node("random").await.unwrap().unwrap();
    let user = repo.create_user("bob", "hash").await.unwrap();
    let id = repo
        .create_thread(NewThread { node_id: node.id, title: "t".into(), user_id: user.id, content: "c".into() })
        .await
        .unwrap();
    let thread = resolve_thread(&repo, Some(&id.to_string())).await.unwrap();
    assert_eq!(thread.id, id);
}
