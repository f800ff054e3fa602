#![cfg(feature = "inmem-store")]

use convo::auth::AuthUser;
use convo::content::create_thread;
use convo::error::ApiError;
use convo::models::{NewThreadRequest, Tab};
use convo::repo::inmem::InMemRepo;
use convo::repo::{TabRepo, ThreadRepo, UserRepo};
use convo::seed::seed_tabs;

#[tokio::test]
async fn author_removed_before_write_is_reported_neutrally() {
    let repo = InMemRepo::new();
    let tabs = vec![Tab { slug: "main".into(), name: "Main".into(), nodes: vec!["general".into()] }];
    seed_tabs(&repo, &tabs).await.unwrap();
    let node = repo.find_node("general").await.unwrap().unwrap();
    let user = repo.create_user("gone", "hash").await.unwrap();
    let author = AuthUser::from(user.clone());
    repo.remove_user(user.id).unwrap();

    let req = NewThreadRequest { node_id: node.id, title: "t".into(), content: "c".into() };
    let err = create_thread(&repo, &author, req).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(ref m) if m == "no such node or user"), "{err:?}");
    assert!(repo.list_threads(node.id).await.unwrap().is_empty());
}
