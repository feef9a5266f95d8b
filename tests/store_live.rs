//! Integration tests against a live MongoDB. Ignored by default; run with
//! `cargo test -- --ignored` after pointing MONGODB_URI at a test instance.

use std::time::{SystemTime, UNIX_EPOCH};

use todo_hub::{Config, Storage, TaskList};

async fn storage() -> anyhow::Result<Storage> {
    dotenvy::dotenv().ok();
    Ok(Storage::connect(&Config::from_env()).await?)
}

fn unique_username(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn create_then_exists() -> anyhow::Result<()> {
    let store = storage().await?;
    let user = unique_username("exists");

    assert!(!store.user_exists(&user).await?);
    assert!(store.create_user(&user, "secret").await?);
    assert!(store.user_exists(&user).await?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn duplicate_create_is_rejected_without_mutation() -> anyhow::Result<()> {
    let store = storage().await?;
    let user = unique_username("dup");

    assert!(store.create_user(&user, "first").await?);
    store.add_todo(&user, "buy milk").await?;

    // Second create must not touch the existing document.
    assert!(!store.create_user(&user, "second").await?);
    assert!(store.verify_user(&user, "first").await?);
    assert!(!store.verify_user(&user, "second").await?);
    let stats = store.get_user_stats(&user).await?;
    assert_eq!(stats.todo_count, 1);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn verify_checks_the_stored_hash() -> anyhow::Result<()> {
    let store = storage().await?;
    let user = unique_username("verify");

    assert!(store.create_user(&user, "correct horse").await?);
    assert!(store.verify_user(&user, "correct horse").await?);
    assert!(!store.verify_user(&user, "wrong horse").await?);
    assert!(!store.verify_user("no-such-user", "correct horse").await?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn task_ids_count_up_from_one() -> anyhow::Result<()> {
    let store = storage().await?;
    let user = unique_username("ids");
    store.create_user(&user, "pw").await?;

    let first = store.add_todo(&user, "buy milk").await?.unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(first.text, "buy milk");
    assert!(first.completed_at.is_none());

    let second = store.add_todo(&user, "walk dog").await?.unwrap();
    assert_eq!(second.id, 2);

    assert!(store.add_todo("no-such-user", "never stored").await?.is_none());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn complete_moves_task_and_stamps_it() -> anyhow::Result<()> {
    let store = storage().await?;
    let user = unique_username("complete");
    store.create_user(&user, "pw").await?;
    store.add_todo(&user, "buy milk").await?;

    assert!(store.complete_task(&user, 1).await?);

    let todos = store.get_user_todos(&user).await?;
    assert!(todos.iter().all(|t| t.id != 1));

    let completed = store.get_user_completed(&user).await?;
    let done = completed.iter().find(|t| t.id == 1).unwrap();
    assert_eq!(done.text, "buy milk");
    assert!(done.completed_at.is_some());

    let stats = store.get_user_stats(&user).await?;
    assert_eq!(stats.todo_count, 0);
    assert_eq!(stats.completed_count, 1);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn completing_unknown_id_changes_nothing() -> anyhow::Result<()> {
    let store = storage().await?;
    let user = unique_username("noop");
    store.create_user(&user, "pw").await?;
    store.add_todo(&user, "buy milk").await?;

    assert!(!store.complete_task(&user, 999).await?);
    assert!(!store.complete_task("no-such-user", 1).await?);

    let stats = store.get_user_stats(&user).await?;
    assert_eq!(stats.todo_count, 1);
    assert_eq!(stats.completed_count, 0);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn delete_reports_whether_anything_was_removed() -> anyhow::Result<()> {
    let store = storage().await?;
    let user = unique_username("delete");
    store.create_user(&user, "pw").await?;
    store.add_todo(&user, "buy milk").await?;
    store.complete_task(&user, 1).await?;

    assert!(store.delete_task(&user, 1, TaskList::Completed).await?);
    let completed = store.get_user_completed(&user).await?;
    assert!(completed.iter().all(|t| t.id != 1));

    // Nothing left to remove the second time.
    assert!(!store.delete_task(&user, 1, TaskList::Completed).await?);
    assert!(!store.delete_task(&user, 1, TaskList::Todos).await?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn counts_track_adds_and_deletes() -> anyhow::Result<()> {
    let store = storage().await?;
    let user = unique_username("counts");
    store.create_user(&user, "pw").await?;

    for text in ["one", "two", "three", "four"] {
        store.add_todo(&user, text).await?;
    }
    store.complete_task(&user, 2).await?;
    store.complete_task(&user, 4).await?;

    let mut deleted = 0;
    if store.delete_task(&user, 1, TaskList::Todos).await? {
        deleted += 1;
    }
    if store.delete_task(&user, 2, TaskList::Completed).await? {
        deleted += 1;
    }
    // Already gone from todos; must not count.
    if store.delete_task(&user, 2, TaskList::Todos).await? {
        deleted += 1;
    }

    let stats = store.get_user_stats(&user).await?;
    assert_eq!(deleted, 2);
    assert_eq!(stats.todo_count + stats.completed_count, 4 - deleted);
    assert_eq!(stats.todo_count, 1);
    assert_eq!(stats.completed_count, 1);
    Ok(())
}
