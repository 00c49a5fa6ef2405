//! Tests for the persisted session and instance selection
//!
//! These tests verify the state that survives a restart:
//! - Session and selection written to disk and read back
//! - Logout removes the state file
//! - Unreadable files degrade to a logged-out store
//! - The instance guard across hydration

use assert_matches::assert_matches;
use instance_deck::guard::{GuardState, InstanceGuard};
use instance_deck::store::{FilePersistence, StatePersistence};
use instance_deck::{AuthSession, Store};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::helpers::*;

fn state_file(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("nested").join("state.json")
}

#[tokio::test]
async fn test_session_and_selection_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = state_file(&dir);

    let mut store = Store::with_file(&path);
    store.hydrate().await.unwrap();
    store
        .login(AuthSession {
            token: TOKEN.to_string(),
            user: test_user(),
        })
        .await
        .unwrap();
    store
        .select_instance(&test_instance("i-1", "shop"))
        .await
        .unwrap();

    // A new process reads the same file
    let mut restarted = Store::with_file(&path);
    assert!(!restarted.is_hydrated());
    restarted.hydrate().await.unwrap();

    assert_eq!(restarted.token(), Some(TOKEN));
    assert_eq!(restarted.user(), Some(&test_user()));
    assert_eq!(
        restarted.selected_instance().map(|i| i.name.as_str()),
        Some("shop")
    );
    assert!(restarted.instances.is_empty(), "collections are not persisted");
}

#[tokio::test]
async fn test_logout_removes_state_file() {
    let dir = TempDir::new().unwrap();
    let path = state_file(&dir);

    let mut store = Store::with_file(&path);
    store.hydrate().await.unwrap();
    store
        .login(AuthSession {
            token: TOKEN.to_string(),
            user: test_user(),
        })
        .await
        .unwrap();
    assert!(path.exists());

    store.logout().await.unwrap();

    assert!(!path.exists());
    assert!(!store.is_authenticated());
    assert!(store.selected_instance().is_none());

    // Logging out twice is fine
    store.logout().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_state_file_reads_as_logged_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();

    let persistence = FilePersistence::new(&path);
    assert_eq!(persistence.load().await.unwrap(), None);

    let mut store = Store::with_file(&path);
    store.hydrate().await.unwrap();
    assert!(store.is_hydrated());
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_deleting_selected_instance_clears_selection_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = state_file(&dir);

    let mut store = Store::with_file(&path);
    store.hydrate().await.unwrap();
    store
        .set_instances(vec![test_instance("i-1", "shop"), test_instance("i-2", "blog")])
        .await
        .unwrap();
    store
        .select_instance(&test_instance("i-1", "shop"))
        .await
        .unwrap();

    store.instance_deleted("i-1").await.unwrap();
    assert_eq!(store.instances.len(), 1);

    let mut restarted = Store::with_file(&path);
    restarted.hydrate().await.unwrap();
    assert!(restarted.selected_instance().is_none());
}

#[tokio::test]
async fn test_guard_redirects_once_after_hydration() {
    let dir = TempDir::new().unwrap();
    let mut store = Store::with_file(state_file(&dir));
    let mut guard = InstanceGuard::new("/instances");

    assert_matches!(guard.check(&store), GuardState::Loading);

    store.hydrate().await.unwrap();

    assert_matches!(guard.check(&store), GuardState::Redirect("/instances"));
    assert_matches!(guard.check(&store), GuardState::Redirected);
    assert!(guard.has_redirected());

    // A fresh mount gets a fresh guard
    store
        .select_instance(&test_instance("i-2", "blog"))
        .await
        .unwrap();
    let mut remounted = InstanceGuard::new("/instances");
    assert_matches!(
        remounted.check(&store),
        GuardState::Render(instance) if instance.id == "i-2"
    );
}
