//! Facade contract tests over the in-process store.
//!
//! These exercise the per-entity contract the route layer relies on:
//! create/get round trips with defaults, partial patches, typed
//! not-found and conflict errors, and the degraded-mode seed.

use halcyon_integration_tests::TestContext;

use halcyon_core::{MeditationId, Role};
use halcyon_server::models::catalog::{Meditation, NewMeditation};
use halcyon_server::models::user::{NewUser, User};
use halcyon_server::services::auth;
use halcyon_server::store::backend::Filter;
use halcyon_server::store::{
    DEGRADED_ADMIN_EMAIL, DEGRADED_ADMIN_PASSWORD, Store, StoreError, StoreMode,
};
use serde_json::json;

fn new_meditation(title: &str) -> NewMeditation {
    serde_json::from_value(json!({
        "title": title,
        "duration_minutes": 15.0,
        "level": "beginner",
    }))
    .expect("valid meditation payload")
}

fn new_user(email: &str) -> User {
    User::from_new(
        NewUser {
            id: None,
            name: "Rowan Petty".to_string(),
            email: email.to_string(),
            role: None,
            profile: None,
        },
        "hash".to_string(),
    )
    .expect("valid user")
}

#[tokio::test]
async fn create_then_get_round_trips_with_defaults() {
    let ctx = TestContext::new();

    let created = ctx
        .store
        .meditations()
        .create(Meditation::from_new(new_meditation("Morning Calm")))
        .await
        .expect("create meditation");

    let fetched = ctx
        .store
        .meditations()
        .get(created.id)
        .await
        .expect("get meditation");

    assert_eq!(fetched.title, "Morning Calm");
    assert!((fetched.duration_minutes - 15.0).abs() < f64::EPSILON);
    assert_eq!(fetched.level.as_deref(), Some("beginner"));
    // Defaults applied for omitted optional fields
    assert_eq!(fetched.status, "Draft");
    assert!(fetched.audio_url.is_none());
    assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn create_keeps_caller_supplied_id() {
    let ctx = TestContext::new();
    let id = MeditationId::generate();

    let mut new = new_meditation("With Id");
    new.id = Some(id);
    let created = ctx
        .store
        .meditations()
        .create(Meditation::from_new(new))
        .await
        .expect("create meditation");

    assert_eq!(created.id, id);
}

#[tokio::test]
async fn get_update_delete_on_missing_id_yield_not_found() {
    let ctx = TestContext::new();
    let missing = MeditationId::generate();

    assert!(matches!(
        ctx.store.meditations().get(missing).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        ctx.store
            .meditations()
            .update(missing, json!({"title": "x"}))
            .await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        ctx.store.meditations().delete(missing).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn delete_distinguishes_deleted_from_already_gone() {
    let ctx = TestContext::new();

    let created = ctx
        .store
        .meditations()
        .create(Meditation::from_new(new_meditation("Ephemeral")))
        .await
        .expect("create meditation");

    assert!(ctx.store.meditations().delete(created.id).await.is_ok());
    assert!(matches!(
        ctx.store.meditations().delete(created.id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn patch_changes_only_supplied_fields() {
    let ctx = TestContext::new();

    let created = ctx
        .store
        .meditations()
        .create(Meditation::from_new(new_meditation("Before")))
        .await
        .expect("create meditation");

    let patched = ctx
        .store
        .meditations()
        .update(created.id, json!({"status": "Active"}))
        .await
        .expect("patch meditation");

    assert_eq!(patched.status, "Active");
    assert_eq!(patched.title, "Before");
    assert_eq!(patched.created_at, created.created_at);
    assert!(patched.updated_at >= created.updated_at);
}

#[tokio::test]
async fn patch_with_wrong_type_is_a_validation_error() {
    let ctx = TestContext::new();

    let created = ctx
        .store
        .meditations()
        .create(Meditation::from_new(new_meditation("Typed")))
        .await
        .expect("create meditation");

    let result = ctx
        .store
        .meditations()
        .update(created.id, json!({"duration_minutes": "not a number"}))
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let result = ctx
        .store
        .meditations()
        .update(created.id, json!("not an object"))
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn list_returns_empty_not_error_and_newest_first() {
    let ctx = TestContext::new();

    let empty = ctx
        .store
        .meditations()
        .list(Filter::new())
        .await
        .expect("empty list");
    assert!(empty.is_empty());

    for title in ["first", "second", "third"] {
        ctx.store
            .meditations()
            .create(Meditation::from_new(new_meditation(title)))
            .await
            .expect("create meditation");
    }

    let listed = ctx
        .store
        .meditations()
        .list(Filter::new())
        .await
        .expect("list meditations");
    let titles: Vec<&str> = listed.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict_and_lookup_is_case_insensitive() {
    let ctx = TestContext::new();

    ctx.store
        .users()
        .create(new_user("rowan@example.com"))
        .await
        .expect("create user");

    // Same address in different case normalizes to the same unique key
    let duplicate = ctx.store.users().create(new_user("Rowan@Example.COM")).await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn user_views_never_carry_the_password_hash() {
    let ctx = TestContext::new();

    let created = ctx
        .store
        .users()
        .create(new_user("quiet@example.com"))
        .await
        .expect("create user");

    let view = serde_json::to_value(created.into_view()).expect("serialize view");
    assert!(view.get("password_hash").is_none());
    assert_eq!(view["email"], "quiet@example.com");
}

#[tokio::test]
async fn degraded_store_is_seeded_with_a_working_admin() {
    let store = Store::degraded().await;
    assert_eq!(store.mode(), StoreMode::Degraded);

    let admins = store
        .users()
        .list(Filter::new().eq("role", Role::Admin))
        .await
        .expect("list admins");
    assert_eq!(admins.len(), 1);

    let admin = admins.first().expect("seeded admin");
    assert_eq!(admin.email.as_str(), DEGRADED_ADMIN_EMAIL);
    assert!(auth::verify_password(DEGRADED_ADMIN_PASSWORD, &admin.password_hash).is_ok());
}
