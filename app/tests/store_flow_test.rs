//! Store-level flows: auth lifecycle and catalog fetching.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

mod common;

use boxoffice::app::AppAction;
use boxoffice::gateway::TicketingGateway;
use boxoffice::slices::{AuthAction, EventsAction};
use boxoffice::types::UserRole;
use common::{sample_user, store, upcoming_event};
use std::time::Duration;

const FLOW_TIMEOUT: Duration = Duration::from_secs(2);

fn auth_finished(action: &AppAction) -> bool {
    matches!(
        action,
        AppAction::Auth(
            AuthAction::LoggedIn(_)
                | AuthAction::SessionLoaded(_)
                | AuthAction::AuthFailed(_)
                | AuthAction::SessionFailed(_)
        )
    )
}

#[tokio::test]
async fn login_loads_the_profile() {
    let (store, gateway) = store();
    gateway.seed_user(sample_user(), "secret");

    let outcome = store
        .send_and_wait_for(
            AppAction::Auth(AuthAction::Login {
                email: "alex@example.test".to_string(),
                password: "secret".to_string(),
            }),
            auth_finished,
            FLOW_TIMEOUT,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AppAction::Auth(AuthAction::LoggedIn(_))
    ));

    let (authenticated, name) = store
        .state(|s| {
            (
                s.auth.is_authenticated,
                s.auth.user.as_ref().map(|u| u.name.clone()),
            )
        })
        .await;
    assert!(authenticated);
    assert_eq!(name.as_deref(), Some("Alex"));
}

#[tokio::test]
async fn bad_credentials_surface_an_error() {
    let (store, gateway) = store();
    gateway.seed_user(sample_user(), "secret");

    let outcome = store
        .send_and_wait_for(
            AppAction::Auth(AuthAction::Login {
                email: "alex@example.test".to_string(),
                password: "wrong".to_string(),
            }),
            auth_finished,
            FLOW_TIMEOUT,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AppAction::Auth(AuthAction::AuthFailed(_))
    ));
    let (authenticated, error) = store
        .state(|s| (s.auth.is_authenticated, s.auth.error.clone()))
        .await;
    assert!(!authenticated);
    assert!(error.is_some());
}

#[tokio::test]
async fn registration_creates_a_profile_and_signs_in() {
    let (store, gateway) = store();

    let outcome = store
        .send_and_wait_for(
            AppAction::Auth(AuthAction::Register {
                email: "new@example.test".to_string(),
                password: "secret".to_string(),
                name: "Nur".to_string(),
                user_type: UserRole::Organizer,
            }),
            auth_finished,
            FLOW_TIMEOUT,
        )
        .await
        .unwrap();

    let AppAction::Auth(AuthAction::LoggedIn(user)) = outcome else {
        panic!("expected login after registration, got {outcome:?}");
    };
    assert_eq!(user.name, "Nur");
    assert_eq!(user.user_type, UserRole::Organizer);

    // Gateway holds the profile and an open session
    assert!(gateway.current_user().await.unwrap().is_some());
}

#[tokio::test]
async fn absent_session_restores_to_signed_out() {
    let (store, _gateway) = store();

    let outcome = store
        .send_and_wait_for(
            AppAction::Auth(AuthAction::LoadSession),
            auth_finished,
            FLOW_TIMEOUT,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AppAction::Auth(AuthAction::SessionLoaded(None))
    ));
    let (authenticated, error) = store
        .state(|s| (s.auth.is_authenticated, s.auth.error.clone()))
        .await;
    assert!(!authenticated);
    assert!(error.is_none());
}

#[tokio::test]
async fn held_session_restores_the_profile() {
    let (store, gateway) = store();
    let user = sample_user();
    gateway.seed_user(user.clone(), "secret");
    gateway.open_session(user.id);

    let outcome = store
        .send_and_wait_for(
            AppAction::Auth(AuthAction::LoadSession),
            auth_finished,
            FLOW_TIMEOUT,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AppAction::Auth(AuthAction::SessionLoaded(Some(_)))
    ));
    assert!(store.state(|s| s.auth.is_authenticated).await);
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (store, gateway) = store();
    let user = sample_user();
    gateway.seed_user(user.clone(), "secret");
    gateway.open_session(user.id);

    let mut handle = store.send(AppAction::Auth(AuthAction::Logout)).await.unwrap();
    handle.wait().await;

    assert!(!store.state(|s| s.auth.is_authenticated).await);
    assert!(gateway.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn refetching_the_catalog_is_idempotent() {
    let (store, gateway) = store();
    gateway.seed_events(vec![upcoming_event(1), upcoming_event(2)]);

    for _ in 0..2 {
        let mut handle = store
            .send(AppAction::Events(EventsAction::FetchEvents))
            .await
            .unwrap();
        handle.wait().await;
    }

    let (count, loading, error) = store
        .state(|s| {
            (
                s.events.events.len(),
                s.events.loading,
                s.events.error.clone(),
            )
        })
        .await;
    assert_eq!(count, 2);
    assert!(!loading);
    assert!(error.is_none());
}

#[tokio::test]
async fn failed_fetch_surfaces_the_error_and_keeps_the_snapshot() {
    let (store, gateway) = store();
    gateway.seed_events(vec![upcoming_event(1)]);

    let mut handle = store
        .send(AppAction::Events(EventsAction::FetchEvents))
        .await
        .unwrap();
    handle.wait().await;

    gateway.fail_on("fetch_events");
    let mut handle = store
        .send(AppAction::Events(EventsAction::FetchEvents))
        .await
        .unwrap();
    handle.wait().await;

    let (count, error) = store
        .state(|s| (s.events.events.len(), s.events.error.clone()))
        .await;
    assert_eq!(count, 1);
    assert!(error.unwrap().contains("injected failure"));
}
