//! Shared fetch state store driving real discovery sequences

use crate::common::*;
use fedtester::client::{ClientServerDiscovery, FetchStatus, ProbeStore, SupportInfoDiscovery};
use fedtester::shared::{ErrorKind, ProbeStep};
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::{MockServer, ResponseTemplate};

fn store() -> ProbeStore<ClientServerDiscovery> {
    ProbeStore::new(ClientServerDiscovery::new(probe_client(), probe_config()))
}

#[tokio::test]
async fn test_rapid_requests_share_one_sequence() {
    // expect(1) on both endpoints is verified when the server drops
    let server = start_slow_homeserver(Duration::from_millis(300)).await;
    let target = server_name(&server);
    let store = store();

    let (first, second) = tokio::join!(store.request(&target), store.request(&target));

    assert_eq!(first, second);
    assert_eq!(first.status(), FetchStatus::Success);
    assert_eq!(store.state(), first);
}

#[tokio::test]
async fn test_completed_result_is_cached() {
    let server = start_healthy_homeserver().await;
    let target = server_name(&server);
    let store = store();

    let first = store.request(&target).await;
    let second = store.request(&target).await;

    assert_eq!(first, second);
    assert_eq!(requested_paths(&server).await.len(), 2);
}

#[tokio::test]
async fn test_refresh_runs_again() {
    let server = MockServer::start().await;
    mount_get(&server, WELL_KNOWN_CLIENT, json_response(well_known_body(&server.uri())), 2).await;
    mount_get(&server, CLIENT_VERSIONS, json_response(versions_body()), 2).await;
    let target = server_name(&server);
    let store = store();

    store.request(&target).await;
    let refreshed = store.refresh(&target).await;
    assert_eq!(refreshed.status(), FetchStatus::Success);
}

#[tokio::test]
async fn test_failed_result_is_cached_too() {
    let server = MockServer::start().await;
    mount_get(&server, WELL_KNOWN_CLIENT, ResponseTemplate::new(404), 1).await;
    let target = server_name(&server);
    let store = store();

    let first = store.request(&target).await;
    let second = store.request(&target).await;

    assert_eq!(first.status(), FetchStatus::Failed);
    crate::assert_step_failed!(second, ProbeStep::WellKnown, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_switching_target_supersedes() {
    let slow = start_slow_homeserver(Duration::from_millis(400)).await;
    let fast = start_healthy_homeserver().await;
    let (a, b) = (server_name(&slow), server_name(&fast));
    let store = store();
    let mut updates = store.subscribe();

    let first = {
        let store = store.clone();
        let a = a.clone();
        tokio::spawn(async move { store.request(&a).await })
    };
    while store.state().target.as_deref() != Some(a.as_str()) {
        tokio::task::yield_now().await;
    }

    let b_state = store.request(&b).await;
    assert_eq!(b_state.target.as_deref(), Some(b.as_str()));

    // The superseded sequence still completes for its own caller
    let a_state = first.await.unwrap();
    assert_eq!(a_state.target.as_deref(), Some(a.as_str()));
    assert_eq!(a_state.status(), FetchStatus::Success);

    let current = store.state();
    assert_eq!(current.target.as_deref(), Some(b.as_str()));
    assert_eq!(current.status(), FetchStatus::Success);

    let mut seen_b = false;
    while let Ok(snapshot) = updates.try_recv() {
        match snapshot.target.as_deref() {
            Some(target) if target == b => seen_b = true,
            Some(target) if target == a => {
                assert!(!seen_b, "published a result for {} after switching", a)
            }
            other => panic!("unexpected target {:?}", other),
        }
    }
    assert!(seen_b);
}

#[tokio::test]
async fn test_intermediate_state_published() {
    let server = start_healthy_homeserver().await;
    let store = store();
    let mut updates = store.subscribe();

    store.request(&server_name(&server)).await;

    let mut snapshots = Vec::new();
    while let Ok(snapshot) = updates.try_recv() {
        snapshots.push(snapshot);
    }
    // loading, well-known done, finished
    assert_eq!(snapshots.len(), 3);
    assert!(snapshots[1].loading);
    let partial = snapshots[1].data.as_ref().unwrap();
    assert!(partial.well_known.is_some());
    assert!(partial.versions.is_none());
    assert!(!snapshots[2].loading);
}

#[tokio::test]
async fn test_support_warning_survives_into_store_state() {
    let server = MockServer::start().await;
    let body = r#"{"contacts":[{"matrix_id":"@admin:example.org","role":"m.role.admin"}],"support_page":"https://example.org/help"}"#;
    mount_get(&server, WELL_KNOWN_SUPPORT, typed_response(200, body, "text/plain; charset=utf-8"), 1)
        .await;
    let target = server_name(&server);
    let store = ProbeStore::new(SupportInfoDiscovery::new(probe_client(), probe_config()));

    let state = store.request(&target).await;

    assert_eq!(state.status(), FetchStatus::Success);
    assert!(!state.loading);
    assert_eq!(state.target.as_deref(), Some(target.as_str()));
    let info = state.data.as_ref().unwrap();
    assert_eq!(info.contacts[0].matrix_id.as_deref(), Some("@admin:example.org"));
    assert_eq!(info.support_page.as_deref(), Some("https://example.org/help"));

    let warning = state.error(ProbeStep::Support).unwrap();
    assert!(warning.is_warning());
    assert_eq!(warning.kind(), ErrorKind::ContentTypeWarning);
    assert!(state.first_failure().is_none());

    // Published state matches what the caller got, and is served from cache
    assert_eq!(store.state(), state);
    assert_eq!(store.request(&target).await, state);
}
