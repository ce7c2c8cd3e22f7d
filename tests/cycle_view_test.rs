use std::sync::Arc;
use std::time::Duration;

use cycle_board::config::types::FetchConfig;
use cycle_board::engine::FetchError;
use cycle_board::store::{StoreCall, StubStore};
use cycle_board::types::{GroupedIssueIds, IdentityTriple, IssueLayout, LoaderMode};
use cycle_board::views::cycle::{Body, LoadingIndicator, ReadyScreen};
use cycle_board::views::{CycleView, LayoutRenderer, Screen, SyncOutcome, ViewState};

fn load_store() -> StubStore {
    let json = include_str!("fixtures/cycle_store.json");
    StubStore::from_json(json).expect("valid cycle_store.json fixture")
}

fn setup(store: StubStore) -> (Arc<StubStore>, Arc<CycleView<StubStore>>) {
    let store = Arc::new(store);
    let view = Arc::new(CycleView::new(Arc::clone(&store), &FetchConfig::default()));
    (store, view)
}

fn triple(cycle: &str) -> IdentityTriple {
    IdentityTriple::new("ws1", "proj1", cycle)
}

fn ready(view: &CycleView<StubStore>) -> ReadyScreen {
    match view.screen() {
        Screen::Ready(ready) => ready,
        other => panic!("expected a ready screen, got {other:?}"),
    }
}

fn filters_call(cycle: &str) -> StoreCall {
    StoreCall::FetchFilters {
        workspace: "ws1".into(),
        project: "proj1".into(),
        cycle: cycle.into(),
    }
}

fn issues_call(cycle: &str, mode: LoaderMode) -> StoreCall {
    StoreCall::FetchIssues {
        workspace: "ws1".into(),
        project: "proj1".into(),
        mode,
        cycle: cycle.into(),
    }
}

// ---------------------------------------------------------------------------
// Identity readiness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn incomplete_identity_fetches_nothing_and_renders_blank() {
    let (store, view) = setup(load_store());
    let incomplete = [
        IdentityTriple::default(),
        IdentityTriple {
            workspace: Some("ws1".into()),
            project: None,
            cycle: Some("cyc1".into()),
        },
        IdentityTriple {
            workspace: None,
            project: Some("proj1".into()),
            cycle: Some("cyc1".into()),
        },
        IdentityTriple::new("ws1", "proj1", ""),
    ];
    for identity in incomplete {
        let outcome = view.sync(identity).await.unwrap();
        assert!(matches!(outcome, SyncOutcome::NotReady));
        assert_eq!(view.screen(), Screen::Blank);
    }
    assert!(store.calls().is_empty());
    assert!(!view.open_transfer());
}

// ---------------------------------------------------------------------------
// Fetch coordination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_mount_fetches_filters_then_issues_with_init_loader() {
    let (store, view) = setup(load_store().with_latency(Duration::from_millis(200)));

    let task = tokio::spawn({
        let view = Arc::clone(&view);
        async move { view.sync(triple("cyc1")).await }
    });

    // Filters still in flight: no layout known, nothing loaded.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(view.screen(), Screen::Loading(LoadingIndicator::Spinner));

    // Issues in flight: the loader takes the shape of the active layout.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(
        view.screen(),
        Screen::Loading(LoadingIndicator::Layout(IssueLayout::Kanban))
    );

    let outcome = task.await.unwrap().unwrap();
    let SyncOutcome::Fetched(fetched) = outcome else {
        panic!("expected a fetch, got {outcome:?}");
    };
    assert!(fetched.issued);
    assert_eq!(fetched.record.mode, LoaderMode::InitLoader);
    assert_eq!(fetched.record.key.to_string(), "CYCLE_ISSUES_ws1_proj1_cyc1");
    assert_eq!(
        store.calls(),
        vec![filters_call("cyc1"), issues_call("cyc1", LoaderMode::InitLoader)]
    );
    assert_eq!(view.screen().state(), Some(ViewState::Populated));
}

#[tokio::test]
async fn overlapping_triggers_share_one_fetch() {
    let (store, view) = setup(load_store().with_latency(Duration::from_millis(50)));

    let (a, b) = tokio::join!(view.sync(triple("cyc1")), view.sync(triple("cyc1")));
    let (SyncOutcome::Fetched(a), SyncOutcome::Fetched(b)) = (a.unwrap(), b.unwrap()) else {
        panic!("both triggers should resolve the key");
    };
    assert!(a.issued != b.issued, "exactly one trigger issues the calls");
    assert_eq!(
        store.calls(),
        vec![filters_call("cyc1"), issues_call("cyc1", LoaderMode::InitLoader)]
    );
}

#[tokio::test]
async fn populated_key_is_not_refetched() {
    let (store, view) = setup(load_store());
    view.sync(triple("cyc1")).await.unwrap();
    assert_eq!(ready(&view).scope.cycle, "cyc1");

    let outcome = view.sync(triple("cyc1")).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Unchanged(_)));
    assert_eq!(store.calls().len(), 2);
}

#[tokio::test]
async fn existing_collection_uses_mutation_mode() {
    let (store, view) = setup(load_store());
    let scope = triple("cyc1").resolve().unwrap();
    let seeded: GroupedIssueIds = [("backlog", vec!["PRJ-1".to_owned()])].into_iter().collect();
    store.seed_issues(&scope, seeded);

    view.sync(triple("cyc1")).await.unwrap();
    assert_eq!(
        store.calls(),
        vec![filters_call("cyc1"), issues_call("cyc1", LoaderMode::Mutation)]
    );
}

#[tokio::test]
async fn mutation_keeps_previous_content_visible() {
    let (store, view) = setup(load_store().with_latency(Duration::from_millis(200)));
    view.sync(triple("cyc1")).await.unwrap();

    let task = tokio::spawn({
        let view = Arc::clone(&view);
        async move { view.revalidate().await }
    });

    // Issue refresh in flight: still populated, never back to loading.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(view.screen().state(), Some(ViewState::Populated));

    task.await.unwrap().unwrap();
    assert_eq!(
        store.calls().last(),
        Some(&issues_call("cyc1", LoaderMode::Mutation))
    );
}

#[tokio::test]
async fn returning_to_a_fresh_key_reuses_it() {
    let (store, view) = setup(load_store());
    view.sync(triple("cyc1")).await.unwrap();
    view.sync(triple("cyc2")).await.unwrap();

    let outcome = view.sync(triple("cyc1")).await.unwrap();
    let SyncOutcome::Fetched(fetched) = outcome else {
        panic!("expected the cached load, got {outcome:?}");
    };
    assert!(!fetched.issued);
    assert_eq!(store.calls().len(), 4);
    assert_eq!(ready(&view).renderer(), Some(LayoutRenderer::Kanban));
}

#[tokio::test]
async fn result_for_an_abandoned_key_is_superseded() {
    let (_store, view) = setup(load_store().with_latency(Duration::from_millis(100)));

    let (old, new) = tokio::join!(view.sync(triple("cyc1")), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        view.sync(triple("cyc2")).await
    });

    assert!(matches!(old.unwrap(), SyncOutcome::Superseded(ref key) if key.cycle() == "cyc1"));
    assert!(matches!(new.unwrap(), SyncOutcome::Fetched(_)));
    assert_eq!(ready(&view).scope.cycle, "cyc2");
}

#[tokio::test]
async fn fetch_failure_propagates_without_retry() {
    let (store, view) = setup(load_store());
    store.fail_issues(Some("502 bad gateway"));

    let err = view.sync(triple("cyc1")).await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::Issues {
            mode: LoaderMode::InitLoader,
            ..
        }
    ));
    assert_eq!(err.key().cycle(), "cyc1");
    assert_eq!(store.calls().len(), 2);
    assert!(view.screen().state().is_some_and(ViewState::is_loading));

    // Failures are not cached: the same key fetches again once healed.
    store.fail_issues(None);
    let outcome = view.sync(triple("cyc1")).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Fetched(ref f) if f.issued));
    assert_eq!(store.calls().len(), 4);
}

#[tokio::test]
async fn filter_failure_skips_issue_load() {
    let (store, view) = setup(load_store());
    store.fail_filters(Some("timeout"));

    let err = view.sync(triple("cyc1")).await.unwrap_err();
    assert!(matches!(err, FetchError::Filters { .. }));
    assert_eq!(store.calls(), vec![filters_call("cyc1")]);
}

// ---------------------------------------------------------------------------
// View composition
// ---------------------------------------------------------------------------

#[tokio::test]
async fn kanban_layout_mounts_only_kanban() {
    let (_store, view) = setup(load_store());
    view.sync(triple("cyc1")).await.unwrap();

    let screen = ready(&view);
    assert_eq!(screen.body, Body::Layout(Some(LayoutRenderer::Kanban)));
    assert_eq!(screen.active_layout, Some(IssueLayout::Kanban));
    assert!(screen.peek_overlay);
}

#[tokio::test]
async fn unknown_layout_mounts_nothing() {
    let (_store, view) = setup(load_store());
    view.sync(triple("cyc3")).await.unwrap();

    let screen = ready(&view);
    assert_eq!(screen.active_layout, Some(IssueLayout::Unknown));
    assert_eq!(screen.body, Body::Layout(None));
    assert!(screen.peek_overlay);
}

#[tokio::test]
async fn missing_layout_mounts_nothing() {
    let (_store, view) = setup(load_store());
    view.sync(triple("cyc4")).await.unwrap();

    let screen = ready(&view);
    assert_eq!(screen.active_layout, None);
    assert_eq!(screen.renderer(), None);
}

#[tokio::test]
async fn empty_cycle_renders_empty_state() {
    let (_store, view) = setup(load_store());
    view.sync(triple("cyc2")).await.unwrap();

    let screen = ready(&view);
    assert_eq!(screen.body, Body::Empty);
    assert_eq!(view.screen().state(), Some(ViewState::Empty));
    assert!(screen.peek_overlay);
}

// ---------------------------------------------------------------------------
// Transfer workflow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transfer_affordance_follows_cycle_status() {
    let (_store, view) = setup(load_store());
    for (cycle, visible) in [("cyc1", true), ("cyc2", false), ("cyc3", false), ("cyc4", false)] {
        view.sync(triple(cycle)).await.unwrap();
        assert_eq!(ready(&view).transfer_affordance, visible, "{cycle}");
    }
}

#[tokio::test]
async fn transfer_modal_opens_and_closes() {
    let (_store, view) = setup(load_store());
    view.sync(triple("cyc1")).await.unwrap();
    assert!(!ready(&view).transfer_modal_open);

    assert!(view.open_transfer());
    assert!(ready(&view).transfer_modal_open);

    view.close_transfer();
    assert!(!ready(&view).transfer_modal_open);
}

#[tokio::test]
async fn transfer_cannot_open_for_active_cycle() {
    let (_store, view) = setup(load_store());
    view.sync(triple("cyc2")).await.unwrap();
    assert!(!view.open_transfer());
    assert!(!ready(&view).transfer_modal_open);
}
