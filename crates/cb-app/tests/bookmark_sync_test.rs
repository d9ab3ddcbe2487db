//! End-to-end bookmark synchronization scenarios across store, bus, toggle
//! controls, listings and the reconciler.

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use cb_app::{
    BookmarkEventBus, BookmarkReconciler, BookmarkRuntime, BookmarkRuntimeDeps, BookmarkStore,
    BookmarkToggle, ConsumerOptions, DirectoryConsumer, ReconcileOutcome, SkipReason, Visibility,
};
use cb_core::config::DEFAULT_STORAGE_KEY;
use cb_core::ports::{ClipperSourcePort, KeyValueStoragePort, RemoteBookmarkPort, RemoteBookmarkRecord};
use cb_core::{
    AppConfig, BookerId, BookmarkAction, BookmarkChangeEvent, BookmarkSet, ClipperId,
    ClipperSummary, ListFilter, ReconcilePolicy,
};
use cb_infra::{
    sample_clippers, FileKeyValueStorage, InMemoryKeyValueStorage, MockClipperCatalog,
    MockRemoteBookmarks,
};
use mockall::mock;
use mockall::predicate::eq;

static TRACE_INIT: Once = Once::new();

fn init_tracing() {
    TRACE_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

mock! {
    pub Remote {}

    #[async_trait]
    impl RemoteBookmarkPort for Remote {
        async fn list(&self, booker_id: &BookerId) -> anyhow::Result<Vec<RemoteBookmarkRecord>>;
        async fn insert(
            &self,
            booker_id: &BookerId,
            clipper_id: &ClipperId,
            notes: Option<String>,
        ) -> anyhow::Result<()>;
        async fn delete(&self, booker_id: &BookerId, clipper_id: &ClipperId) -> anyhow::Result<()>;
    }
}

fn memory_store() -> Arc<BookmarkStore> {
    Arc::new(BookmarkStore::new(
        Arc::new(InMemoryKeyValueStorage::new()),
        DEFAULT_STORAGE_KEY,
        BookmarkEventBus::new(),
    ))
}

fn catalog(name: &str) -> Arc<dyn ClipperSourcePort> {
    Arc::new(MockClipperCatalog::new(
        name,
        ["c1", "c2", "c3", "c4"]
            .into_iter()
            .map(|id| ClipperSummary::new(id, format!("Clipper {id}")))
            .collect(),
    ))
}

fn ids(list: &[&str]) -> Vec<ClipperId> {
    list.iter().map(|id| ClipperId::from(*id)).collect()
}

fn record(booker: &BookerId, clipper: &str) -> RemoteBookmarkRecord {
    RemoteBookmarkRecord {
        booker_id: booker.clone(),
        clipper_id: ClipperId::from(clipper),
        notes: None,
    }
}

#[test]
fn two_subscribers_each_observe_exactly_one_add() {
    init_tracing();
    let store = memory_store();
    let first = Arc::new(Mutex::new(Vec::<BookmarkChangeEvent>::new()));
    let second = Arc::new(Mutex::new(Vec::<BookmarkChangeEvent>::new()));
    let (a, b) = (Arc::clone(&first), Arc::clone(&second));
    let _s1 = store.bus().subscribe(move |event| a.lock().unwrap().push(event.clone()));
    let _s2 = store.bus().subscribe(move |event| b.lock().unwrap().push(event.clone()));

    store.add(&ClipperId::from("c1"));

    for seen in [first, second] {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].action, BookmarkAction::Add);
        assert_eq!(seen[0].bookmarked_ids, ids(&["c1"]));
    }
}

#[test]
fn event_payload_keeps_camel_case_contract() {
    let event = BookmarkChangeEvent::added(ClipperId::from("c1"), &BookmarkSet::from(["c1"]));
    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({ "clipperId": "c1", "action": "add", "bookmarkedIds": ["c1"] })
    );
}

#[tokio::test]
async fn toggle_in_one_tree_reflects_in_independent_listings() {
    init_tracing();
    let store = memory_store();
    let directory =
        DirectoryConsumer::mount(Arc::clone(&store), catalog("directory"), ConsumerOptions::new("directory"))
            .await;
    let dashboard =
        DirectoryConsumer::mount(Arc::clone(&store), catalog("dashboard"), ConsumerOptions::new("dashboard"))
            .await;

    let star = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c3"), false);
    assert!(star.activate());

    assert_eq!(directory.bookmarked_ids(), ids(&["c3"]));
    assert_eq!(dashboard.bookmarked_ids(), ids(&["c3"]));
    assert_eq!(dashboard.views(&ListFilter::bookmarked_only()).len(), 1);
}

#[tokio::test]
async fn remote_override_reaches_every_listing() {
    init_tracing();
    let store = memory_store();
    store.replace_all(BookmarkSet::from(["c1", "c2"]));

    let booker = BookerId::from("booker-1");
    let remote = Arc::new(MockRemoteBookmarks::default());
    remote.seed(&booker, &BookmarkSet::from(["c2", "c3"])).await;

    let directory =
        DirectoryConsumer::mount(Arc::clone(&store), catalog("directory"), ConsumerOptions::default()).await;
    let marketplace =
        DirectoryConsumer::mount(Arc::clone(&store), catalog("marketplace"), ConsumerOptions::default()).await;
    let c1_star = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), true);

    let reconciler =
        BookmarkReconciler::new(Arc::clone(&store), remote, booker, ReconcilePolicy::RemoteWins);
    let outcome = reconciler.tick().await;

    assert!(matches!(outcome, ReconcileOutcome::LocalOverwritten { .. }));
    assert_eq!(store.get_all(), BookmarkSet::from(["c2", "c3"]));
    assert_eq!(directory.bookmarked_ids(), ids(&["c2", "c3"]));
    assert_eq!(marketplace.bookmarked_ids(), ids(&["c2", "c3"]));
    assert!(!c1_star.is_bookmarked());
}

#[test]
fn concurrent_toggles_of_different_ids_lose_nothing() {
    init_tracing();
    let store = memory_store();
    let all: Vec<ClipperId> = (0..16u64).map(ClipperId::from).collect();

    std::thread::scope(|scope| {
        for id in &all {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                store.toggle(id);
            });
        }
    });

    assert_eq!(store.get_all(), all.into_iter().collect::<BookmarkSet>());
}

#[test]
fn racing_toggles_of_same_id_serialize() {
    let store = memory_store();
    let id = ClipperId::from("c1");

    std::thread::scope(|scope| {
        for _ in 0..2 {
            let store = Arc::clone(&store);
            let id = id.clone();
            scope.spawn(move || {
                store.toggle(&id);
            });
        }
    });

    assert!(!store.contains(&id), "two toggles restore the original state");
}

#[tokio::test]
async fn failing_remote_list_never_writes_anywhere() {
    init_tracing();
    let store = memory_store();
    store.replace_all(BookmarkSet::from(["c1"]));

    let mut remote = MockRemote::new();
    remote
        .expect_list()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("connection reset")));
    remote.expect_insert().never();
    remote.expect_delete().never();

    let reconciler = BookmarkReconciler::new(
        Arc::clone(&store),
        Arc::new(remote),
        BookerId::from("booker-1"),
        ReconcilePolicy::LocalWins,
    );

    assert_eq!(
        reconciler.tick().await,
        ReconcileOutcome::Skipped(SkipReason::RemoteUnavailable)
    );
    assert_eq!(store.get_all(), BookmarkSet::from(["c1"]));
}

#[tokio::test]
async fn local_wins_sends_exact_remote_delta() {
    init_tracing();
    let store = memory_store();
    store.replace_all(BookmarkSet::from(["c1", "c2"]));
    let booker = BookerId::from("booker-1");

    let mut remote = MockRemote::new();
    let listed = booker.clone();
    remote
        .expect_list()
        .with(eq(booker.clone()))
        .returning(move |_| Ok(vec![record(&listed, "c2"), record(&listed, "c3")]));
    remote
        .expect_insert()
        .withf(|_, clipper, notes| clipper.as_str() == "c1" && notes.is_none())
        .times(1)
        .returning(|_, _, _| Ok(()));
    remote
        .expect_delete()
        .withf(|_, clipper| clipper.as_str() == "c3")
        .times(1)
        .returning(|_, _| Ok(()));

    let reconciler =
        BookmarkReconciler::new(Arc::clone(&store), Arc::new(remote), booker, ReconcilePolicy::LocalWins);

    assert_eq!(
        reconciler.tick().await,
        ReconcileOutcome::RemoteUpdated {
            inserted: 1,
            deleted: 1
        }
    );
    assert_eq!(store.get_all(), BookmarkSet::from(["c1", "c2"]));
}

#[tokio::test]
async fn unavailable_storage_stays_optimistic_for_listings() {
    init_tracing();
    let storage = Arc::new(InMemoryKeyValueStorage::new());
    let store = Arc::new(BookmarkStore::new(
        storage.clone(),
        DEFAULT_STORAGE_KEY,
        BookmarkEventBus::new(),
    ));
    let listing =
        DirectoryConsumer::mount(Arc::clone(&store), catalog("directory"), ConsumerOptions::default()).await;

    storage.set_available(false);
    BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c2"), false).activate();
    assert_eq!(listing.bookmarked_ids(), ids(&["c2"]));

    storage.set_available(true);
    assert!(store.contains(&ClipperId::from("c2")));
    let raw = storage
        .get(DEFAULT_STORAGE_KEY)
        .expect("read")
        .expect("flushed value");
    assert!(raw.contains("\"c2\""));
}

#[tokio::test]
async fn file_backed_bookmarks_survive_restart() {
    init_tracing();
    let temp_dir = tempfile::TempDir::new().expect("temp dir");

    {
        let storage = Arc::new(FileKeyValueStorage::new(temp_dir.path()).expect("storage"));
        let store = BookmarkStore::new(storage, DEFAULT_STORAGE_KEY, BookmarkEventBus::new());
        store.add(&ClipperId::from("c4"));
        store.add(&ClipperId::from("c1"));
    }

    let storage = Arc::new(FileKeyValueStorage::new(temp_dir.path()).expect("storage"));
    let store = BookmarkStore::new(storage, DEFAULT_STORAGE_KEY, BookmarkEventBus::new());
    assert_eq!(store.get_all(), BookmarkSet::from(["c1", "c4"]));
}

#[tokio::test(start_paused = true)]
async fn runtime_loop_reconciles_while_visible() {
    init_tracing();
    let mut config = AppConfig::default();
    config.consumers.poll_interval = Some(Duration::from_secs(5));
    config.reconcile.interval = Some(Duration::from_secs(30));
    config.remote.latency = Duration::from_millis(50);

    let remote = Arc::new(MockRemoteBookmarks::new(config.remote.latency));
    remote
        .seed(&config.booker_id, &BookmarkSet::from(["sample-2"]))
        .await;
    let runtime = BookmarkRuntime::from_deps(
        config,
        BookmarkRuntimeDeps {
            storage: Arc::new(InMemoryKeyValueStorage::new()),
            remote,
            fallback_clippers: sample_clippers(),
        },
    );

    let listing = runtime
        .mount_consumer("directory", Arc::new(MockClipperCatalog::failing("catalog")))
        .await;
    assert!(listing.is_fallback());

    runtime.visibility().set(Visibility::Hidden);
    let reconcile = runtime.start_reconcile_loop().expect("interval configured");

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert!(listing.bookmarked_ids().is_empty());

    runtime.visibility().set(Visibility::Visible);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(listing.bookmarked_ids(), ids(&["sample-2"]));

    reconcile.shutdown().await;
    listing.unmount();
    assert_eq!(runtime.bus().listener_count(), 0);
}
