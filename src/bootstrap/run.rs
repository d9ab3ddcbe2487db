//! Command execution on top of a wired runtime.

use cb_app::ReconcileOutcome;
use cb_core::{AppConfig, BookmarkSet, ClipperId, ClipperView, ListFilter};
use tracing::{info, info_span, Instrument};

use super::wiring::{wire_runtime, WiredRuntime};
use crate::cli::Command;

pub async fn run_command(config: AppConfig, command: Command) -> anyhow::Result<()> {
    let span = info_span!("cli.run", command = ?command);

    async move {
        let wired = wire_runtime(config)?;
        match command {
            Command::Demo => run_demo(&wired).await,
            Command::List { bookmarked, query } => {
                let filter = ListFilter {
                    bookmarked_only: bookmarked,
                    ..ListFilter::default()
                };
                let filter = match query {
                    Some(query) => filter.with_query(query),
                    None => filter,
                };
                let listing = wired
                    .runtime
                    .mount_consumer("directory", wired.catalog.clone())
                    .await;
                print_views(listing.label(), &listing.views(&filter));
            }
            Command::Toggle { id } => {
                let toggle = wired.runtime.toggle(id, false);
                let bookmarked = toggle.activate_and_mirror().await;
                println!(
                    "{} is {}",
                    toggle.clipper_id(),
                    if bookmarked { "bookmarked" } else { "not bookmarked" }
                );
            }
            Command::Reconcile { remote } => {
                let seeded: BookmarkSet = remote.into_iter().map(ClipperId::from).collect();
                let booker_id = wired.runtime.config().booker_id.clone();
                wired.remote.seed(&booker_id, &seeded).await;
                let outcome = wired.runtime.reconciler().tick().await;
                print_outcome(&outcome);
                print_set("local", &wired.runtime.store().get_all());
            }
            Command::Reset => {
                wired.runtime.store().reset();
                println!("bookmarks cleared");
            }
        }
        Ok(())
    }
    .instrument(span)
    .await
}

/// Two listings and a star control share one store; a remote snapshot from
/// "another device" then overrides local state through reconciliation.
async fn run_demo(wired: &WiredRuntime) {
    let runtime = &wired.runtime;

    let directory = runtime.mount_consumer("directory", wired.catalog.clone()).await;
    let dashboard = runtime.mount_consumer("dashboard", wired.catalog.clone()).await;
    print_views(directory.label(), &directory.views(&ListFilter::all()));

    let Some(first) = directory.views(&ListFilter::all()).first().map(|v| v.id().clone()) else {
        println!("no clippers to bookmark");
        return;
    };

    let star = runtime.toggle(first.clone(), false);
    let bookmarked = star.activate_and_mirror().await;
    info!(clipper_id = %first, bookmarked, "demo toggle");
    print_views(dashboard.label(), &dashboard.views(&ListFilter::bookmarked_only()));

    let other_device: BookmarkSet = directory
        .views(&ListFilter::all())
        .iter()
        .skip(1)
        .take(2)
        .map(|view| view.id().clone())
        .collect();
    wired
        .remote
        .seed(&runtime.config().booker_id, &other_device)
        .await;

    let reconcile = runtime.start_reconcile_loop();
    let outcome = runtime.reconciler().tick().await;
    print_outcome(&outcome);
    print_views(dashboard.label(), &dashboard.views(&ListFilter::bookmarked_only()));

    if let Some(reconcile) = reconcile {
        reconcile.shutdown().await;
    }
    print_set("local", &runtime.store().get_all());
}

fn print_views(label: &str, views: &[ClipperView]) {
    println!("[{label}] {} clipper(s)", views.len());
    for view in views {
        println!(
            "  {} {:<12} {}",
            if view.is_bookmarked { "*" } else { " " },
            view.id(),
            view.summary.display_name
        );
    }
}

fn print_outcome(outcome: &ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::InSync => println!("reconcile: already in sync"),
        ReconcileOutcome::LocalOverwritten { set } => {
            println!("reconcile: local replaced by remote ({} ids)", set.len())
        }
        ReconcileOutcome::RemoteUpdated { inserted, deleted } => {
            println!("reconcile: remote updated (+{inserted} -{deleted})")
        }
        ReconcileOutcome::Merged { set, inserted } => {
            println!("reconcile: merged to {} ids (+{inserted} remote)", set.len())
        }
        ReconcileOutcome::Skipped(reason) => println!("reconcile: skipped ({reason:?})"),
    }
}

fn print_set(label: &str, set: &BookmarkSet) {
    let ids: Vec<&str> = set.iter().map(ClipperId::as_str).collect();
    println!("{label}: [{}]", ids.join(", "));
}
