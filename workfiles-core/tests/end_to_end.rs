mod support;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use workfiles_core::error::{QueryError, ThumbnailFetchError};
use workfiles_core::finder::{FileFinder, Finder, FinderConfig};
use workfiles_core::model::{
    FileModelDriver, ModelConfig, ModelEvent, NodeKind, ResultAggregator,
};
use workfiles_core::ports::{ThumbnailRequest, ThumbnailSource};
use workfiles_core::ScopedThumbnailFetcher;
use workfiles_model::{SearchFilters, SearchStatus};

use support::*;

fn driver_for(
    fakes: &FakeBackends,
) -> (Arc<FileFinder>, FileModelDriver) {
    let (finder, finder_events) = FileFinder::channel(
        fakes.backends(),
        FinderConfig::default(),
        Handle::current(),
    )
    .expect("valid finder config");
    let finder = Arc::new(finder);
    let aggregator =
        ResultAggregator::new(finder.clone(), ModelConfig::default());
    (finder, FileModelDriver::new(aggregator, finder_events))
}

#[tokio::test]
async fn refresh_lists_local_and_published_files() {
    let shot_10 = shot(10);
    let fakes = FakeBackends::default();
    fakes.scanner.add(local_record(&shot_10, "comp", 1));
    fakes.scanner.add(local_record(&shot_10, "roto", 2));
    fakes
        .query
        .add(publish_record(501, &shot_10, "light", 4, None));
    let gate = fakes.scanner.gate(&shot_10);

    let (finder, mut driver) = driver_for(&fakes);
    let mut events = driver.aggregator().subscribe();

    let groups = driver
        .aggregator_mut()
        .refresh(&[request("Shot 010", &shot_10)]);
    assert_eq!(groups.len(), 1);
    let group = groups[0];
    assert_eq!(
        driver.aggregator().group_status(group),
        Some(SearchStatus::Searching)
    );
    assert_eq!(
        driver.aggregator().group_message(group).as_deref(),
        Some("Searching for files...")
    );
    assert_eq!(
        drain(&mut events),
        [ModelEvent::Reset, ModelEvent::SearchStarted { group }]
    );

    gate.open();
    driver.process_until_idle().await;

    let aggregator = driver.aggregator();
    assert_eq!(aggregator.group_status(group), Some(SearchStatus::Completed));
    assert_eq!(aggregator.group_message(group), None);
    let files = aggregator.tree().file_descendants(group);
    assert_eq!(files.len(), 3);
    assert!(
        files
            .iter()
            .all(|&node| aggregator.kind(node) == Some(NodeKind::File))
    );
    assert_eq!(finder.active_count(), 0);

    let emitted = drain(&mut events);
    assert!(matches!(
        emitted.as_slice(),
        [
            ModelEvent::ChildrenAdded { parent, nodes },
            ModelEvent::SearchCompleted { group: completed },
        ] if *parent == group && nodes.len() == 3 && *completed == group
    ));

    // A second search that is stopped before it finishes must not touch the
    // listing above.
    let shot_20 = shot(20);
    fakes.scanner.add(local_record(&shot_20, "comp", 9));
    let late = fakes.scanner.gate(&shot_20);
    let pending = finder.begin_search(&request("Shot 020", &shot_20));
    finder.stop_search(pending);
    late.open();
    tokio::time::sleep(SETTLE).await;

    assert_eq!(driver.process_pending(), 0);
    assert_eq!(driver.aggregator().tree().file_descendants(group), files);
    assert_eq!(
        driver.aggregator().group_status(group),
        Some(SearchStatus::Completed)
    );
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn overlapping_versions_merge_into_one_history() {
    let shot_10 = shot(10);
    let fakes = FakeBackends::default();
    fakes.scanner.add(local_record(&shot_10, "comp", 1));
    fakes.scanner.add(local_record(&shot_10, "comp", 2));
    fakes
        .query
        .add(publish_record(601, &shot_10, "comp", 2, Some("https://t/2")));
    fakes.query.add(publish_record(602, &shot_10, "comp", 3, None));

    let (_finder, mut driver) = driver_for(&fakes);
    let mut all_versions = request("Shot 010", &shot_10);
    all_versions.filters = SearchFilters::work_and_publishes().with_all_versions(true);
    let group = driver.aggregator_mut().refresh(&[all_versions])[0];
    driver.process_until_idle().await;

    let aggregator = driver.aggregator();
    let versions = aggregator
        .get_file_versions(&key(&shot_10, "comp"))
        .expect("comp is known");
    assert_eq!(versions.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);

    let v2 = &versions[&2];
    assert!(v2.is_local && v2.is_published);
    assert!(v2.editable);
    assert_eq!(v2.thumbnail_path.as_deref(), Some("https://t/2"));

    let v3 = &versions[&3];
    assert!(!v3.is_local && !v3.editable);
    assert!(v3.not_editable_reason.is_some());

    let (_, environment) = aggregator
        .get_file_info(&key(&shot_10, "comp"))
        .expect("comp is known");
    assert_eq!(environment.context.entity.as_ref(), Some(&shot_10));
    assert_eq!(aggregator.tree().file_descendants(group).len(), 3);
}

#[tokio::test]
async fn latest_only_keeps_highest_version() {
    let shot_10 = shot(10);
    let fakes = FakeBackends::default();
    fakes.scanner.add(local_record(&shot_10, "comp", 1));
    fakes.scanner.add(local_record(&shot_10, "comp", 2));
    fakes.query.add(publish_record(701, &shot_10, "comp", 3, None));

    let (_finder, mut driver) = driver_for(&fakes);
    let group = driver
        .aggregator_mut()
        .refresh(&[request("Shot 010", &shot_10)])[0];
    driver.process_until_idle().await;

    let aggregator = driver.aggregator();
    let labels: Vec<_> = aggregator
        .tree()
        .file_descendants(group)
        .into_iter()
        .filter_map(|node| aggregator.label(node))
        .collect();
    assert_eq!(labels, ["comp, v3"]);
}

#[tokio::test]
async fn failing_search_leaves_siblings_alone() {
    let good = shot(10);
    let bad = shot(20);
    let fakes = FakeBackends::default();
    fakes.scanner.add(local_record(&good, "comp", 1));
    fakes.query.fail_for(
        &bad,
        QueryError::Unreachable("connection refused".into()),
    );

    let (_finder, mut driver) = driver_for(&fakes);
    let groups = driver.aggregator_mut().refresh(&[
        request("Shot 010", &good),
        request("Shot 020", &bad),
    ]);
    driver.process_until_idle().await;

    let aggregator = driver.aggregator();
    assert_eq!(
        aggregator.group_status(groups[0]),
        Some(SearchStatus::Completed)
    );
    assert_eq!(aggregator.tree().file_descendants(groups[0]).len(), 1);

    assert_eq!(aggregator.group_status(groups[1]), Some(SearchStatus::Failed));
    let message = aggregator.group_message(groups[1]).expect("message");
    assert!(message.contains("connection refused"), "{message}");
    assert!(aggregator.tree().file_descendants(groups[1]).is_empty());
}

#[tokio::test]
async fn empty_search_reports_no_files() {
    let fakes = FakeBackends::default();
    let (_finder, mut driver) = driver_for(&fakes);
    let group = driver
        .aggregator_mut()
        .refresh(&[request("Shot 030", &shot(30))])[0];
    driver.process_until_idle().await;

    assert_eq!(
        driver.aggregator().group_message(group).as_deref(),
        Some("No files found!")
    );
}

struct CachedSource;

#[async_trait]
impl ThumbnailSource for CachedSource {
    async fn download(
        &self,
        request: &ThumbnailRequest,
    ) -> Result<PathBuf, ThumbnailFetchError> {
        Ok(PathBuf::from(format!(
            "/tmp/thumbs/{}_{}.png",
            request.entity_type, request.entity_id
        )))
    }
}

#[tokio::test]
async fn published_thumbnail_reaches_older_local_versions() {
    let shot_10 = shot(10);
    let fakes = FakeBackends::default();
    fakes.scanner.add(local_record(&shot_10, "comp", 1));
    fakes
        .query
        .add(publish_record(801, &shot_10, "comp", 3, Some("https://t/3")));

    let (finder, finder_events) = FileFinder::channel(
        fakes.backends(),
        FinderConfig::default(),
        Handle::current(),
    )
    .expect("valid finder config");
    let (fetcher, thumbnail_events) =
        ScopedThumbnailFetcher::channel(Arc::new(CachedSource), Handle::current());
    let aggregator =
        ResultAggregator::new(Arc::new(finder), ModelConfig::default())
            .with_thumbnails(Arc::new(fetcher));
    let mut driver = FileModelDriver::new(aggregator, finder_events)
        .with_thumbnail_events(thumbnail_events);

    let mut all_versions = request("Shot 010", &shot_10);
    all_versions.filters.show_all_versions = true;
    driver.aggregator_mut().refresh(&[all_versions]);
    driver.process_until_idle().await;

    let aggregator = driver.aggregator();
    assert_eq!(aggregator.pending_thumbnail_count(), 0);
    let versions = aggregator
        .get_file_versions(&key(&shot_10, "comp"))
        .expect("comp is known");
    let published = versions[&3].thumbnail.as_ref().expect("fetched");
    let inherited = versions[&1].thumbnail.as_ref().expect("back-filled");
    assert!(published.ptr_eq(inherited));
    assert_eq!(
        published.path(),
        PathBuf::from("/tmp/thumbs/PublishedFile_801.png")
    );
}
