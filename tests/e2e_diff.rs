//! Diff report against mocked GitHub and Docker Hub APIs

mod helper;

use mockito::Server;
use tempfile::TempDir;

use helper::{
    IMAGE, RecordingObserver, UPSTREAM, mock_hub_tags, mock_releases, mock_releases_error,
};
use release_sync::events::SyncEvent;
use release_sync::render::render_diff;
use release_sync::skip::{SkipMap, load_skip_map};
use release_sync::sync::{VersionStatus, run_diff};
use release_sync::version::registries::{DockerHubRegistry, GitHubRegistry};
use release_sync::version::registry::SourceKind;
use release_sync::version::{Reconciler, Version};

fn statuses(report: &release_sync::sync::DiffReport) -> Vec<(String, VersionStatus)> {
    report
        .rows
        .iter()
        .map(|row| (row.version.to_string(), row.status))
        .collect()
}

#[tokio::test]
async fn diff_reports_missing_skipped_and_extra_versions() {
    let mut server = Server::new_async().await;
    let releases_mock = mock_releases(
        &mut server,
        &["0.9.0", "1.0.0", "1.1.0", "v1.2.0", "2.0.0", "2.1.0-rc.1"],
    )
    .await;
    let tags_mock = mock_hub_tags(&mut server, &["latest", "1.0.0", "1.0.5"]).await;

    let temp_dir = TempDir::new().unwrap();
    let skip_path = temp_dir.path().join("skip.json");
    std::fs::write(&skip_path, r#"{"2.0.0": "broken upstream build"}"#).unwrap();

    let observer = RecordingObserver::default();
    let skip = load_skip_map(&skip_path, &observer);
    let releases = GitHubRegistry::new(&server.url());
    let tags = DockerHubRegistry::new(&server.url());
    let reconciler = Reconciler::new(&releases, UPSTREAM, &tags, IMAGE, &observer);

    let report = run_diff(&reconciler, &skip, None).await;

    releases_mock.assert_async().await;
    tags_mock.assert_async().await;
    assert_eq!(report.baseline, Version::new(1, 0, 0));
    assert_eq!(
        statuses(&report),
        vec![
            ("1.0.0".to_string(), VersionStatus::Synced),
            ("1.0.5".to_string(), VersionStatus::Extra),
            ("1.1.0".to_string(), VersionStatus::Missing),
            ("2.0.0".to_string(), VersionStatus::Skipped),
        ]
    );
    assert_eq!(report.available_missing_count, 1);
    assert_eq!(report.extra_count, 1);
    assert!(observer.events().contains(&SyncEvent::BaselineSelected {
        baseline: Version::new(1, 0, 0),
        manual: false,
    }));

    colored::control::set_override(false);
    let rendered = render_diff(&report);
    assert!(rendered.contains("1 versions skipped due to configuration"));
    assert!(rendered.ends_with("1 versions missing from Docker Hub (excluding skipped)"));
}

#[tokio::test]
async fn diff_manual_baseline_applies_to_that_call_only() {
    let mut server = Server::new_async().await;
    let _releases = mock_releases(&mut server, &["1.0.0", "1.1.0", "2.0.0"]).await;
    let _tags = mock_hub_tags(&mut server, &["1.1.0"]).await;

    let observer = RecordingObserver::default();
    let releases = GitHubRegistry::new(&server.url());
    let tags = DockerHubRegistry::new(&server.url());
    let reconciler = Reconciler::new(&releases, UPSTREAM, &tags, IMAGE, &observer);

    let manual = run_diff(&reconciler, &SkipMap::default(), Some(Version::new(0, 0, 0))).await;
    let computed = run_diff(&reconciler, &SkipMap::default(), None).await;

    assert_eq!(manual.baseline, Version::ZERO);
    assert_eq!(manual.missing_count, 2);
    assert_eq!(computed.baseline, Version::new(1, 1, 0));
    assert_eq!(computed.missing_count, 1);
}

#[tokio::test]
async fn diff_treats_unreachable_source_as_empty() {
    let mut server = Server::new_async().await;
    let _releases = mock_releases_error(&mut server, 500).await;
    let _tags = mock_hub_tags(&mut server, &["1.0.0"]).await;

    let observer = RecordingObserver::default();
    let releases = GitHubRegistry::new(&server.url());
    let tags = DockerHubRegistry::new(&server.url());
    let reconciler = Reconciler::new(&releases, UPSTREAM, &tags, IMAGE, &observer);

    let report = run_diff(&reconciler, &SkipMap::default(), None).await;

    assert!(report.all_synced());
    assert_eq!(
        statuses(&report),
        vec![("1.0.0".to_string(), VersionStatus::Extra)]
    );
    assert!(observer.events().iter().any(|e| matches!(
        e,
        SyncEvent::SourceUnavailable {
            source: SourceKind::GitHubReleases,
            ..
        }
    )));
}
