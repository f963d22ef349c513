//! Integration tests for the downloader
//!
//! These tests use wiremock to create mock media servers and test the
//! full download cycle end-to-end.

use gifgrab::config::Config;
use gifgrab::downloader::{
    plan, run, DownloadRequest, Scheduler, SchedulerSettings,
};
use gifgrab::output::{FailureReport, NoopProgress, ProgressSink};
use gifgrab::storage::FsMediaStore;
use gifgrab::{GrabError, PrecheckError};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;
use zip::ZipWriter;

const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

/// Progress sink that records every signal it receives
#[derive(Default)]
struct RecordingProgress {
    started: Mutex<Vec<usize>>,
    advanced: Mutex<Vec<usize>>,
    finished: Mutex<usize>,
}

impl RecordingProgress {
    fn total_advanced(&self) -> usize {
        self.advanced.lock().unwrap().iter().sum()
    }
}

impl ProgressSink for RecordingProgress {
    fn start(&self, total: usize) {
        self.started.lock().unwrap().push(total);
    }

    fn advance(&self, n: usize) {
        self.advanced.lock().unwrap().push(n);
    }

    fn finish(&self) {
        *self.finished.lock().unwrap() += 1;
    }
}

/// Writes a data package whose favorites point at the given URLs
fn write_package(dir: &Path, urls: &[String]) -> PathBuf {
    let gifs: serde_json::Map<String, serde_json::Value> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            (
                format!("https://tenor.com/view/{}", i),
                serde_json::json!({"src": url, "format": 2, "width": 498, "height": 280}),
            )
        })
        .collect();
    let user = serde_json::json!({
        "id": "1234",
        "username": "tester",
        "settings": {"frecency": {"favoriteGifs": {"gifs": gifs}}}
    });

    let package = dir.join("package.zip");
    let mut zip = ZipWriter::new(File::create(&package).unwrap());
    zip.start_file("account/user.json", FileOptions::default())
        .unwrap();
    zip.write_all(user.to_string().as_bytes()).unwrap();
    zip.start_file("messages/index.json", FileOptions::default())
        .unwrap();
    zip.write_all(b"{}").unwrap();
    zip.finish().unwrap();

    package
}

/// Creates a test configuration rooted in `dir`, targeting the mock server host
fn create_test_config(dir: &Path, server: &MockServer) -> Config {
    let host = url::Url::parse(&server.uri())
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    let mut config = Config::default();
    config.downloader.max_concurrent_requests = 5;
    config.downloader.release_delay_ms = 10; // Very short for testing
    config.filter.target_host = host;
    config.paths.package_path = dir.join("package.zip");
    config.paths.output_dir = dir.join("gifs");
    config.paths.report_path = dir.join("failed_downloads.json");
    config
}

fn settings(capacity: usize, release_delay: Duration) -> SchedulerSettings {
    SchedulerSettings {
        capacity,
        release_delay,
        expected_content_type: "image/gif".to_string(),
    }
}

async fn mount_gif(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(GIF_BYTES, "image/gif"))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_end_to_end_success_failure_and_skip() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_gif(&server, "/attachments/a.gif").await;
    mount_status(&server, "/attachments/b.gif", 404).await;
    Mock::given(method("GET"))
        .and(path("/attachments/c.gif"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>not a gif</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url_a = format!("{}/attachments/a.gif", base);
    let url_b = format!("{}/attachments/b.gif", base);
    let url_c = format!("{}/attachments/c.gif", base);
    write_package(
        dir.path(),
        &[
            url_a.clone(),
            url_b.clone(),
            url_c.clone(),
            // Not on the target host, never requested
            "https://media.tenor.com/x.gif".to_string(),
        ],
    );
    let config = create_test_config(dir.path(), &server);
    let progress = RecordingProgress::default();

    let summary = run(&config, &progress).await.expect("run failed");

    assert_eq!(summary.favorites_found, 4);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].url, url_c);
    assert_eq!(summary.skipped[0].content_type.as_deref(), Some("text/html"));

    // Exactly one file, holding the payload of A
    assert_eq!(count_files(&config.paths.output_dir), 1);
    let saved = std::fs::read(config.paths.output_dir.join("a.gif")).unwrap();
    assert_eq!(saved, GIF_BYTES);

    // Report holds only B
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.paths.report_path).unwrap())
            .unwrap();
    assert_eq!(written, serde_json::json!([{"url": url_b, "status": 404}]));

    // Every request advanced progress, the skip included
    assert_eq!(*progress.started.lock().unwrap(), vec![3]);
    assert_eq!(progress.total_advanced(), 3);
    assert_eq!(*progress.finished.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_no_fail_fast() {
    let server = MockServer::start().await;
    let base = server.uri();

    let failing = [(2usize, 500u16), (5, 404), (8, 403)];
    let mut urls = Vec::new();
    for i in 0..10 {
        let route = format!("/gif/{}.gif", i);
        match failing.iter().find(|(idx, _)| *idx == i) {
            Some((_, status)) => mount_status(&server, &route, *status).await,
            None => mount_gif(&server, &route).await,
        }
        urls.push(format!("{}{}", base, route));
    }

    let dir = TempDir::new().unwrap();
    let store = Arc::new(FsMediaStore::new(dir.path(), "gif"));
    let scheduler = Scheduler::new(
        reqwest::Client::new(),
        store,
        settings(3, Duration::from_millis(10)),
    );
    let progress = RecordingProgress::default();

    let tally = scheduler
        .run(DownloadRequest::from_urls(urls.clone()), &progress)
        .await;

    assert_eq!(tally.resolved, 10);
    assert_eq!(tally.succeeded, 7);
    assert_eq!(tally.report.len(), 3);
    assert_eq!(count_files(dir.path()), 7);
    assert_eq!(progress.total_advanced(), 10);

    let mut reported: Vec<_> = tally
        .report
        .entries()
        .iter()
        .map(|r| (r.url.clone(), r.status))
        .collect();
    reported.sort();
    let mut expected: Vec<_> = failing
        .iter()
        .map(|(i, status)| (urls[*i].clone(), Some(*status)))
        .collect();
    expected.sort();
    assert_eq!(reported, expected);
}

#[tokio::test]
async fn test_transport_fault_does_not_abort_siblings() {
    let server = MockServer::start().await;
    mount_gif(&server, "/ok.gif").await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(FsMediaStore::new(dir.path(), "gif"));
    let scheduler = Scheduler::new(
        reqwest::Client::new(),
        store,
        settings(5, Duration::from_millis(10)),
    );

    let requests = DownloadRequest::from_urls(vec![
        format!("{}/ok.gif", server.uri()),
        "http://127.0.0.1:9/refused.gif".to_string(),
    ]);
    let tally = scheduler.run(requests, &NoopProgress).await;

    assert_eq!(tally.succeeded, 1);
    assert_eq!(tally.report.len(), 1);
    assert_eq!(tally.report.entries()[0].status, None);
    assert_eq!(tally.report.entries()[0].url, "http://127.0.0.1:9/refused.gif");
}

#[tokio::test]
async fn test_write_failure_reported_without_status() {
    let server = MockServer::start().await;
    mount_gif(&server, "/attachments/ok.gif").await;

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent");
    let scheduler = Scheduler::new(
        reqwest::Client::new(),
        Arc::new(FsMediaStore::new(&missing, "gif")),
        settings(5, Duration::from_millis(10)),
    );

    let url = format!("{}/attachments/ok.gif", server.uri());
    let tally = scheduler
        .run(DownloadRequest::from_urls(vec![url.clone()]), &NoopProgress)
        .await;

    assert_eq!(tally.succeeded, 0);
    assert_eq!(tally.report.len(), 1);
    assert_eq!(tally.report.entries()[0].url, url);
    // The server answered 200; the report must not suggest otherwise
    assert_eq!(tally.report.entries()[0].status, None);
    assert!(!missing.exists());
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn test_stalled_fetch_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.gif"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(GIF_BYTES, "image/gif")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.downloader.request_timeout_secs = 1;
    let client =
        gifgrab::downloader::build_http_client(&config.downloader, &config.user_agent).unwrap();
    let scheduler = Scheduler::new(
        client,
        Arc::new(FsMediaStore::new(dir.path(), "gif")),
        settings(1, Duration::from_millis(10)),
    );

    let started = Instant::now();
    let tally = scheduler
        .run(
            DownloadRequest::from_urls(vec![format!("{}/slow.gif", server.uri())]),
            &NoopProgress,
        )
        .await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(tally.report.len(), 1);
    assert_eq!(tally.report.entries()[0].status, None);
    assert_eq!(tally.report.entries()[0].reason, "Request timeout");
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn test_duplicate_urls_get_distinct_files() {
    let server = MockServer::start().await;
    mount_gif(&server, "/dup/cat.gif").await;
    let url = format!("{}/dup/cat.gif", server.uri());

    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(
        reqwest::Client::new(),
        Arc::new(FsMediaStore::new(dir.path(), "gif")),
        settings(5, Duration::from_millis(10)),
    );

    let tally = scheduler
        .run(
            DownloadRequest::from_urls(vec![url.clone(), url.clone(), url]),
            &NoopProgress,
        )
        .await;

    assert_eq!(tally.succeeded, 3);
    assert!(dir.path().join("cat.gif").exists());
    assert!(dir.path().join("cat0.gif").exists());
    assert!(dir.path().join("cat1.gif").exists());
}

#[tokio::test]
async fn test_gate_limits_request_rate() {
    let server = MockServer::start().await;
    for i in 0..6 {
        mount_gif(&server, &format!("/r/{}.gif", i)).await;
    }
    let urls: Vec<String> = (0..6)
        .map(|i| format!("{}/r/{}.gif", server.uri(), i))
        .collect();

    let dir = TempDir::new().unwrap();
    let scheduler = Scheduler::new(
        reqwest::Client::new(),
        Arc::new(FsMediaStore::new(dir.path(), "gif")),
        settings(2, Duration::from_millis(200)),
    );

    let started = Instant::now();
    let tally = scheduler
        .run(DownloadRequest::from_urls(urls), &NoopProgress)
        .await;

    // The 5th and 6th requests cannot start before two full release windows
    assert!(started.elapsed() >= Duration::from_millis(400));
    assert_eq!(tally.succeeded, 6);
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_existing_output_dir_aborts_before_network() {
    let server = MockServer::start().await;
    mount_gif(&server, "/a.gif").await;

    let dir = TempDir::new().unwrap();
    write_package(dir.path(), &[format!("{}/a.gif", server.uri())]);
    let config = create_test_config(dir.path(), &server);
    std::fs::create_dir(&config.paths.output_dir).unwrap();

    let result = run(&config, &NoopProgress).await;

    assert!(matches!(
        result,
        Err(GrabError::Precheck(PrecheckError::OutputDirExists(_)))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!config.paths.report_path.exists());
}

#[tokio::test]
async fn test_missing_report_dir_aborts_before_network() {
    let server = MockServer::start().await;
    mount_gif(&server, "/a.gif").await;

    let dir = TempDir::new().unwrap();
    write_package(dir.path(), &[format!("{}/a.gif", server.uri())]);
    let mut config = create_test_config(dir.path(), &server);
    config.paths.report_path = dir.path().join("reports").join("failed_downloads.json");

    let result = run(&config, &NoopProgress).await;

    assert!(matches!(
        result,
        Err(GrabError::Precheck(PrecheckError::ReportDirMissing(_)))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!config.paths.output_dir.exists());
}

#[tokio::test]
async fn test_missing_member_aborts_without_artifacts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &server);

    let mut zip = ZipWriter::new(File::create(&config.paths.package_path).unwrap());
    zip.start_file("messages/index.json", FileOptions::default())
        .unwrap();
    zip.write_all(b"{}").unwrap();
    zip.finish().unwrap();

    let result = run(&config, &NoopProgress).await;

    assert!(matches!(
        result,
        Err(GrabError::Precheck(PrecheckError::MemberMissing { .. }))
    ));
    assert!(!config.paths.output_dir.exists());
    assert!(!config.paths.report_path.exists());
}

#[tokio::test]
async fn test_empty_favorites_writes_empty_report() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_package(dir.path(), &[]);
    let config = create_test_config(dir.path(), &server);

    let summary = run(&config, &NoopProgress).await.unwrap();

    assert_eq!(summary.total, 0);
    assert!(config.paths.output_dir.is_dir());
    let report: FailureReport =
        serde_json::from_str(&std::fs::read_to_string(&config.paths.report_path).unwrap())
            .unwrap();
    assert!(report.is_empty());
}

#[test]
fn test_plan_lists_urls_without_side_effects() {
    let dir = TempDir::new().unwrap();
    write_package(
        dir.path(),
        &[
            "https://media.discordapp.net/attachments/1/2/one.gif".to_string(),
            "https://media.tenor.com/two.gif".to_string(),
            "https://images-ext-2.media.discordapp.net/three.gif".to_string(),
        ],
    );

    let mut config = Config::default();
    config.paths.package_path = dir.path().join("package.zip");
    config.paths.output_dir = dir.path().join("gifs");
    config.paths.report_path = dir.path().join("failed_downloads.json");

    let media = plan(&config).unwrap();

    assert_eq!(media.favorites_found, 3);
    assert_eq!(
        media.urls,
        vec![
            "https://media.discordapp.net/attachments/1/2/one.gif".to_string(),
            "https://images-ext-2.media.discordapp.net/three.gif".to_string(),
        ]
    );
    assert!(!config.paths.output_dir.exists());
    assert!(!config.paths.report_path.exists());
}
