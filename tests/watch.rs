//! End-to-end cycle against a mocked timetable and webhook.

use std::fs;

use httpmock::prelude::*;
use seatwatch::models::{Config, NotificationKey};
use seatwatch::pipeline::Watcher;

const OPEN_PAGE: &str = r#"<html><body>
    <table class="dataentrytable">
      <tr><td class="deleft">CRN</td><td>Course</td><td>Title</td></tr>
      <tr><td class="dedefault"><b>12345</b></td><td>CS-1014</td><td>Intro to Problem Solving</td></tr>
    </table></body></html>"#;

fn config(server: &MockServer, dir: &tempfile::TempDir, rows: &str) -> Config {
    let csv = dir.path().join("course_subscriptions.csv");
    fs::write(&csv, format!("desc,campus,term_year,crn,ntfy_url\n{rows}")).unwrap();

    let mut config = Config::default();
    config.watcher.target_url = server.url("/ssb/HZSKVTSC.P_ProcRequest");
    config.watcher.subscriptions_file = csv.display().to_string();
    config.backoff.step_secs = 1;
    config.logging.debug = true;
    config.logging.log_file = dir.path().join("debug_output.log").display().to_string();
    config
}

#[tokio::test]
async fn open_section_posts_one_notification() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();

    let timetable = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/ssb/HZSKVTSC.P_ProcRequest")
                .header("user-agent", "Mozilla/5.0 (compatible; VTTT-SCPR/v0.1)")
                .form_urlencoded_tuple("CAMPUS", "0")
                .form_urlencoded_tuple("TERMYEAR", "202501")
                .form_urlencoded_tuple("crn", "12345")
                .form_urlencoded_tuple("open_only", "on");
            then.status(200).body(OPEN_PAGE);
        })
        .await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .body("COURSE OPENING FOR CRN: 12345");
            then.status(200);
        })
        .await;

    let rows = format!("CS101,0,202501,12345,{}\n", server.url("/hook"));
    let config = config(&server, &dir, &rows);
    let mut watcher = Watcher::from_config(&config).unwrap();

    let first = watcher.run_cycle().await;
    let second = watcher.run_cycle().await;

    timetable.assert_calls_async(2).await;
    hook.assert_calls_async(1).await;
    assert_eq!(first.notifications_sent, 1);
    assert_eq!(second.already_notified, 1);
    assert!(
        watcher
            .state()
            .notified
            .contains(&NotificationKey::new("12345", "CS101"))
    );

    let log = fs::read_to_string(dir.path().join("debug_output.log")).unwrap();
    assert!(log.contains("Availability found *** (Notification sent)"));
    assert!(log.contains("(User already notified)"));
}

#[tokio::test]
async fn upstream_error_skips_without_notifying() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock_async(|when, then| {
            when.method(POST).path("/ssb/HZSKVTSC.P_ProcRequest");
            then.status(503);
        })
        .await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST).path("/hook");
            then.status(200);
        })
        .await;

    let rows = format!("CS101,0,202501,12345,{}\n", server.url("/hook"));
    let config = config(&server, &dir, &rows);
    let mut watcher = Watcher::from_config(&config).unwrap();

    let report = watcher.run_cycle().await;

    assert_eq!(report.transport_failures, 1);
    assert_eq!(watcher.state().backoff.failures(), 1);
    hook.assert_calls_async(0).await;
}

#[tokio::test]
async fn failing_webhook_leaves_key_unrecorded() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock_async(|when, then| {
            when.method(POST).path("/ssb/HZSKVTSC.P_ProcRequest");
            then.status(200).body(OPEN_PAGE);
        })
        .await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST).path("/hook");
            then.status(500);
        })
        .await;

    let rows = format!("CS101,0,202501,12345,{}\n", server.url("/hook"));
    let config = config(&server, &dir, &rows);
    let mut watcher = Watcher::from_config(&config).unwrap();

    let first = watcher.run_cycle().await;
    let second = watcher.run_cycle().await;

    assert_eq!(first.notification_failures, 1);
    assert_eq!(second.notification_failures, 1);
    assert!(watcher.state().notified.is_empty());
    hook.assert_calls_async(2).await;
}
