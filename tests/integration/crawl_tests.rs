//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from the first request to the
//! snapshot files on disk.

use gallery_crawler::config::{Config, EmptyOutputPolicy};
use gallery_crawler::crawler::{crawl, crawl_with_session};
use gallery_crawler::index::Cursor;
use gallery_crawler::storage::{JsonSnapshotStore, PageSnapshot, SnapshotStore};
use gallery_crawler::{CrawlError, Credential, Session, SessionError};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches requests that do not carry the given query parameter
struct WithoutQueryParam(&'static str);

impl Match for WithoutQueryParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == self.0)
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = format!("{}/", base_url);
    config.crawler.output_dir = output_dir.to_path_buf();
    config.crawler.request_timeout_secs = 5;
    config.retry.max_attempts = 3;
    config.retry.initial_delay_ms = 0;
    config.retry.max_delay_ms = 0;
    config
}

fn create_test_session() -> Session {
    let credential = Credential::new("ipb_member_id=42", "TEST_COOKIE").unwrap();
    Session::from_credential(&credential, None).unwrap()
}

fn row(gid: u64, title: &str) -> String {
    format!(
        r#"<tr>
            <td class="gl2c">
                <div class="glthumb"><div><img data-src="/t/{gid}.jpg" src=""></div></div>
                <div id="posted_{gid}">2024-03-1{gid} 08:30</div>
            </td>
            <td class="gl3c glname"><a href="/g/{gid}/token/"><div class="glink">{title}</div></a></td>
        </tr>"#,
        gid = gid % 10,
        title = title
    )
}

/// Renders a listing page; `prev` and `next` are the pagination hrefs
fn listing(rows: &[String], prev: Option<&str>, next: Option<&str>) -> String {
    let prev = prev
        .map(|href| format!(r#"<a id="dprev" href="{}">&lt; Prev</a>"#, href))
        .unwrap_or_else(|| r#"<span id="dprev">&lt; Prev</span>"#.to_string());
    let next = next
        .map(|href| format!(r#"<a id="dnext" href="{}">Next &gt;</a>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><body>
        <div class="searchnav">{prev}{next}</div>
        <table class="itg gltm">
            <tr><th>Published</th><th>Title</th></tr>
            {rows}
        </table>
        </body></html>"#,
        prev = prev,
        next = next,
        rows = rows.join("\n")
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn read_snapshot(dir: &TempDir, cursor: u64) -> PageSnapshot {
    JsonSnapshotStore::new(dir.path())
        .read(Cursor::new(cursor))
        .unwrap()
        .unwrap_or_else(|| panic!("snapshot {} missing", cursor))
}

#[tokio::test]
async fn test_crawl_from_empty_directory_follows_chain() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("f_cats", "1021"))
        .and(query_param("f_search", "-translated"))
        .and(query_param("f_sfl", "on"))
        .and(WithoutQueryParam("prev"))
        .and(header("cookie", "ipb_member_id=42"))
        .respond_with(html(listing(
            &[row(1, "First gallery"), row(2, "Second gallery")],
            Some("/?f_cats=1021&prev=101"),
            Some("/?f_cats=1021&next=100"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("prev", "101"))
        .and(header("cookie", "ipb_member_id=42"))
        .respond_with(html(listing(&[], None, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let report = crawl_with_session(config, create_test_session())
        .await
        .unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(report.pages_persisted, 2);
    assert_eq!(report.items_persisted, 2);
    assert_eq!(report.last_cursor, Some(Cursor::new(101)));

    let first = read_snapshot(&output, 100);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].title, "First gallery");
    assert_eq!(
        first.items[0].link,
        format!("{}/g/1/token/", mock_server.uri())
    );
    assert_eq!(
        first.items[0].thumbnail,
        format!("{}/t/1.jpg", mock_server.uri())
    );
    assert_eq!(first.items[1].date, "2024-03-12 08:30");
    assert_eq!(
        first.next_page,
        Some(format!("{}/?f_cats=1021&prev=101", mock_server.uri()))
    );

    let last = read_snapshot(&output, 101);
    assert!(last.items.is_empty());
    assert_eq!(last.next_page, None);
    assert!(last.page.contains("prev=101"));
}

#[tokio::test]
async fn test_crawl_resumes_from_highest_snapshot() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    for name in ["9.json", "12.json", "15.json"] {
        std::fs::write(output.path().join(name), "{}").unwrap();
    }

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("f_cats", "1021"))
        .and(query_param("prev", "15"))
        .and(header("cookie", "ipb_member_id=42"))
        .respond_with(html(listing(
            &[row(3, "Resumed")],
            Some("?f_cats=1021&prev=16"),
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("prev", "16"))
        .respond_with(html(listing(&[row(4, "Oldest")], None, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path());
    crawl_with_session(config, create_test_session())
        .await
        .unwrap();

    assert_eq!(read_snapshot(&output, 15).items[0].title, "Resumed");
    assert_eq!(read_snapshot(&output, 16).items[0].title, "Oldest");

    let cursors = JsonSnapshotStore::new(output.path()).cursors().unwrap();
    assert_eq!(cursors.last(), Some(&Cursor::new(16)));
}

#[tokio::test]
async fn test_failed_attempt_restarts_from_last_snapshot() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    std::fs::write(output.path().join("10.json"), "{}").unwrap();

    // Requested once per attempt: 11 is never persisted by the first one
    Mock::given(method("GET"))
        .and(query_param("prev", "10"))
        .respond_with(html(listing(&[row(1, "Ten")], Some("/?prev=11"), None)))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("prev", "11"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("prev", "11"))
        .respond_with(html(listing(&[row(2, "Eleven")], None, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let report = crawl_with_session(config, create_test_session())
        .await
        .unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(report.pages_persisted, 3);
    assert_eq!(read_snapshot(&output, 10).items[0].title, "Ten");
    assert_eq!(read_snapshot(&output, 11).items[0].title, "Eleven");
}

#[tokio::test]
async fn test_server_set_cookie_does_not_replace_session() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    std::fs::write(output.path().join("10.json"), "{}").unwrap();

    Mock::given(method("GET"))
        .and(query_param("prev", "10"))
        .and(header("cookie", "ipb_member_id=42"))
        .respond_with(
            html(listing(&[row(1, "Ten")], Some("/?prev=11"), None))
                .append_header("set-cookie", "ipb_member_id=0; Path=/"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("prev", "11"))
        .and(header("cookie", "ipb_member_id=42"))
        .respond_with(html(listing(&[row(2, "Eleven")], None, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let report = crawl_with_session(config, create_test_session())
        .await
        .unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(read_snapshot(&output, 11).items[0].title, "Eleven");
}

#[tokio::test]
async fn test_persistent_server_error_exhausts_retries() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    std::fs::write(output.path().join("10.json"), "{}").unwrap();

    Mock::given(method("GET"))
        .and(query_param("prev", "10"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let err = crawl_with_session(config, create_test_session())
        .await
        .unwrap_err();

    match err {
        CrawlError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, CrawlError::Status { status: 500, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The seeded snapshot is untouched
    assert_eq!(
        std::fs::read_to_string(output.path().join("10.json")).unwrap(),
        "{}"
    );
}

#[tokio::test]
async fn test_login_page_is_not_persisted() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    std::fs::write(output.path().join("10.json"), "{}").unwrap();

    Mock::given(method("GET"))
        .respond_with(html(
            "<html><body><p>This page requires you to log on.</p></body></html>".to_string(),
        ))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let err = crawl_with_session(config, create_test_session())
        .await
        .unwrap_err();

    match err {
        CrawlError::RetriesExhausted { last, .. } => {
            assert!(matches!(*last, CrawlError::Extraction { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        std::fs::read_to_string(output.path().join("10.json")).unwrap(),
        "{}"
    );
}

#[tokio::test]
async fn test_missing_credential_is_fatal() {
    let output = TempDir::new().unwrap();

    let mut config = create_test_config("http://127.0.0.1:9", output.path());
    config.session.credential_var = "GALLERY_CRAWLER_TEST_UNSET_CREDENTIAL".to_string();

    let err = crawl(config).await.unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Session(SessionError::MissingCredential { .. })
    ));
    assert!(!err.is_recoverable());
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_refuse_policy_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), output.path());
    config.crawler.empty_output = EmptyOutputPolicy::Refuse;

    let err = crawl_with_session(config, create_test_session())
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::ResumeAmbiguity { .. }));
}
