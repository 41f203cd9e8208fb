//! Downloads against a mock HTTP server

use cloudstream_cache::{CacheError, OfflineCache};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

async fn serve(body: &[u8], expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.flac"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

// ============================================================================
// Downloads
// ============================================================================

#[tokio::test]
async fn downloads_once_then_serves_from_disk() {
    let body = vec![7u8; 64 * 1024];
    let server = serve(&body, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let mut cache = OfflineCache::open(dir.path()).unwrap();
    let url = format!("{}/a.flac", server.uri());

    let mut reports = Vec::new();
    let bytes = cache
        .download_and_cache("a", &url, |p| reports.push(p))
        .await
        .unwrap();
    assert_eq!(bytes, body);
    assert!(!reports.is_empty());
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*reports.last().unwrap(), 1.0);

    let entry = cache.entry("a").unwrap();
    assert_eq!(entry.size, body.len() as u64);
    assert_eq!(entry.source.as_deref(), Some(url.as_str()));

    let mut called = false;
    let again = cache
        .download_and_cache("a", &url, |_| called = true)
        .await
        .unwrap();
    assert_eq!(again, body);
    assert!(!called);
}

#[tokio::test]
async fn survives_reopen() {
    let server = serve(b"abc", 1).await;
    let dir = tempfile::tempdir().unwrap();
    let url = format!("{}/a.flac", server.uri());

    {
        let mut cache = OfflineCache::open(dir.path()).unwrap();
        cache.download_and_cache("a", &url, |_| {}).await.unwrap();
    }

    let mut cache = OfflineCache::open(dir.path()).unwrap();
    let bytes = cache.download_and_cache("a", &url, |_| {}).await.unwrap();
    assert_eq!(bytes, b"abc");
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn non_success_status_is_an_error_and_caches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cache = OfflineCache::open(dir.path()).unwrap();
    let err = cache
        .download_and_cache("a", &format!("{}/missing.flac", server.uri()), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, CacheError::Http { status: 404, .. }));
    assert!(!cache.has("a"));
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = OfflineCache::open(dir.path()).unwrap();
    let err = cache
        .download_and_cache("a", "http://127.0.0.1:1/a.flac", |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, CacheError::Request(_)));
}
