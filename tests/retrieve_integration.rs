//! Integration tests for page retrieval against a fake viewer.

use pagegrab_core::{BookRetriever, ErrorKind, FetchSettings, PageRange, PageUnit, RetrieveError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;
use support::viewer::{
    FakePage, cover_html, image_page_html, legacy_cover_bytes, mount_book, mount_cover, mount_page,
    page_id,
};

fn retriever(server: &MockServer) -> BookRetriever {
    BookRetriever::with_base_url(FetchSettings::default(), &server.uri()).unwrap()
}

async fn collect_pages(
    server: &MockServer,
    input: &str,
    range: PageRange,
) -> Result<Vec<PageUnit>, RetrieveError> {
    let mut sequence = retriever(server).open(input, range).await?;
    let mut units = Vec::new();
    while let Some(unit) = sequence.next_page().await? {
        units.push(unit);
    }
    Ok(units)
}

fn page_requests(requests: &[wiremock::Request]) -> usize {
    requests
        .iter()
        .filter(|r| r.url.query_pairs().any(|(k, _)| k == "pg"))
        .count()
}

#[tokio::test]
async fn test_restricted_page_is_skipped_and_numbering_keeps_gap() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_book(
        &server,
        "GAP",
        "Gapped",
        "By Jane Doe",
        &[FakePage::Image, FakePage::Restricted, FakePage::Image],
    )
    .await;

    let units = collect_pages(&server, "GAP", PageRange::new(0, Some(3)))
        .await
        .unwrap();

    let numbers: Vec<usize> = units.iter().map(|u| u.page_number).collect();
    assert_eq!(numbers, vec![0, 2]);
    assert_eq!(units[0].image.as_ref(), b"PA1");
    assert_eq!(units[1].image.as_ref(), b"PA3");
    assert_eq!(units[0].book.title, "Gapped");
    assert_eq!(units[0].book.attribution, "Jane Doe");
}

#[tokio::test]
async fn test_viewer_url_input_resolves_to_same_book() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_book(&server, "URLBOOK", "Linked", "", &[FakePage::Image]).await;

    let input = "https://books.google.com/books?hl=en&id=URLBOOK&pg=PA1#v=onepage";
    let units = collect_pages(&server, input, PageRange::all()).await.unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].book.attribution, "");
}

#[tokio::test]
async fn test_cover_without_encoding_hint_is_read_as_latin9() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let ids = vec![page_id(0)];
    let cover = legacy_cover_bytes(&server, "LEGACY", &ids, "Café € Notes", "By Renée Dupré");
    assert!(std::str::from_utf8(&cover).is_err());
    mount_cover(&server, "LEGACY", cover).await;
    mount_page(&server, &ids[0], FakePage::Image).await;

    let units = collect_pages(&server, "LEGACY", PageRange::all()).await.unwrap();

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].book.title, "Café € Notes");
    assert_eq!(units[0].book.attribution, "Renée Dupré");
    assert_eq!(units[0].image.as_ref(), b"PA1");
}

#[tokio::test]
async fn test_missing_payload_fails_before_any_page_request() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_cover(&server, "NOPE", "<html><body>no viewer here</body></html>".to_string()).await;

    let err = retriever(&server)
        .open("NOPE", PageRange::all())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parsing);
    assert!(err.to_string().contains("printsec=frontcover"), "{err}");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_cover_http_error_is_network_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = retriever(&server)
        .open("DOWN", PageRange::all())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_session_cookie_from_cover_is_sent_with_page_requests() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let ids = vec![page_id(0)];
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("printsec", "frontcover"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "NID=viewer-session; Path=/")
                .set_body_string(cover_html(&server, "COOKIE", &ids, "Jar", "")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("pg", "PA1"))
        .and(header("cookie", "NID=viewer-session"))
        .respond_with(ResponseTemplate::new(200).set_body_string(image_page_html(&format!(
            "{}/content/PA1.png",
            server.uri()
        ))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/content/PA1.png"))
        .and(header("cookie", "NID=viewer-session"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"IMG".to_vec()))
        .mount(&server)
        .await;

    let units = collect_pages(&server, "COOKIE", PageRange::all()).await.unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].image.as_ref(), b"IMG");
}

#[tokio::test]
async fn test_page_http_error_ends_sequence_and_stays_fused() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_book(
        &server,
        "FAIL",
        "Failing",
        "",
        &[FakePage::Image, FakePage::Status(404), FakePage::Image],
    )
    .await;

    let mut sequence = retriever(&server)
        .open("FAIL", PageRange::all())
        .await
        .unwrap();

    let first = sequence.next_page().await.unwrap().unwrap();
    assert_eq!(first.page_number, 0);

    let err = sequence.next_page().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.to_string().contains("pg=PA2"), "{err}");

    assert!(sequence.next_page().await.unwrap().is_none());
    assert!(sequence.next_page().await.unwrap().is_none());
    assert_eq!(sequence.remaining(), 0);

    // Page 3 is never requested once the sequence has failed.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(page_requests(&requests), 2);
    assert_eq!(first.image.as_ref(), b"PA1");
}

#[tokio::test]
async fn test_page_without_image_or_marker_is_parsing_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_book(&server, "ODD", "Odd", "", &[FakePage::Broken]).await;

    let err = collect_pages(&server, "ODD", PageRange::all())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parsing);
    assert!(err.to_string().contains("pg=PA1"), "{err}");
}

#[tokio::test]
async fn test_page_range_limits_requests() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_book(&server, "RANGE", "Ranged", "", &[FakePage::Image; 5]).await;

    let units = collect_pages(&server, "RANGE", PageRange::new(1, Some(3)))
        .await
        .unwrap();
    let numbers: Vec<usize> = units.iter().map(|u| u.page_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(page_requests(&requests), 2);
}

#[tokio::test]
async fn test_page_range_past_end_is_empty() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_book(&server, "SHORT", "Short", "", &[FakePage::Image; 2]).await;

    let units = collect_pages(&server, "SHORT", PageRange::new(7, None))
        .await
        .unwrap();
    assert!(units.is_empty());

    let units = collect_pages(&server, "SHORT", PageRange::new(1, Some(99)))
        .await
        .unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].page_number, 1);
}

#[tokio::test]
async fn test_no_request_until_pulled() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_book(&server, "LAZY", "Lazy", "", &[FakePage::Image; 3]).await;

    let mut sequence = retriever(&server)
        .open("LAZY", PageRange::all())
        .await
        .unwrap();
    let requests = server.received_requests().await.unwrap();
    assert_eq!(page_requests(&requests), 0);

    sequence.next_page().await.unwrap().unwrap();
    let requests = server.received_requests().await.unwrap();
    assert_eq!(page_requests(&requests), 1);
    assert_eq!(sequence.remaining(), 2);
}

#[tokio::test]
async fn test_image_url_is_fetched_exactly_as_found() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let ids = vec![page_id(0)];
    mount_cover(&server, "EXACT", cover_html(&server, "EXACT", &ids, "Exact", "")).await;
    let image_url = format!(
        "{}/books/content?id=EXACT&pg=PA1&img=1&zoom=3&sig=ACfU3U2",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("pg", "PA1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(image_page_html(&image_url)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/books/content"))
        .and(query_param("sig", "ACfU3U2"))
        .and(query_param("zoom", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .mount(&server)
        .await;

    let units = collect_pages(&server, "EXACT", PageRange::all()).await.unwrap();
    assert_eq!(units[0].image.as_ref(), &[0x89, b'P', b'N', b'G']);
}
