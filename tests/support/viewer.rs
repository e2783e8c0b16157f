//! Fake viewer documents mounted on a wiremock server.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// How a fake page responds.
#[derive(Debug, Clone, Copy)]
pub enum FakePage {
    /// Page document points at an image whose body is the page id.
    Image,
    /// Page document carries the restricted placeholder.
    Restricted,
    /// Page document has neither an image nor the placeholder.
    Broken,
    /// Page document request fails with the given status.
    Status(u16),
}

/// Page id used for the page at `index`.
pub fn page_id(index: usize) -> String {
    format!("PA{}", index + 1)
}

/// Cover document with an `_OC_Run` payload listing `page_ids` in order,
/// declaring UTF-8 through the `ie` input element.
pub fn cover_html(server: &MockServer, book_id: &str, page_ids: &[String], title: &str, attribution: &str) -> String {
    let hint = r#"<form><input type=hidden name="ie" value="UTF-8"></form>"#;
    cover_document(server, book_id, page_ids, title, attribution, hint)
}

/// Cover document without an encoding hint, encoded as ISO-8859-15.
pub fn legacy_cover_bytes(server: &MockServer, book_id: &str, page_ids: &[String], title: &str, attribution: &str) -> Vec<u8> {
    let html = cover_document(server, book_id, page_ids, title, attribution, "");
    let (bytes, _, unmappable) = encoding_rs::ISO_8859_15.encode(&html);
    assert!(!unmappable, "fixture text must be representable in ISO-8859-15");
    bytes.into_owned()
}

fn cover_document(
    server: &MockServer,
    book_id: &str,
    page_ids: &[String],
    title: &str,
    attribution: &str,
    hint: &str,
) -> String {
    let pages: Vec<String> = page_ids
        .iter()
        .enumerate()
        .map(|(order, pid)| format!(r#"{{"pid":"{pid}","order":{order}}}"#))
        .collect();
    format!(
        r#"<html><head><title>{title}</title></head><body>
{hint}
<script>_OC_Run({{"page":[{pages}],"prefix":"{uri}/books?id={book_id}&hl=en"}}, {{"title":"{title}","attribution":"{attribution}"}}, {{}});</script>
</body></html>"#,
        pages = pages.join(","),
        uri = server.uri(),
    )
}

/// Page document showing `image_url`.
pub fn image_page_html(image_url: &str) -> String {
    format!(
        r#"<html><body><div class="pageImageDisplay" style='background-image:url("{image_url}")'></div></body></html>"#
    )
}

/// Page document for a page outside the preview.
pub fn restricted_page_html() -> String {
    r#"<html><body><img src="/googlebooks/restricted_logo.gif"></body></html>"#.to_string()
}

/// Image URL served for `pid`.
pub fn image_url(server: &MockServer, pid: &str) -> String {
    format!("{}/content/{pid}.png", server.uri())
}

/// Mounts the cover document for `book_id`.
pub async fn mount_cover(server: &MockServer, book_id: &str, body: impl Into<Vec<u8>>) {
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("id", book_id))
        .and(query_param("printsec", "frontcover"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Mounts the page document (and image, when present) for `pid`.
pub async fn mount_page(server: &MockServer, pid: &str, page: FakePage) {
    let response = match page {
        FakePage::Image => {
            ResponseTemplate::new(200).set_body_string(image_page_html(&image_url(server, pid)))
        }
        FakePage::Restricted => ResponseTemplate::new(200).set_body_string(restricted_page_html()),
        FakePage::Broken => {
            ResponseTemplate::new(200).set_body_string("<html><body>nothing here</body></html>")
        }
        FakePage::Status(status) => ResponseTemplate::new(status),
    };
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("pg", pid))
        .respond_with(response)
        .mount(server)
        .await;

    if matches!(page, FakePage::Image) {
        Mock::given(method("GET"))
            .and(path(format!("/content/{pid}.png")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(pid.as_bytes().to_vec()))
            .mount(server)
            .await;
    }
}

/// Mounts a whole book whose page `i` behaves as `pages[i]`.
pub async fn mount_book(server: &MockServer, book_id: &str, title: &str, attribution: &str, pages: &[FakePage]) {
    let ids: Vec<String> = (0..pages.len()).map(page_id).collect();
    mount_cover(server, book_id, cover_html(server, book_id, &ids, title, attribution)).await;
    for (pid, page) in ids.iter().zip(pages) {
        mount_page(server, pid, *page).await;
    }
}
