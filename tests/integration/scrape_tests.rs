//! Integration tests for page extraction
//!
//! These tests serve HTML from wiremock and run the extractor and batch
//! scraper through the static-HTML page implementation.

use forge_harvest::extract::{
    BatchScraper, ExtractedRecord, Extractor, FieldSelectors, JsonFileSink, RecordCollection,
};
use forge_harvest::page::{PageError, SessionLauncher, StaticLauncher};
use forge_harvest::HarvestError;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_HTML: &str = r#"<html><head><title>Products</title></head><body>
    <div class="inventory_list">
        <div class="inventory_item">
            <img class="inventory_item_img" alt="Widget" src="/img/widget.png">
            <div class="inventory_item_price">$9.99</div>
        </div>
        <div class="inventory_item">
            <img class="inventory_item_img" alt="Gadget" src="/img/gadget.png">
            <div class="inventory_item_price">
                $19.99
            </div>
        </div>
        <div class="inventory_item">
            <img class="inventory_item_img" src="/img/free.png">
            <div class="inventory_item_price">$0</div>
        </div>
    </div>
</body></html>"#;

fn launcher() -> StaticLauncher {
    StaticLauncher::default().with_poll_interval(Duration::from_millis(20))
}

fn batch_scraper(listing_url: &str) -> BatchScraper {
    BatchScraper::new(
        listing_url,
        ".inventory_item",
        FieldSelectors {
            price: ".inventory_item_price".to_string(),
            image: ".inventory_item_img".to_string(),
        },
    )
    .with_wait_timeout(Duration::from_millis(200))
}

fn page_extractor() -> Extractor {
    Extractor::new(
        FieldSelectors {
            price: ".price".to_string(),
            image: ".inventory_item_img".to_string(),
        },
        Duration::from_millis(200),
    )
}

async fn serve_html(mock_server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_batch_scrape_writes_records() {
    let mock_server = MockServer::start().await;
    serve_html(&mock_server, "/products", LISTING_HTML).await;
    let listing_url = format!("{}/products", mock_server.uri());

    let dir = tempdir().unwrap();
    let output = dir.path().join("product_data.json");
    let sink = JsonFileSink::new(&output);

    let records = batch_scraper(&listing_url)
        .run(&launcher(), &sink)
        .await
        .expect("Scrape failed");

    let expected = [
        ("$9.99", "Widget"),
        ("$19.99", "Gadget"),
        ("$0", ""),
    ];
    assert_eq!(records.len(), expected.len());
    for (record, (price, alt)) in records.iter().zip(expected) {
        assert_eq!(record.price, price);
        assert_eq!(record.image_alt_text, alt);
        assert_eq!(record.source_url, listing_url);
    }

    let written: RecordCollection =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written, records);
}

#[tokio::test]
async fn test_batch_scrape_table_listing() {
    let mock_server = MockServer::start().await;
    serve_html(
        &mock_server,
        "/table",
        r#"<html><body><table class="inventory">
            <tr class="inventory_item">
                <td><img class="inventory_item_img" alt="Widget"></td>
                <td class="inventory_item_price">$9.99</td>
            </tr>
            <tr class="inventory_item">
                <td><img class="inventory_item_img"></td>
                <td class="inventory_item_price">$0</td>
            </tr>
        </table></body></html>"#,
    )
    .await;
    let listing_url = format!("{}/table", mock_server.uri());

    let dir = tempdir().unwrap();
    let sink = JsonFileSink::new(dir.path().join("product_data.json"));

    let records = batch_scraper(&listing_url)
        .run(&launcher(), &sink)
        .await
        .expect("Rows should be readable");

    let records = records.as_slice();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].price, "$9.99");
    assert_eq!(records[0].image_alt_text, "Widget");
    assert_eq!(records[1].price, "$0");
    assert_eq!(records[1].image_alt_text, "");
}

#[tokio::test]
async fn test_batch_scrape_without_items_fails() {
    let mock_server = MockServer::start().await;
    serve_html(&mock_server, "/products", "<html><body><p>Maintenance</p></body></html>").await;
    let listing_url = format!("{}/products", mock_server.uri());

    let dir = tempdir().unwrap();
    let output = dir.path().join("product_data.json");
    let sink = JsonFileSink::new(&output);

    let result = batch_scraper(&listing_url).run(&launcher(), &sink).await;

    match result {
        Err(HarvestError::Enumeration { url, source }) => {
            assert_eq!(url, listing_url);
            assert!(matches!(source, PageError::Timeout { .. }));
        }
        other => panic!("expected an enumeration failure, got {:?}", other.map(|r| r.len())),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_extract_page_with_missing_price() {
    let mock_server = MockServer::start().await;
    serve_html(
        &mock_server,
        "/item/4",
        r#"<html><body><img class="inventory_item_img" alt="Sauce Labs Backpack"></body></html>"#,
    )
    .await;
    let url = format!("{}/item/4", mock_server.uri());

    let mut session = launcher().launch().await.unwrap();
    let mut page = session.new_page().await.unwrap();
    let record = page_extractor().extract(page.as_mut(), &url).await;
    session.close().await.unwrap();

    assert_eq!(record.price, "");
    assert_eq!(record.image_alt_text, "Sauce Labs Backpack");
    assert_eq!(record.source_url, url);
}

#[tokio::test]
async fn test_extract_page_trims_price() {
    let mock_server = MockServer::start().await;
    serve_html(
        &mock_server,
        "/item/5",
        r#"<html><body>
            <span class="price">
                $29.99
            </span>
            <img class="inventory_item_img" alt="Bike Light">
        </body></html>"#,
    )
    .await;
    let url = format!("{}/item/5", mock_server.uri());

    let mut session = launcher().launch().await.unwrap();
    let mut page = session.new_page().await.unwrap();
    let record = page_extractor().extract(page.as_mut(), &url).await;
    session.close().await.unwrap();

    assert_eq!(record.price, "$29.99");
    assert_eq!(record.image_alt_text, "Bike Light");
}

#[tokio::test]
async fn test_extract_missing_page_returns_url_only() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    let url = format!("{}/item/404", mock_server.uri());

    let mut session = launcher().launch().await.unwrap();
    let mut page = session.new_page().await.unwrap();
    let record = page_extractor().extract(page.as_mut(), &url).await;
    session.close().await.unwrap();

    assert_eq!(record, ExtractedRecord::for_url(url));
}

#[tokio::test]
async fn test_wait_picks_up_late_content() {
    let mock_server = MockServer::start().await;

    // First fetch has no items; later fetches do
    Mock::given(method("GET"))
        .and(path("/late"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    serve_html(&mock_server, "/late", LISTING_HTML).await;
    let url = format!("{}/late", mock_server.uri());

    let mut session = launcher().launch().await.unwrap();
    let mut page = session.new_page().await.unwrap();
    page.navigate(&url).await.unwrap();
    page.wait_for_selector(".inventory_item", Duration::from_millis(500))
        .await
        .expect("Items should appear after a reload");
    assert_eq!(page.query_all(".inventory_item").await.unwrap().len(), 3);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_wait_is_bounded_by_slow_reload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(LISTING_HTML)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    let url = format!("{}/slow", mock_server.uri());

    let mut session = launcher().launch().await.unwrap();
    let mut page = session.new_page().await.unwrap();
    page.navigate(&url).await.unwrap();

    let started = Instant::now();
    let result = page
        .wait_for_selector(".inventory_item_price", Duration::from_millis(200))
        .await;
    let waited = started.elapsed();
    session.close().await.unwrap();

    assert!(matches!(result, Err(PageError::Timeout { timeout_ms: 200, .. })));
    assert!(waited < Duration::from_secs(1), "waited {:?}", waited);
}
