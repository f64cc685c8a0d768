//! End-to-end crawl against a mock origin.
//!
//! Serves sitemaps and product pages from wiremock and checks the full
//! pipeline: discovery, the budget-bounded walk, extraction, category
//! growth, and the CSV files.

use shopcrawl::crawler::{self, CrawlRequest};
use shopcrawl::extract::ChainPolicy;
use shopcrawl::ident;
use shopcrawl::net::HttpClient;
use shopcrawl::sitemap::{discover_entrypoints, SitemapWalker};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn product_page(name: &str, price: &str, sub_crumb: &str) -> String {
    format!(
        r#"<html><head>
        <meta property="og:image" content="https://cdn.example.com/img.jpg">
        </head><body>
        <nav class="breadcrumb"><ul>
          <li><a href="/">Trang chủ</a></li>
          <li><a href="/dien-thoai">Điện thoại</a></li>
          <li><a href="/dien-thoai/x">{sub_crumb}</a></li>
        </ul></nav>
        <h1>{name}</h1>
        <div>Giá sản phẩm: <strong>{price}đ</strong></div>
        <button>Mua ngay</button>
        </body></html>"#
    )
}

async fn mount(server: &MockServer, route: &str, content_type: &str, body: impl Into<Vec<u8>>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.into(), content_type))
        .mount(server)
        .await;
}

fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn test_client() -> HttpClient {
    HttpClient::new(None, Duration::from_secs(5))
}

#[tokio::test]
async fn crawl_end_to_end_writes_both_csvs() {
    let server = MockServer::start().await;
    let base = server.uri();

    let index = format!(
        "<?xml version=\"1.0\"?><sitemapindex>\
         <sitemap><loc>{base}/sitemap/product-sitemap1.xml</loc></sitemap>\
         <sitemap><loc>{base}/sitemap.xml</loc></sitemap>\
         </sitemapindex>"
    );
    let urlset = format!(
        "<?xml version=\"1.0\"?><urlset>\
         <url><loc>{base}/p/galaxy-s24.html</loc></url>\
         <url><loc>{base}/p/iphone-15.html</loc></url>\
         <url><loc>{base}/p/ignored.php</loc></url>\
         </urlset>"
    );

    mount(&server, "/sitemap.xml", "application/xml", index).await;
    mount(&server, "/sitemap/product-sitemap1.xml", "application/xml", urlset).await;
    mount(
        &server,
        "/p/galaxy-s24.html",
        "text/html",
        product_page("Samsung Galaxy S24 Ultra", "27.280.000", "Samsung Galaxy"),
    )
    .await;
    mount(
        &server,
        "/p/iphone-15.html",
        "text/html",
        product_page("iPhone 15 Pro Max", "31.990.000", "iPhone"),
    )
    .await;

    let outdir = tempfile::tempdir().unwrap();
    let summary = crawler::run(CrawlRequest {
        base_url: base.clone(),
        limit: Some(10),
        delay: Duration::ZERO,
        user_agent: None,
        out_dir: outdir.path().to_path_buf(),
        page_suffix: ".html".to_string(),
        namespace: "testshop".to_string(),
        chain_policy: ChainPolicy::default(),
    })
    .await
    .unwrap();

    assert_eq!(summary.products, 2);
    assert!(!summary.interrupted);

    let categories = std::fs::read_to_string(&summary.files.categories_csv).unwrap();
    let cat_lines: Vec<&str> = categories.lines().collect();
    assert_eq!(cat_lines[0], "id,name,parent_id,is_popular");
    // dien-thoai plus its two children.
    assert_eq!(cat_lines.len(), 4);

    let top_pos = cat_lines.iter().position(|l| l.contains("Điện thoại")).unwrap();
    let sub_pos = cat_lines.iter().position(|l| l.contains("Samsung Galaxy")).unwrap();
    assert!(top_pos < sub_pos, "parent row must precede child row");
    assert!(cat_lines[top_pos].ends_with(",true"), "Điện thoại is a popular top category");

    let products = std::fs::read_to_string(&summary.files.products_csv).unwrap();
    assert!(products.starts_with("id,name,price,description,image_url,is_available,category_id"));
    assert!(products.contains("Samsung Galaxy S24 Ultra"));
    assert!(products.contains("27280000"));
    assert!(!products.contains("ignored"), "non-.html entries are dropped");

    // The product's category_id is the deterministic ID of its deepest node.
    let sub_id = ident::category_id("testshop", "dien-thoai/samsung-galaxy")
        .unwrap()
        .to_string();
    assert!(categories.contains(&sub_id));
    assert!(products.contains(&sub_id));
}

#[tokio::test]
async fn walk_terminates_on_cycles_and_respects_budget() {
    let server = MockServer::start().await;
    let base = server.uri();

    // a.xml and b.xml reference each other; b.xml also points at leaves.
    let a = format!(
        "<sitemapindex>\
         <sitemap><loc>{base}/b.xml</loc></sitemap>\
         <sitemap><loc>{base}/a.xml</loc></sitemap>\
         </sitemapindex>"
    );
    let b = format!(
        "<sitemapindex>\
         <sitemap><loc>{base}/a.xml</loc></sitemap>\
         <sitemap><loc>{base}/leaves.xml</loc></sitemap>\
         </sitemapindex>"
    );
    let entries: String = (0..10)
        .map(|i| format!("<url><loc>{base}/p/item-{i}.html</loc></url>"))
        .collect();
    let leaves = format!("<urlset>{entries}</urlset>");

    mount(&server, "/a.xml", "application/xml", a).await;
    mount(&server, "/b.xml", "application/xml", b).await;
    mount(&server, "/leaves.xml", "application/xml", leaves).await;

    let client = test_client();
    let entry = vec![format!("{base}/a.xml")];

    let mut unbounded = SitemapWalker::new(&client, None, ".html");
    let all = unbounded.walk(&entry).await;
    assert_eq!(all.len(), 10, "cycle must not prevent reaching the leaves");

    let mut bounded = SitemapWalker::new(&client, Some(5), ".html");
    let capped = bounded.walk(&entry).await;
    assert_eq!(capped.len(), 5, "budget caps the yield even mid-branch");
}

#[tokio::test]
async fn shared_child_is_visited_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    // The same child sitemap is reachable through two index entries.
    let a = format!(
        "<sitemapindex>\
         <sitemap><loc>{base}/b.xml</loc></sitemap>\
         <sitemap><loc>{base}/b.xml</loc></sitemap>\
         </sitemapindex>"
    );
    let b = format!(
        "<urlset>\
         <url><loc>{base}/p/one.html</loc></url>\
         <url><loc>{base}/p/two.html</loc></url>\
         </urlset>"
    );
    mount(&server, "/a.xml", "application/xml", a).await;
    mount(&server, "/b.xml", "application/xml", b).await;

    let client = test_client();
    let mut walker = SitemapWalker::new(&client, None, ".html");
    let urls = walker.walk(&[format!("{base}/a.xml")]).await;
    assert_eq!(urls.len(), 2, "leaves behind a shared child count once");
}

#[tokio::test]
async fn discovery_falls_back_to_numeric_enumeration() {
    let server = MockServer::start().await;
    let base = server.uri();

    // No root index at all; only numbered product sitemaps exist.
    for n in 1..=2 {
        let urlset = format!("<urlset><url><loc>{base}/p/n{n}.html</loc></url></urlset>");
        mount(
            &server,
            &format!("/sitemap/product-sitemap{n}.xml"),
            "application/xml",
            urlset,
        )
        .await;
    }

    let client = test_client();
    let entrypoints = discover_entrypoints(&client, &base).await;
    assert_eq!(entrypoints.len(), 2);

    let mut walker = SitemapWalker::new(&client, None, ".html");
    let urls = walker.walk(&entrypoints).await;
    assert_eq!(urls.len(), 2);
}

#[tokio::test]
async fn gzip_compressed_sitemap_is_decoded() {
    let server = MockServer::start().await;
    let base = server.uri();

    let urlset = format!("<urlset><url><loc>{base}/p/zipped.html</loc></url></urlset>");
    mount(
        &server,
        "/sitemap/product-sitemap1.xml.gz",
        "application/x-gzip",
        gzip_bytes(urlset.as_bytes()),
    )
    .await;

    let client = test_client();
    let entrypoints = discover_entrypoints(&client, &base).await;
    assert!(entrypoints.iter().any(|e| e.ends_with(".xml.gz")));

    let mut walker = SitemapWalker::new(&client, None, ".html");
    let urls = walker.walk(&entrypoints).await;
    assert_eq!(urls, vec![format!("{base}/p/zipped.html")]);
}

#[tokio::test]
async fn unknown_document_shape_contributes_nothing() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(&server, "/a.xml", "text/html", "<html><body>maintenance page</body></html>").await;

    let client = test_client();
    let mut walker = SitemapWalker::new(&client, None, ".html");
    let urls = walker.walk(&[format!("{base}/a.xml"), format!("{base}/missing.xml")]).await;
    assert!(urls.is_empty());
}
