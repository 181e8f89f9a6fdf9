//! End-to-end driver runs against a wiremock server and temporary directories.

use std::path::Path;

use deptdir_lib::{
    read_records, Client, ClientConfig, DeptDirError, Driver, ExistingPolicy, ExtractError, Record, RoleTag,
    RunOptions, SiteCatalog,
};
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> Client {
    Client::with_config(ClientConfig {
        max_retries: 0,
        ..ClientConfig::immediate()
    })
    .expect("client")
}

fn options(root: &Path) -> RunOptions {
    RunOptions::new(root.join("downloads"), root.join("processed"))
}

fn rec(name: &str, title: RoleTag, email: Option<&str>) -> Record {
    Record {
        name: name.to_string(),
        title,
        email: email.map(str::to_string),
    }
}

fn table_catalog(base: &str) -> SiteCatalog {
    SiteCatalog::parse(&format!(
        r#"
[[site]]
id = "example"
name = "Example University"
adapter = "table"

[[site.source]]
category = "phd"
url = "{base}/people?page={{page}}"
pagination = {{ kind = "fixed", count = 3, start = 0 }}

[site.table]
header = ["Name", "Email"]
name_column = 0
email_column = 1
"#
    ))
    .unwrap()
}

fn table_page(rows: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><table><tr><th>Name</th><th>Email</th></tr>");
    for (name, email) in rows {
        html.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>", name, email));
    }
    html.push_str("</table></body></html>");
    html
}

async fn mount_table_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/people"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn stanford_catalog(base: &str) -> SiteCatalog {
    SiteCatalog::parse(&format!(
        r#"
[[site]]
id = "stanford"
name = "Stanford University, Computer Science"
email_domain = "stanford.edu"

[[site.source]]
category = "phd"
url = "{base}/directory/phd-students"
method = "POST"
page_form_field = "page"
pagination = {{ kind = "marker", prefix = "<i>Page 1 of ", suffix = "</i>" }}
"#
    ))
    .unwrap()
}

fn stanford_page(name: &str, user: &str) -> String {
    format!(
        "<html><body><table><tr><th>Name</th><th>Office</th><th>Phone</th><th>Email</th></tr>\
         <tr><td>{}</td><td></td><td></td><td>{}</td></tr></table></body></html>",
        name, user
    )
}

async fn mount_stanford_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("POST"))
        .and(path("/directory/phd-students"))
        .and(body_string(format!("page={}", page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_stanford(server: &MockServer) {
    let first = std::fs::read_to_string("tests/fixtures/stanford_phd.html").unwrap();
    mount_stanford_page(server, 1, first).await;
    mount_stanford_page(server, 2, stanford_page("Chen, Mei", "mchen")).await;
    mount_stanford_page(server, 3, stanford_page("Vu, Kim", "")).await;
}

#[tokio::test]
async fn marker_pagination_posts_every_page() {
    let mock_server = MockServer::start().await;
    mount_stanford(&mock_server).await;
    let dir = tempfile::tempdir().unwrap();

    let driver = Driver::new(stanford_catalog(&mock_server.uri()), client(), options(dir.path()));
    let report = driver.run(&[]).await.unwrap();

    let site = &report.sites[0];
    assert_eq!(site.site, "stanford");
    assert_eq!(site.pages.fetched, 3);
    assert_eq!(site.pages.written, 3);
    assert_eq!(site.pages.failed, 0);
    assert_eq!(site.tally.get(RoleTag::Phd).records, 5);
    assert_eq!(site.tally.get(RoleTag::Phd).with_email, 3);
    assert_eq!(report.fetch.requests_made, 3);

    let processed = dir.path().join("processed").join("stanford").join("phd");
    assert_eq!(
        read_records(&processed.join("page-2.txt")).await.unwrap(),
        vec![rec("Mei Chen", RoleTag::Phd, Some("mchen@stanford.edu"))]
    );
    assert_eq!(
        read_records(&processed.join("page-3.txt")).await.unwrap(),
        vec![rec("Kim Vu", RoleTag::Phd, None)]
    );
    assert!(dir
        .path()
        .join("downloads/stanford/phd/page-1.html")
        .exists());
}

#[tokio::test]
async fn second_run_reuses_downloads() {
    let mock_server = MockServer::start().await;
    mount_stanford(&mock_server).await;
    let dir = tempfile::tempdir().unwrap();
    let catalog = stanford_catalog(&mock_server.uri());

    Driver::new(catalog.clone(), client(), options(dir.path()))
        .run(&[])
        .await
        .unwrap();
    let report = Driver::new(catalog, client(), options(dir.path()))
        .run(&["stanford".to_string()])
        .await
        .unwrap();

    let site = &report.sites[0];
    assert_eq!(site.pages.cache_hits, 3);
    assert_eq!(site.pages.fetched, 0);
    assert_eq!(site.pages.written, 3);
    assert_eq!(report.fetch.requests_made, 0);
}

#[tokio::test]
async fn kept_artifacts_are_not_reparsed() {
    let mock_server = MockServer::start().await;
    mount_stanford(&mock_server).await;
    let dir = tempfile::tempdir().unwrap();

    let earlier = "{\"name\":\"Old Entry\",\"title\":\"phd\"}\n";
    let kept = dir.path().join("processed/stanford/phd/page-1.txt");
    std::fs::create_dir_all(kept.parent().unwrap()).unwrap();
    std::fs::write(&kept, earlier).unwrap();
    let before = std::fs::metadata(&kept).unwrap().modified().unwrap();

    let mut options = options(dir.path());
    options.processed_policy = ExistingPolicy::Skip;
    let report = Driver::new(stanford_catalog(&mock_server.uri()), client(), options)
        .run(&[])
        .await
        .unwrap();

    let site = &report.sites[0];
    assert_eq!(site.pages.skipped, 1);
    assert_eq!(site.pages.written, 2);
    // The kept page contributes the records it holds, not the ones its download would give.
    assert_eq!(site.tally.get(RoleTag::Phd).records, 3);
    assert_eq!(site.tally.get(RoleTag::Phd).with_email, 1);
    assert_eq!(std::fs::read_to_string(&kept).unwrap(), earlier);
    assert_eq!(std::fs::metadata(&kept).unwrap().modified().unwrap(), before);
}

#[tokio::test]
async fn resumed_run_counts_kept_records() {
    let mock_server = MockServer::start().await;
    mount_stanford(&mock_server).await;
    let dir = tempfile::tempdir().unwrap();
    let catalog = stanford_catalog(&mock_server.uri());
    let mut options = options(dir.path());
    options.processed_policy = ExistingPolicy::Skip;

    let first = Driver::new(catalog.clone(), client(), options.clone())
        .run(&[])
        .await
        .unwrap();
    let second = Driver::new(catalog, client(), options).run(&[]).await.unwrap();

    assert_eq!(first.sites[0].pages.written, 3);
    assert_eq!(second.sites[0].pages.skipped, 3);
    assert_eq!(second.sites[0].pages.written, 0);
    assert_eq!(second.total().total_records(), first.total().total_records());
    assert_eq!(second.total().total_with_email(), 3);
}

#[tokio::test]
async fn failed_page_is_reported_and_skipped() {
    let mock_server = MockServer::start().await;
    mount_table_page(&mock_server, "0", table_page(&[("Doe, Jane", "jdoe@example.edu")])).await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_table_page(&mock_server, "2", table_page(&[("Roe, Rick", "")])).await;
    let dir = tempfile::tempdir().unwrap();

    let driver = Driver::new(table_catalog(&mock_server.uri()), client(), options(dir.path()));
    let report = driver.run(&[]).await.unwrap();

    let site = &report.sites[0];
    assert_eq!(site.pages.fetched, 2);
    assert_eq!(site.pages.written, 2);
    assert_eq!(site.pages.failed, 1);

    let failures: Vec<_> = report.failed_pages().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].page, 2);
    assert_eq!(failures[0].category, "phd");
    assert!(failures[0].url.ends_with("/people?page=1"), "{}", failures[0].url);

    let processed = dir.path().join("processed/example/phd");
    assert!(!processed.join("page-2.txt").exists());
    assert_eq!(
        read_records(&processed.join("page-3.txt")).await.unwrap(),
        vec![rec("Rick Roe", RoleTag::Phd, None)]
    );
    assert_eq!(report.total().total_records(), 2);
}

#[tokio::test]
async fn structural_failure_aborts_the_run() {
    let mock_server = MockServer::start().await;
    mount_table_page(&mock_server, "0", "<html><body><p>Directory moved</p></body></html>".to_string()).await;
    let dir = tempfile::tempdir().unwrap();

    let driver = Driver::new(table_catalog(&mock_server.uri()), client(), options(dir.path()));
    match driver.run(&[]).await {
        Err(DeptDirError::Extract {
            site,
            category,
            page,
            source: ExtractError::AnchorCount { .. },
        }) => {
            assert_eq!((site.as_str(), category.as_str(), page), ("example", "phd", 1));
        }
        other => panic!("expected extraction failure, got {:?}", other),
    }
    assert!(!dir.path().join("processed/example/phd/page-1.txt").exists());
}

#[tokio::test]
async fn unavailable_first_page_skips_marker_source() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/directory/phd-students"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let report = Driver::new(stanford_catalog(&mock_server.uri()), client(), options(dir.path()))
        .run(&[])
        .await
        .unwrap();
    assert_eq!(report.sites[0].pages.failed, 1);
    assert_eq!(report.sites[0].pages.written, 0);
}

#[tokio::test]
async fn missing_page_count_marker_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_stanford_page(&mock_server, 1, stanford_page("Doe, Jane", "jdoe")).await;
    let dir = tempfile::tempdir().unwrap();

    let result = Driver::new(stanford_catalog(&mock_server.uri()), client(), options(dir.path()))
        .run(&[])
        .await;
    assert!(matches!(result, Err(DeptDirError::PageCount { .. })), "{:?}", result.err());
}

#[tokio::test]
async fn unknown_site_is_rejected_before_any_request() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let driver = Driver::new(table_catalog(&mock_server.uri()), client(), options(dir.path()));
    let result = driver.run(&["example".to_string(), "mit".to_string()]).await;
    assert!(matches!(result, Err(DeptDirError::UnknownSite(id)) if id == "mit"));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
