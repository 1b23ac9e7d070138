//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock news sites and test the full
//! topic-then-article crawl end-to-end over HTTP.

use topic_harvest::config::{parse_config, Config};
use topic_harvest::crawler::{crawl, Crawler};
use topic_harvest::extract::FieldValue;
use topic_harvest::storage::{ArticleStore, JsonFileSink, SqliteStore};
use topic_harvest::{CrawlPhase, FetchError, HarvestError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a FAZ-style test configuration rooted at the mock server
fn create_test_config(root: &str, output: &str, crawl: &str) -> Config {
    let toml = format!(
        r#"
[site]
root-url = "{root}"
topic-class = "lay-MegaMenu_SectionTitleLink"
article-class = "js-hlp-LinkSwap js-tsr-Base_ContentLink tsr-Base_ContentLink"
newspaper = "faz"

[fetch]
max-attempts = 3
base-delay-ms = 10
backoff = "exponential"
timeout-secs = 5

[crawl]
{crawl}

[output]
{output}

[[field]]
name = "headline"
tag = "span"
class = "atc-HeadlineText"

[[field]]
name = "author"
tag = "a"
class = "atc-MetaAuthorLink"

[[field]]
name = "comments"
tag = "ul"
class = "ctn-PageFunctions_List js-sharebuttons"
attribute = "data-comment-value"

[[field]]
name = "recommendation"
tag = "ul"
class = "ctn-PageFunctions_List js-sharebuttons"
attribute = "data-empfehlen-value"
"#
    );
    parse_config(&toml).expect("test config should be valid")
}

fn root_page(base: &str) -> String {
    format!(
        r#"<html><body><nav>
            <a class="lay-MegaMenu_SectionTitleLink" href="{base}/politik/">Politik</a>
            <a class="lay-MegaMenu_SectionTitleLink" href="{base}/sport/">Sport</a>
            <a class="lay-MegaMenu_SectionTitleLink" href="https://elsewhere.test/reise/">Reise</a>
        </nav></body></html>"#
    )
}

fn topic_page(links: &[String]) -> String {
    let teasers: String = links
        .iter()
        .map(|link| {
            format!(
                r#"<article><a class="js-hlp-LinkSwap js-tsr-Base_ContentLink tsr-Base_ContentLink" href="{link}">Teaser</a></article>"#
            )
        })
        .collect();
    format!("<html><body>{teasers}</body></html>")
}

fn article_page(headline: &str) -> String {
    format!(
        r#"<html><body>
            <h1><span class="atc-HeadlineText"> {headline} </span></h1>
            <a class="atc-MetaAuthorLink">Anna Autorin</a>
            <ul class="ctn-PageFunctions_List js-sharebuttons" data-comment-value="12" data-empfehlen-value="3"></ul>
            <p class="atc-TextParagraph">Erster Absatz über den <a class="rtr-entity">Bundestag</a>.</p>
            <p class="atc-TextParagraph">Zweiter Absatz über die <a class="rtr-entity">SPD</a>.</p>
            <ul class="ctn-PageFunctions_List js-sharebuttons" data-comment-value="12" data-empfehlen-value="3"></ul>
        </body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mounts a site with a two-article politik section and an empty sport section
async fn mount_site(server: &MockServer) {
    let base = server.uri();
    mount_html(server, "/", root_page(&base)).await;
    mount_html(
        server,
        "/politik/",
        topic_page(&[
            format!("{base}/politik/wahl.html"),
            format!("{base}/politik/haushalt.html"),
            "https://elsewhere.test/politik/fremd.html".to_string(),
        ]),
    )
    .await;
    mount_html(server, "/sport/", topic_page(&[])).await;
    mount_html(server, "/politik/wahl.html", article_page("Wahl in Berlin")).await;
    mount_html(server, "/politik/haushalt.html", article_page("Haushalt beschlossen")).await;
}

#[tokio::test]
async fn test_full_crawl_collects_records_per_topic() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let config = create_test_config(&base, r#"database-path = "unused.db""#, "");
    let mut crawler = Crawler::from_config(&config).expect("Failed to create crawler");
    let results = crawler.run(None, &[]).await.expect("Crawl failed");

    assert_eq!(results.topic_names().collect::<Vec<_>>(), vec!["politik", "sport"]);
    assert!(results.get("sport").unwrap().is_empty());

    let politik = results.get("politik").unwrap();
    assert_eq!(politik.len(), 2);

    let record = &politik[0];
    assert_eq!(record.get("headline"), Some(&FieldValue::from("Wahl in Berlin")));
    assert_eq!(record.get("author"), Some(&FieldValue::from("Anna Autorin")));
    assert_eq!(record.get("comments"), Some(&FieldValue::from("12")));
    assert_eq!(record.get("recommendation"), Some(&FieldValue::from("3")));
    assert_eq!(record.get("paragraphs"), Some(&FieldValue::Count(2)));
    assert_eq!(record.get("nr_external_references"), Some(&FieldValue::Count(2)));
    assert_eq!(
        record.get("text"),
        Some(&FieldValue::from(
            "Erster Absatz über den Bundestag.Zweiter Absatz über die SPD."
        ))
    );
    assert_eq!(record.section(), Some("politik"));
    assert_eq!(record.link(), Some(format!("{base}/politik/wahl.html").as_str()));
    assert_eq!(record.newspaper(), Some("faz"));
    assert!(!record.contains_key("time"));

    assert_eq!(
        politik[1].get("headline"),
        Some(&FieldValue::from("Haushalt beschlossen"))
    );
    assert_eq!(crawler.phase(), CrawlPhase::Done);
}

#[tokio::test]
async fn test_sqlite_sink_is_idempotent_across_runs() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("articles.db");
    let output = format!("database-path = {:?}", db_path.to_string_lossy());
    let config = create_test_config(&base, &output, "");

    for _ in 0..2 {
        let mut store = SqliteStore::new(&db_path).expect("Failed to open store");
        store.create_run("test-hash").unwrap();
        let report = crawl(&config, &mut store).await.expect("Crawl failed");

        assert_eq!(report.topics_crawled, 2);
        assert_eq!(report.records_written, 2);
    }

    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(store.count_articles().unwrap(), 2);
    assert_eq!(
        store.count_by_section().unwrap(),
        vec![("politik".to_string(), 2)]
    );

    let stored = store
        .get_article("faz", &format!("{base}/politik/haushalt.html"))
        .unwrap()
        .expect("article should be stored");
    assert_eq!(stored.get("headline"), Some(&FieldValue::from("Haushalt beschlossen")));
}

#[tokio::test]
async fn test_json_sink_writes_one_file_per_non_empty_topic() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        &server.uri(),
        &format!("sink = \"json\"\njson-dir = {:?}", dir.path().to_string_lossy()),
        "",
    );

    let mut sink = JsonFileSink::new(dir.path(), "faz").unwrap();
    let report = crawl(&config, &mut sink).await.expect("Crawl failed");

    assert_eq!(report.records_written, 2);
    assert_eq!(sink.written_files().len(), 1);

    let path = &sink.written_files()[0];
    let name = path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("faz_politik_"), "unexpected file {name}");
    assert!(name.ends_with(".json"));

    let content = std::fs::read_to_string(path).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["section"], "politik");
    assert_eq!(records[0]["paragraphs"], 2);
}

#[tokio::test]
async fn test_transient_server_error_is_retried() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/politik/wahl.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_html(&server, "/", root_page(&base)).await;
    mount_html(&server, "/politik/", topic_page(&[format!("{base}/politik/wahl.html")])).await;
    mount_html(&server, "/sport/", topic_page(&[])).await;
    mount_html(&server, "/politik/wahl.html", article_page("Wahl in Berlin")).await;

    let config = create_test_config(&base, r#"database-path = "unused.db""#, "");
    let mut crawler = Crawler::from_config(&config).unwrap();
    let results = crawler.run(None, &[]).await.expect("Crawl failed");

    assert_eq!(results.get("politik").unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_root_aborts_after_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), r#"database-path = "unused.db""#, "");
    let mut crawler = Crawler::from_config(&config).unwrap();
    let result = crawler.run(None, &[]).await;

    match result {
        Err(HarvestError::Fetch(FetchError::RetriesExhausted { attempts, last, .. })) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, FetchError::Status { status: 500, .. }));
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
    assert_eq!(crawler.phase(), CrawlPhase::Init);
}

#[tokio::test]
async fn test_missing_root_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), r#"database-path = "unused.db""#, "");
    let mut crawler = Crawler::from_config(&config).unwrap();
    let result = crawler.discover_topics().await;

    assert!(matches!(
        result,
        Err(HarvestError::Fetch(FetchError::Status { status: 404, .. }))
    ));
}

#[tokio::test]
async fn test_missing_article_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(&server, "/", root_page(&base)).await;
    mount_html(
        &server,
        "/politik/",
        topic_page(&[
            format!("{base}/politik/geloescht.html"),
            format!("{base}/politik/wahl.html"),
        ]),
    )
    .await;
    mount_html(&server, "/sport/", topic_page(&[])).await;
    mount_html(&server, "/politik/wahl.html", article_page("Wahl in Berlin")).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("articles.db");
    let config = create_test_config(
        &base,
        &format!("database-path = {:?}", db_path.to_string_lossy()),
        r#"keep-topics = ["politik"]"#,
    );

    let mut store = SqliteStore::new(&db_path).unwrap();
    let report = crawl(&config, &mut store).await.expect("Crawl failed");

    assert_eq!(report.topics_crawled, 1);
    assert_eq!(report.articles_extracted, 1);
    assert_eq!(report.articles_skipped, 1);
    assert_eq!(store.count_articles().unwrap(), 1);
}

#[tokio::test]
async fn test_abort_policy_ends_topic_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(&server, "/", root_page(&base)).await;
    mount_html(
        &server,
        "/politik/",
        topic_page(&[
            format!("{base}/politik/geloescht.html"),
            format!("{base}/politik/wahl.html"),
        ]),
    )
    .await;
    mount_html(&server, "/politik/wahl.html", article_page("Wahl in Berlin")).await;
    mount_html(&server, "/sport/", topic_page(&[format!("{base}/sport/spiel.html")])).await;
    mount_html(&server, "/sport/spiel.html", article_page("Pokalspiel")).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("articles.db");
    let config = create_test_config(
        &base,
        &format!("database-path = {:?}", db_path.to_string_lossy()),
        "on-article-error = \"abort\"\nconcurrency = 2",
    );

    let mut store = SqliteStore::new(&db_path).unwrap();
    let report = crawl(&config, &mut store).await.expect("Crawl failed");

    assert_eq!(report.topics_aborted, 1);
    assert_eq!(report.topics_crawled, 2);
    assert_eq!(report.articles_extracted, 1);
    assert_eq!(
        store.count_by_section().unwrap(),
        vec![("sport".to_string(), 1)]
    );
}

#[test]
fn test_shipped_faz_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/faz.toml");
    let config = topic_harvest::config::load_config(&path).expect("faz.toml should load");

    assert_eq!(config.site.newspaper, "faz");
    let names: Vec<&str> = config.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["time", "headline", "headline_emphasis", "author", "comments", "recommendation"]
    );
}
