//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for a Wikidot site's feed and AJAX
//! endpoint and run full passes end-to-end against an on-disk database.

use forumwatch::crawler::Coordinator;
use forumwatch::feed::WikidotFeed;
use forumwatch::model::{Category, PostId, PostRecord, SiteRecord, ThreadId, ThreadMeta};
use forumwatch::remote::WikidotThreadSource;
use forumwatch::storage::{open_storage, RunStatus, SqliteStorage, Storage};
use reqwest::Client;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn feed_xml(items: &[&str]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Recent posts</title>
    <link>http://wiki.wikidot.com/forum/start</link>
    <description>Recent forum posts</description>"#,
    );
    for link in items {
        xml.push_str(&format!(
            "\n    <item><title>post</title><guid>{link}</guid><link>{link}</link></item>"
        ));
    }
    xml.push_str("\n  </channel>\n</rss>\n");
    xml
}

/// A single-page thread body as returned by `ForumViewThreadModule`
fn thread_page(title: &str, posts: &[u64]) -> String {
    let mut html = format!(
        r##"<div class="forum-breadcrumbs"><a href="/forum/start">Forum</a> &raquo; <a href="/forum/c-7/general">General</a> &raquo; {title}</div>
        <div class="description-block"><div class="statistics">
        Started by: <span class="printuser"><a href="#">alice</a></span>
        Date: <span class="odate time_1600000000">d</span></div></div>"##
    );
    for n in posts {
        html.push_str(&format!(
            r##"<div class="post-container"><div class="post" id="post-{n}"><div class="long">
            <div class="head"><div class="title">Re</div><div class="info"><span class="printuser"><a href="#">user{n}</a></span>
            <span class="odate time_{n}">d</span></div></div>
            <div class="content"><p>post {n}</p></div></div></div></div>"##
        ));
    }
    html
}

fn module_ok(html: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(serde_json::json!({ "status": "ok", "body": html }).to_string())
}

fn coordinator(
    server: &MockServer,
    storage: SqliteStorage,
) -> Coordinator<WikidotFeed, WikidotThreadSource, SqliteStorage> {
    let client = Client::new();
    let feed = WikidotFeed::new(client.clone(), format!("{}/{{site}}/feed.xml", server.uri()));
    let source = WikidotThreadSource::new(client, format!("{}/{{site}}/ajax", server.uri()));
    Coordinator::new(feed, source, storage, "test-hash")
}

/// Storage that already holds thread 1 with post 1 for site "wiki"
fn seeded_storage(dir: &TempDir) -> SqliteStorage {
    let mut storage = open_storage(&dir.path().join("forumwatch.db")).unwrap();
    storage
        .store_supported_sites(&[SiteRecord::new("wiki", false)])
        .unwrap();

    let meta = ThreadMeta {
        thread_id: ThreadId::new("t-1"),
        category: Category {
            id: "7".to_string(),
            name: "General".to_string(),
        },
        title: "Old thread".to_string(),
        creator_username: Some("alice".to_string()),
        created_timestamp: 1_500_000_000,
    };
    storage.store_thread("wiki", &meta.category, &meta).unwrap();
    storage
        .store_post(
            "wiki",
            &PostRecord {
                id: PostId::new("post-1"),
                thread_id: ThreadId::new("t-1"),
                parent_id: None,
                title: None,
                author: "alice".to_string(),
                created_timestamp: 1_500_000_000,
                content: "<p>first</p>".to_string(),
            },
        )
        .unwrap();
    storage
}

#[tokio::test]
async fn test_pass_fetches_only_what_is_new() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let base = "http://wiki.wikidot.com";
    Mock::given(method("GET"))
        .and(path("/wiki/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_xml(&[
            &format!("{base}/forum/t-1/old-thread#post-1"),
            &format!("{base}/forum/t-1/old-thread#post-2"),
            &format!("{base}/forum/t-2/new-thread#post-3"),
            &format!("{base}/some-page"),
        ])))
        .mount(&server)
        .await;

    // New thread: fetched in full, one page
    Mock::given(method("POST"))
        .and(path("/wiki/ajax"))
        .and(body_string_contains("&t=2&"))
        .and(body_string_contains("pageNo=1"))
        .respond_with(module_ok(thread_page("New thread", &[3])))
        .expect(1)
        .mount(&server)
        .await;

    // Known thread: only the page holding post 2
    Mock::given(method("POST"))
        .and(path("/wiki/ajax"))
        .and(body_string_contains("&t=1&"))
        .and(body_string_contains("postId=2"))
        .respond_with(module_ok(thread_page("Old thread", &[1, 2])))
        .expect(1)
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&server, seeded_storage(&dir));

    let summary = coordinator.run_all().await.unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.reports.len(), 1);

    let report = &summary.reports[0];
    assert_eq!(report.malformed_items, 1);
    assert_eq!(report.feed_entries, 3);
    assert_eq!(report.tasks_planned, 2);
    assert_eq!(report.tasks_fetched, 2);

    let storage = coordinator.storage();
    let thread = storage.get_thread(&ThreadId::new("t-2")).unwrap().unwrap();
    assert_eq!(thread.title, "New thread");
    assert_eq!(thread.category.id, "7");

    let post = storage.get_post(&PostId::new("post-3")).unwrap().unwrap();
    assert_eq!(post.author, "user3");
    assert_eq!(post.thread_id, ThreadId::new("t-2"));
    assert!(storage.get_post(&PostId::new("post-2")).unwrap().is_some());
    assert_eq!(storage.count_posts().unwrap(), 3);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");

    // Everything in the feed is now known, so the next pass fetches nothing
    let summary = coordinator.run_all().await.unwrap();
    assert_eq!(summary.reports[0].tasks_planned, 0);
}

#[tokio::test]
async fn test_unavailable_feed_is_retried_next_pass() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/wiki/feed.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(module_ok(String::new()))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&server, seeded_storage(&dir));
    let summary = coordinator.run_all().await.unwrap();

    assert!(summary.is_success());
    assert!(summary.reports[0].feed_unavailable);
    assert_eq!(coordinator.storage().count_posts().unwrap(), 1);
}

#[tokio::test]
async fn test_failed_thread_fetch_keeps_other_tasks() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let base = "http://wiki.wikidot.com";
    Mock::given(method("GET"))
        .and(path("/wiki/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_xml(&[
            &format!("{base}/forum/t-5/broken#post-50"),
            &format!("{base}/forum/t-6/fine#post-60"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("&t=5&"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            serde_json::json!({ "status": "not_ok", "message": "thread unavailable" }).to_string(),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("&t=6&"))
        .respond_with(module_ok(thread_page("Fine", &[60])))
        .expect(1)
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&server, seeded_storage(&dir));
    let summary = coordinator.run_all().await.unwrap();

    let report = &summary.reports[0];
    assert_eq!(report.tasks_failed, 1);
    assert_eq!(report.tasks_fetched, 1);

    let storage = coordinator.storage();
    assert!(storage.get_thread(&ThreadId::new("t-5")).unwrap().is_none());
    assert!(storage.get_post(&PostId::new("post-60")).unwrap().is_some());
}
