//! HTML parser for Wikidot forum thread pages
//!
//! The thread module returns one page of a thread as an HTML fragment:
//! - breadcrumbs naming the category and the thread title
//! - a description block with the thread's creator and creation date
//! - the posts of the requested page, replies nested in `div.post-container`
//! - a pager listing the other pages

use crate::model::{Category, PostId, PostRecord, ThreadId, ThreadMeta};
use crate::remote::RemoteError;
use scraper::{ElementRef, Html, Selector};

/// Everything extracted from one page of a thread
#[derive(Debug, Clone)]
pub struct ThreadPage {
    /// Only parsed when asked for
    pub meta: Option<ThreadMeta>,
    pub posts: Vec<PostRecord>,
    /// Total number of pages in the thread
    pub page_count: u32,
}

/// Parses one thread page
///
/// # Arguments
///
/// * `html` - The module body
/// * `thread_id` - The thread the page belongs to
/// * `with_meta` - Whether to extract thread metadata as well
pub fn parse_thread_page(
    html: &str,
    thread_id: &ThreadId,
    with_meta: bool,
) -> Result<ThreadPage, RemoteError> {
    let document = Html::parse_fragment(html);

    let meta = if with_meta {
        Some(parse_meta(&document, thread_id)?)
    } else {
        None
    };

    Ok(ThreadPage {
        meta,
        posts: parse_posts(&document, thread_id)?,
        page_count: parse_page_count(&document),
    })
}

fn selector(css: &str) -> Result<Selector, RemoteError> {
    Selector::parse(css).map_err(|e| RemoteError::Html(format!("bad selector {}: {:?}", css, e)))
}

fn parse_meta(document: &Html, thread_id: &ThreadId) -> Result<ThreadMeta, RemoteError> {
    let breadcrumbs = document
        .select(&selector("div.forum-breadcrumbs")?)
        .next()
        .ok_or_else(|| RemoteError::Html("missing forum breadcrumbs".to_string()))?;

    let category = breadcrumbs
        .select(&selector("a[href]")?)
        .find_map(|link| {
            let href = link.value().attr("href")?;
            let id = category_id_from_href(href)?;
            Some(Category {
                id,
                name: text_of(&link),
            })
        })
        .ok_or_else(|| RemoteError::Html("missing thread category".to_string()))?;

    let title = breadcrumb_title(&breadcrumbs)
        .ok_or_else(|| RemoteError::Html("missing thread title".to_string()))?;

    let statistics = document
        .select(&selector("div.description-block div.statistics")?)
        .next()
        .ok_or_else(|| RemoteError::Html("missing thread description block".to_string()))?;

    let creator_username = statistics
        .select(&selector("span.printuser")?)
        .next()
        .and_then(|user| printuser_name(&user));

    let created_timestamp = statistics
        .select(&selector("span.odate")?)
        .next()
        .and_then(|date| odate_timestamp(&date))
        .ok_or_else(|| RemoteError::Html("missing thread creation date".to_string()))?;

    Ok(ThreadMeta {
        thread_id: thread_id.clone(),
        category,
        title,
        creator_username,
        created_timestamp,
    })
}

fn parse_posts(document: &Html, thread_id: &ThreadId) -> Result<Vec<PostRecord>, RemoteError> {
    let post_selector = selector("div.post[id]")?;
    let author_selector = selector("div.info span.printuser")?;
    let date_selector = selector("div.info span.odate")?;
    let title_selector = selector("div.title")?;
    let content_selector = selector("div.content")?;

    let mut posts = Vec::new();

    for post in document.select(&post_selector) {
        let Some(id) = post.value().attr("id").and_then(post_id_from_attr) else {
            continue;
        };

        let author = post
            .select(&author_selector)
            .next()
            .and_then(|user| printuser_name(&user))
            .unwrap_or_else(|| "(account deleted)".to_string());

        let created_timestamp = post
            .select(&date_selector)
            .next()
            .and_then(|date| odate_timestamp(&date))
            .ok_or_else(|| RemoteError::Html(format!("missing date for {}", id)))?;

        let title = post
            .select(&title_selector)
            .next()
            .map(|el| text_of(&el))
            .filter(|s| !s.is_empty());

        let content = post
            .select(&content_selector)
            .next()
            .map(|el| el.inner_html().trim().to_string())
            .unwrap_or_default();

        posts.push(PostRecord {
            parent_id: parent_post_id(&post),
            id,
            thread_id: thread_id.clone(),
            title,
            author,
            created_timestamp,
            content,
        });
    }

    Ok(posts)
}

/// Highest page number mentioned in the pager, or 1 without a pager
fn parse_page_count(document: &Html) -> u32 {
    let Ok(pages) = Selector::parse("div.pager span.target, div.pager span.current") else {
        return 1;
    };

    document
        .select(&pages)
        .filter_map(|el| text_of(&el).parse::<u32>().ok())
        .max()
        .unwrap_or(1)
}

/// A reply sits in a `div.post-container` nested inside the container of
/// the post it answers
fn parent_post_id(post: &ElementRef) -> Option<PostId> {
    let container = post.parent().and_then(ElementRef::wrap)?;
    if !has_class(&container, "post-container") {
        return None;
    }

    let parent_container = container.parent().and_then(ElementRef::wrap)?;
    if !has_class(&parent_container, "post-container") {
        return None;
    }

    parent_container
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| has_class(child, "post"))
        .and_then(|parent| parent.value().attr("id"))
        .and_then(post_id_from_attr)
}

fn has_class(element: &ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// The title is the unlinked text after the last breadcrumb link; it may
/// itself contain the `»` separator
fn breadcrumb_title(breadcrumbs: &ElementRef) -> Option<String> {
    let nodes: Vec<_> = breadcrumbs.children().collect();
    let last_link = nodes.iter().rposition(|node| {
        node.value()
            .as_element()
            .map_or(false, |element| element.name() == "a")
    })?;

    let tail: String = nodes[last_link + 1..]
        .iter()
        .map(|node| match ElementRef::wrap(*node) {
            Some(element) => element.text().collect::<String>(),
            None => node
                .value()
                .as_text()
                .map(|text| text.text.to_string())
                .unwrap_or_default(),
        })
        .collect();

    let title = tail.trim().trim_start_matches('»').trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn post_id_from_attr(attr: &str) -> Option<PostId> {
    let n: u64 = attr.strip_prefix("post-")?.parse().ok()?;
    Some(PostId::from_numeric(n))
}

/// `/forum/c-123456/general` -> `123456`
fn category_id_from_href(href: &str) -> Option<String> {
    let rest = href.split("/forum/c-").nth(1)?;
    let id: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Wikidot renders dates as `<span class="odate time_1600000000 ...">`
fn odate_timestamp(element: &ElementRef) -> Option<i64> {
    element
        .value()
        .classes()
        .find_map(|class| class.strip_prefix("time_")?.parse().ok())
}

/// A user link is an avatar link followed by a name link; deleted accounts
/// have no links at all
fn printuser_name(element: &ElementRef) -> Option<String> {
    let from_link = Selector::parse("a").ok().and_then(|links| {
        element
            .select(&links)
            .map(|link| text_of(&link))
            .filter(|name| !name.is_empty())
            .last()
    });

    from_link
        .or_else(|| Some(text_of(element)))
        .filter(|name| !name.is_empty())
}

fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
<div class="forum-thread-box">
  <div class="forum-breadcrumbs">
    <a href="/forum/start">Forum</a> &raquo;
    <a href="/forum/c-4321/general-discussion">General Discussion</a> &raquo;
    Welcome thread
  </div>
  <div class="description-block well">
    <div class="statistics">
      Started by: <span class="printuser avatarhover"><a href="http://www.wikidot.com/user:info/alice"><img class="small" src="avatar.png" alt="alice"/></a><a href="http://www.wikidot.com/user:info/alice">alice</a></span><br/>
      Date: <span class="odate time_1600000000 format_%25e%20%25b%20%25Y">14 Sep 2020</span><br/>
      Number of posts: 3
    </div>
    Say hello here.
  </div>
  <div id="thread-container" class="thread-container">
    <div id="thread-container-posts">
      <div class="post-container" id="fpc-11">
        <div class="post" id="post-11">
          <div class="long">
            <div class="head">
              <div class="title" id="post-title-11">Hello</div>
              <div class="info"><span class="printuser"><a href="#">x</a><a href="#">bob</a></span> <span class="odate time_1600000100">date</span></div>
            </div>
            <div class="content" id="post-content-11"><p>First!</p></div>
          </div>
        </div>
        <div class="post-container" id="fpc-12">
          <div class="post" id="post-12">
            <div class="long">
              <div class="head">
                <div class="title" id="post-title-12"></div>
                <div class="info"><span class="printuser deleted">(account deleted)</span> <span class="odate time_1600000200">date</span></div>
              </div>
              <div class="content" id="post-content-12"><p>Reply</p></div>
            </div>
          </div>
        </div>
      </div>
      <div class="post-container" id="fpc-13">
        <div class="post" id="post-13">
          <div class="long">
            <div class="head">
              <div class="title">Another</div>
              <div class="info"><span class="printuser"><a href="#">carol</a></span> <span class="odate time_1600000300">date</span></div>
            </div>
            <div class="content"><p>Top level</p></div>
          </div>
        </div>
      </div>
    </div>
  </div>
  <div class="pager">
    <span class="pager-no">page 1 of 3</span>
    <span class="current">1</span>
    <span class="target"><a href="javascript:;">2</a></span>
    <span class="target"><a href="javascript:;">3</a></span>
    <span class="target"><a href="javascript:;">next &raquo;</a></span>
  </div>
</div>
"##;

    fn thread() -> ThreadId {
        ThreadId::new("t-77")
    }

    #[test]
    fn test_parse_meta() {
        let page = parse_thread_page(PAGE, &thread(), true).unwrap();
        let meta = page.meta.unwrap();

        assert_eq!(meta.thread_id, thread());
        assert_eq!(
            meta.category,
            Category {
                id: "4321".to_string(),
                name: "General Discussion".to_string(),
            }
        );
        assert_eq!(meta.title, "Welcome thread");
        assert_eq!(meta.creator_username.as_deref(), Some("alice"));
        assert_eq!(meta.created_timestamp, 1_600_000_000);
    }

    #[test]
    fn test_parse_posts_in_page_order() {
        let page = parse_thread_page(PAGE, &thread(), false).unwrap();
        assert!(page.meta.is_none());

        let ids: Vec<&str> = page.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["post-11", "post-12", "post-13"]);

        let first = &page.posts[0];
        assert_eq!(first.author, "bob");
        assert_eq!(first.title.as_deref(), Some("Hello"));
        assert_eq!(first.created_timestamp, 1_600_000_100);
        assert_eq!(first.content, "<p>First!</p>");
        assert_eq!(first.thread_id, thread());
    }

    #[test]
    fn test_reply_parent_and_deleted_author() {
        let page = parse_thread_page(PAGE, &thread(), false).unwrap();

        assert_eq!(page.posts[0].parent_id, None);
        assert_eq!(page.posts[1].parent_id, Some(PostId::new("post-11")));
        assert_eq!(page.posts[1].author, "(account deleted)");
        assert_eq!(page.posts[1].title, None);
        assert_eq!(page.posts[2].parent_id, None);
    }

    #[test]
    fn test_page_count_from_pager() {
        let page = parse_thread_page(PAGE, &thread(), false).unwrap();
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn test_single_page_without_pager() {
        let html = r##"<div class="post-container"><div class="post" id="post-5">
            <div class="long"><div class="head"><div class="info">
            <span class="printuser"><a href="#">dan</a></span>
            <span class="odate time_5">d</span></div></div>
            <div class="content">hi</div></div></div></div>"##;
        let page = parse_thread_page(html, &thread(), false).unwrap();

        assert_eq!(page.page_count, 1);
        assert_eq!(page.posts.len(), 1);
    }

    #[test]
    fn test_title_keeps_separator_in_thread_name() {
        let html = r##"<div class="forum-breadcrumbs">
            <a href="/forum/start">Forum</a> &raquo;
            <a href="/forum/c-5/general">General</a> &raquo; Tales &raquo; Part 2</div>
            <div class="description-block"><div class="statistics">
            <span class="printuser"><a href="#">erin</a></span>
            <span class="odate time_42">d</span></div></div>"##;
        let meta = parse_thread_page(html, &thread(), true).unwrap().meta.unwrap();

        assert_eq!(meta.title, "Tales » Part 2");
        assert_eq!(meta.category.name, "General");
    }

    #[test]
    fn test_breadcrumbs_without_title_is_an_error() {
        let html = r##"<div class="forum-breadcrumbs">
            <a href="/forum/c-5/general">General</a> &raquo; </div>
            <div class="description-block"><div class="statistics">
            <span class="odate time_42">d</span></div></div>"##;
        let result = parse_thread_page(html, &thread(), true);
        assert!(matches!(result, Err(RemoteError::Html(_))));
    }

    #[test]
    fn test_missing_breadcrumbs_is_an_error() {
        let result = parse_thread_page("<div>nothing here</div>", &thread(), true);
        assert!(matches!(result, Err(RemoteError::Html(_))));
    }

    #[test]
    fn test_category_id_from_href() {
        assert_eq!(category_id_from_href("/forum/c-123/name"), Some("123".to_string()));
        assert_eq!(
            category_id_from_href("http://w.wikidot.com/forum/c-9"),
            Some("9".to_string())
        );
        assert_eq!(category_id_from_href("/forum/start"), None);
    }
}
