//! Thread source backed by Wikidot's AJAX module connector

use crate::model::{PostId, SiteRecord, ThreadId, ThreadItem};
use crate::remote::parser::parse_thread_page;
use crate::remote::{RemoteError, ThreadCursor, ThreadSource};
use reqwest::header::COOKIE;
use reqwest::Client;
use serde::Deserialize;
use std::collections::VecDeque;

const THREAD_MODULE: &str = "forum/ForumViewThreadModule";

/// The connector only checks that the form token matches the cookie
const TOKEN: &str = "forumwatch";

#[derive(Debug, Deserialize)]
struct ModuleResponse {
    status: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Fetches threads through `ajax-module-connector.php`
pub struct WikidotThreadSource {
    client: Client,
    /// URL template with `{site}` and `{scheme}` placeholders
    url_template: String,
}

impl WikidotThreadSource {
    pub fn new(client: Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn endpoint(&self, site: &SiteRecord) -> String {
        self.url_template
            .replace("{scheme}", site.scheme())
            .replace("{site}", &site.id)
    }
}

impl ThreadSource for WikidotThreadSource {
    type Cursor = WikidotThreadCursor;

    fn thread(
        &self,
        site: &SiteRecord,
        thread_id: &ThreadId,
        post_id: Option<&PostId>,
    ) -> WikidotThreadCursor {
        WikidotThreadCursor {
            client: self.client.clone(),
            endpoint: self.endpoint(site),
            thread_id: thread_id.clone(),
            target: post_id.cloned(),
            buffer: VecDeque::new(),
            next_page: 1,
            page_count: None,
            finished: false,
        }
    }
}

/// Cursor over one thread fetch
///
/// The first request either asks for page 1 or, when a target post is
/// given, for the page containing that post. Only the full-thread mode
/// goes on to request further pages.
pub struct WikidotThreadCursor {
    client: Client,
    endpoint: String,
    thread_id: ThreadId,
    target: Option<PostId>,
    buffer: VecDeque<ThreadItem>,
    next_page: u32,
    /// Known once the first page has been read
    page_count: Option<u32>,
    finished: bool,
}

impl WikidotThreadCursor {
    async fn request(&self, params: &[(&str, &str)]) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(COOKIE, format!("wikidot_token7={}", TOKEN))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let module: ModuleResponse = serde_json::from_str(&text)?;

        if module.status != "ok" {
            return Err(RemoteError::Module {
                status: module.status,
                message: module.message.unwrap_or_default(),
            });
        }

        Ok(module.body.unwrap_or_default())
    }

    async fn load_next_page(&mut self) -> Result<(), RemoteError> {
        let first = self.page_count.is_none();
        let page_no = self.next_page.to_string();

        let mut params = vec![
            ("moduleName", THREAD_MODULE),
            ("t", self.thread_id.numeric()),
            ("wikidot_token7", TOKEN),
        ];
        match (&self.target, first) {
            (Some(post_id), true) => params.push(("postId", post_id.numeric())),
            _ => params.push(("pageNo", page_no.as_str())),
        }

        tracing::trace!(
            thread_id = %self.thread_id,
            page = self.next_page,
            target = ?self.target,
            "Requesting thread page"
        );

        let body = self.request(&params).await?;
        let page = parse_thread_page(&body, &self.thread_id, first)?;

        if let Some(meta) = page.meta {
            self.buffer.push_back(ThreadItem::Meta(meta));
        }
        self.buffer
            .extend(page.posts.into_iter().map(ThreadItem::Post));

        let page_count = *self.page_count.get_or_insert(page.page_count);
        self.next_page += 1;

        if self.target.is_some() || self.next_page > page_count {
            self.finished = true;
        }

        Ok(())
    }
}

impl ThreadCursor for WikidotThreadCursor {
    async fn next_item(&mut self) -> Result<Option<ThreadItem>, RemoteError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if self.finished {
                return Ok(None);
            }
            if let Err(e) = self.load_next_page().await {
                self.finished = true;
                return Err(e);
            }
        }
    }
}
