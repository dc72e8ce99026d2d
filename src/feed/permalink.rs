use crate::feed::FeedError;
use crate::model::{FeedEntry, PostId, ThreadId};
use url::Url;

/// Extracts the thread and post IDs from a Wikidot forum post permalink
///
/// Permalinks look like `http://site.wikidot.com/forum/t-123456/slug#post-789`;
/// the slug segment is optional. The result keeps the prefixed forms
/// (`t-123456`, `post-789`).
pub fn parse_permalink(link: &str) -> Result<FeedEntry, FeedError> {
    let url = Url::parse(link).map_err(|e| FeedError::malformed(link, e.to_string()))?;

    let mut segments = url
        .path_segments()
        .ok_or_else(|| FeedError::malformed(link, "URL has no path"))?;

    if segments.next() != Some("forum") {
        return Err(FeedError::malformed(link, "not a forum URL"));
    }

    let thread = segments
        .next()
        .and_then(|segment| prefixed_number(segment, "t-"))
        .ok_or_else(|| FeedError::malformed(link, "missing thread ID"))?;

    let post = url
        .fragment()
        .and_then(|fragment| prefixed_number(fragment, "post-"))
        .ok_or_else(|| FeedError::malformed(link, "missing post ID"))?;

    Ok(FeedEntry::new(
        ThreadId::from_numeric(thread),
        PostId::from_numeric(post),
    ))
}

fn prefixed_number(s: &str, prefix: &str) -> Option<u64> {
    s.strip_prefix(prefix)?.parse().ok()
}
