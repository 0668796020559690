use crate::extractor::PostRecord;
use url::Url;

/// File name for a post in buffer mode: `[<YYYY-MM-DD>-]<name>.org`.
///
/// The name is the slug when it starts with a letter, otherwise it comes
/// from the link (see [`link_to_file`]), otherwise from the post id.
pub fn post_file_name(post: &PostRecord, prefix_date: bool) -> String {
    let file_name = slug_file_name(post)
        .or_else(|| post.link.as_deref().and_then(link_to_file))
        .or_else(|| post.id.as_deref().and_then(|id| stem_to_file(id.trim())))
        .unwrap_or_else(|| "untitled.org".to_string());

    match post.published_at() {
        Some(date) if prefix_date => format!("{}-{}", date.format("%Y-%m-%d"), file_name),
        _ => file_name,
    }
}

/// Derives `<name>.org` from a post URL.
///
/// `http://example.com/?p=42` gives `42.org`; otherwise the second-to-last
/// path segment is used, so `http://example.com/2011/01/hello-world/` gives
/// `hello-world.org`.
pub fn link_to_file(link: &str) -> Option<String> {
    if let Some((_, query)) = link.split_once("?p=") {
        let id = query.split(['&', '#']).next().unwrap_or_default();
        if let Some(name) = stem_to_file(id) {
            return Some(name);
        }
    }

    let path = match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.to_string(),
    };

    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 {
        return None;
    }

    stem_to_file(segments[segments.len() - 2])
}

fn slug_file_name(post: &PostRecord) -> Option<String> {
    post.post_name
        .as_deref()
        .filter(|slug| slug.chars().next().is_some_and(char::is_alphabetic))
        .and_then(stem_to_file)
}

fn stem_to_file(stem: &str) -> Option<String> {
    let decoded = urlencoding::decode_binary(stem.as_bytes());
    let name = String::from_utf8_lossy(&decoded).replace(['/', '\\'], "-");

    match name.as_str() {
        "" | "." | ".." => None,
        _ => Some(format!("{}.org", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(link: Option<&str>, post_name: Option<&str>) -> PostRecord {
        PostRecord {
            link: link.map(str::to_string),
            post_name: post_name.map(str::to_string),
            date: Some("Mon, 03 Jan 2011 10:00:00 +0000".to_string()),
            id: Some("42".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_link_with_trailing_slash() {
        assert_eq!(
            link_to_file("http://example.com/2011/01/hello-world/").as_deref(),
            Some("hello-world.org")
        );
    }

    #[test]
    fn test_link_with_post_query() {
        assert_eq!(link_to_file("http://example.com/?p=42").as_deref(), Some("42.org"));
        assert_eq!(
            link_to_file("http://example.com/?p=42&preview=true").as_deref(),
            Some("42.org")
        );
    }

    #[test]
    fn test_link_without_trailing_slash_takes_parent_segment() {
        assert_eq!(
            link_to_file("http://example.com/2011/01/hello-world").as_deref(),
            Some("01.org")
        );
    }

    #[test]
    fn test_link_is_percent_decoded() {
        assert_eq!(
            link_to_file("http://example.com/2011/%e3%81%93%e3%82%93/").as_deref(),
            Some("こん.org")
        );
        assert_eq!(
            link_to_file("http://example.com/a%2Fb/").as_deref(),
            Some("a-b.org")
        );
    }

    #[test]
    fn test_relative_link_falls_back_to_split() {
        assert_eq!(link_to_file("blog/my-post/").as_deref(), Some("my-post.org"));
        assert_eq!(link_to_file("plain"), None);
    }

    #[test]
    fn test_slug_preferred_when_alphabetic() {
        let p = post(Some("http://example.com/?p=42"), Some("my-slug"));
        assert_eq!(post_file_name(&p, false), "my-slug.org");
    }

    #[test]
    fn test_non_alphabetic_slug_falls_back_to_link() {
        let p = post(Some("http://example.com/2011/01/hello-world/"), Some("2011-recap"));
        assert_eq!(post_file_name(&p, false), "hello-world.org");

        let p = post(Some("http://example.com/2011/01/hello-world/"), Some(""));
        assert_eq!(post_file_name(&p, false), "hello-world.org");
    }

    #[test]
    fn test_missing_link_falls_back_to_id() {
        let p = post(None, None);
        assert_eq!(post_file_name(&p, false), "42.org");
    }

    #[test]
    fn test_prefix_date() {
        let p = post(Some("http://example.com/2011/01/hello-world/"), None);
        assert_eq!(post_file_name(&p, true), "2011-01-03-hello-world.org");
    }

    #[test]
    fn test_prefix_date_skipped_for_unparseable_date() {
        let mut p = post(Some("http://example.com/2011/01/hello-world/"), None);
        p.date = Some("not a date".to_string());
        assert_eq!(post_file_name(&p, true), "hello-world.org");
    }
}
