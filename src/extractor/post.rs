use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Date layout of `pubDate` once the trailing zone has been dropped.
const WXR_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// One `item` of a WordPress export, with its body already converted to org.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Raw `pubDate`, e.g. `Mon, 03 Jan 2011 10:00:00 +0000`.
    pub date: Option<String>,
    pub author: Option<String>,
    pub id: Option<String>,
    pub post_name: Option<String>,
    pub text: String,
    /// Sorted, without duplicates.
    pub tags: Vec<String>,
    /// Sorted, without duplicates.
    pub categories: Vec<String>,
}

impl PostRecord {
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.as_deref().and_then(|id| id.trim().parse().ok())
    }

    pub fn published_at(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_wxr_date)
    }

    /// Best human label for log lines: title, then id, then link.
    pub fn display_name(&self) -> String {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.id.as_ref().map(|id| format!("post #{}", id)))
            .or_else(|| self.link.clone())
            .unwrap_or_else(|| "untitled post".to_string())
    }
}

/// Parses a WXR `pubDate`, ignoring its timezone suffix.
pub fn parse_wxr_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let local = match trimmed.rsplit_once(' ') {
        Some((head, zone)) if is_zone_token(zone) => head.trim_end(),
        _ => trimmed,
    };

    NaiveDateTime::parse_from_str(local, WXR_DATE_FORMAT).ok()
}

fn is_zone_token(token: &str) -> bool {
    token.starts_with('+')
        || (token.starts_with('-') && !token.contains(':'))
        || (!token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_wxr_date_drops_zone() {
        let date = parse_wxr_date("Mon, 03 Jan 2011 10:00:00 +0000").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2011, 1, 3));
        assert_eq!((date.hour(), date.minute()), (10, 0));
    }

    #[test]
    fn test_parse_wxr_date_other_zones() {
        assert!(parse_wxr_date("Mon, 03 Jan 2011 10:00:00 -0500").is_some());
        assert!(parse_wxr_date("Mon, 03 Jan 2011 10:00:00 GMT").is_some());
        assert!(parse_wxr_date("Mon, 03 Jan 2011 10:00:00").is_some());
    }

    #[test]
    fn test_parse_wxr_date_rejects_garbage() {
        assert!(parse_wxr_date("").is_none());
        assert!(parse_wxr_date("yesterday").is_none());
    }

    #[test]
    fn test_numeric_id() {
        let mut post = PostRecord {
            id: Some(" 40 ".to_string()),
            ..Default::default()
        };
        assert_eq!(post.numeric_id(), Some(40));

        post.id = Some("abc".to_string());
        assert_eq!(post.numeric_id(), None);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let post = PostRecord {
            title: Some("Hello".to_string()),
            ..Default::default()
        };
        assert_eq!(post.display_name(), "Hello");

        let post = PostRecord {
            id: Some("7".to_string()),
            ..Default::default()
        };
        assert_eq!(post.display_name(), "post #7");

        assert_eq!(PostRecord::default().display_name(), "untitled post");
    }
}
