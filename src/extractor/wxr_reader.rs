use crate::converter::MarkupConverter;
use crate::error::{Wp2OrgError, Result};
use crate::extractor::PostRecord;
use crate::ui::OutputFormatter;
use roxmltree::{Document, Node, ParsingOptions};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Stands in for line breaks while a body passes through the converter,
/// which would otherwise collapse them.
pub const NEWLINE_MARKER: &str = "#$NEWLINE-MARKER$#";

const TITLE_TAG: &str = "title";
const LINK_TAG: &str = "link";
const DATE_TAG: &str = "pubDate";
const AUTHOR_TAG: &str = "dc:creator";
const ID_TAG: &str = "wp:post_id";
const CONTENT_TAG: &str = "content:encoded";
const POST_NAME_TAG: &str = "wp:post_name";

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub posts_processed: usize,
    pub total_posts: usize,
    pub current_post: Option<String>,
}

impl ExtractionProgress {
    pub fn new(total_posts: usize) -> Self {
        Self {
            posts_processed: 0,
            total_posts,
            current_post: None,
        }
    }

    pub fn update_post(&mut self, name: String) {
        self.posts_processed += 1;
        self.current_post = Some(name);
    }
}

/// Reads a WXR document into [`PostRecord`]s, converting each body as it goes.
pub struct WxrReader<'a> {
    converter: &'a dyn MarkupConverter,
    output: &'a OutputFormatter,
}

impl<'a> WxrReader<'a> {
    pub fn new(converter: &'a dyn MarkupConverter, output: &'a OutputFormatter) -> Self {
        Self { converter, output }
    }

    pub fn read_file(&self, path: &Path) -> Result<Vec<PostRecord>> {
        self.read_file_with(path, |_| Ok(()))
    }

    pub fn read_file_with<F>(&self, path: &Path, on_post: F) -> Result<Vec<PostRecord>>
    where
        F: FnMut(&ExtractionProgress) -> Result<()>,
    {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Wp2OrgError::InputNotFound {
                path: path.display().to_string(),
            },
            _ => Wp2OrgError::Io(e),
        })?;
        let xml = String::from_utf8_lossy(&bytes);
        if matches!(xml, Cow::Owned(_)) {
            self.output.warning(&format!(
                "{} is not valid UTF-8, invalid bytes were replaced with U+FFFD",
                path.display()
            ));
        }

        self.read_str_with(&xml, &path.display().to_string(), on_post)
    }

    pub fn read_str(&self, xml: &str) -> Result<Vec<PostRecord>> {
        self.read_str_with(xml, "<memory>", |_| Ok(()))
    }

    /// Parses the whole document (a DOCTYPE is allowed), then builds one
    /// record per `item` element in document order. `on_post` runs after every record and may abort
    /// the run by returning an error.
    pub fn read_str_with<F>(&self, xml: &str, source_name: &str, mut on_post: F) -> Result<Vec<PostRecord>>
    where
        F: FnMut(&ExtractionProgress) -> Result<()>,
    {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document = Document::parse_with_options(xml, options).map_err(|source| Wp2OrgError::XmlParse {
            path: source_name.to_string(),
            source,
        })?;

        let items: Vec<Node> = document
            .descendants()
            .filter(|node| has_qualified_name(node, "item"))
            .collect();

        let mut progress = ExtractionProgress::new(items.len());
        let mut posts = Vec::with_capacity(items.len());

        for item in items {
            let post = self.node_to_post(item)?;
            progress.update_post(post.display_name());
            on_post(&progress)?;
            posts.push(post);
        }

        Ok(posts)
    }

    fn node_to_post(&self, item: Node) -> Result<PostRecord> {
        let (tags, categories) = collect_terms(item);

        let mut post = PostRecord {
            title: first_child_data(item, TITLE_TAG),
            link: first_child_data(item, LINK_TAG),
            date: first_child_data(item, DATE_TAG),
            author: first_child_data(item, AUTHOR_TAG),
            id: first_child_data(item, ID_TAG),
            post_name: first_child_data(item, POST_NAME_TAG).filter(|name| !name.is_empty()),
            text: String::new(),
            tags,
            categories,
        };
        self.report_heartbeat(&post);

        if let Some(html) = first_child_data(item, CONTENT_TAG) {
            post.text = self.convert_body(&html)?;
        }

        Ok(post)
    }

    /// Every tenth post id is shown by default; the rest only with `-v`.
    fn report_heartbeat(&self, post: &PostRecord) {
        let message = format!("Processing post #{}", post.id.as_deref().unwrap_or("?"));
        match post.numeric_id() {
            Some(number) if number % 10 == 0 => self.output.info(&message),
            _ => self.output.debug(&message),
        }
    }

    fn convert_body(&self, html: &str) -> Result<String> {
        let marked = html.replace("\r\n", "\n").replace('\n', NEWLINE_MARKER);
        let converted = self.converter.convert(&marked)?;
        Ok(converted.replace(NEWLINE_MARKER, "\n"))
    }
}

/// Splits the item's `category` elements into (tags, categories) by domain.
fn collect_terms(item: Node) -> (Vec<String>, Vec<String>) {
    let mut tags = BTreeSet::new();
    let mut categories = BTreeSet::new();

    for element in item
        .descendants()
        .skip(1)
        .filter(|node| has_qualified_name(node, "category"))
    {
        let domain = element.attribute("domain").unwrap_or_default();
        let nicename = element.attribute("nicename").unwrap_or_default();
        if domain.is_empty() || nicename.is_empty() {
            continue;
        }

        let bucket = if domain.contains("tag") {
            &mut tags
        } else if domain.contains("category") {
            &mut categories
        } else {
            continue;
        };

        if let Some(label) = child_text(element) {
            bucket.insert(label);
        }
    }

    (tags.into_iter().collect(), categories.into_iter().collect())
}

/// Text of the first descendant of `node` named `qname`, if that element
/// starts with a text (or CDATA) node.
fn first_child_data(node: Node, qname: &str) -> Option<String> {
    node.descendants()
        .skip(1)
        .find(|child| has_qualified_name(child, qname))
        .and_then(child_text)
}

fn child_text(element: Node) -> Option<String> {
    element
        .first_child()
        .filter(|child| child.is_text())
        .and_then(|child| child.text())
        .map(str::to_string)
}

/// Compares against `prefix:local` as written in the document, so `wp:post_id`
/// matches whatever export version URI the `wp` prefix is bound to.
fn has_qualified_name(node: &Node, qname: &str) -> bool {
    if !node.is_element() {
        return false;
    }

    let (prefix, local) = match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    };

    let tag = node.tag_name();
    if tag.name() != local {
        return false;
    }

    let actual_prefix = tag.namespace().and_then(|uri| node.lookup_prefix(uri));
    actual_prefix == prefix
}
