use crate::extractor::PostRecord;
use crate::renderer::RenderMode;

const ORG_DATE_FORMAT: &str = "[%Y-%m-%d %a %H:%M]";
const BUFFER_OPTIONS: &str = "toc:nil num:nil todo:nil pri:nil tags:nil ^:nil TeX:nil";

/// The final strings for one post, built from a borrowed [`PostRecord`].
///
/// The record itself is left untouched, so the same posts can be rendered
/// any number of times with identical results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    pub mode: RenderMode,
    pub indent_level: usize,
    pub id: String,
    pub title: String,
    pub date: String,
    pub tags: String,
    pub categories: String,
    pub text: String,
}

impl RenderedPost {
    pub fn new(post: &PostRecord, mode: RenderMode, indent_level: usize) -> Self {
        let space = " ".repeat(indent_level);

        let (tags, text) = match mode {
            RenderMode::Subtree => (
                format!(":{}:", post.tags.join(":")),
                post.text.replace('\n', &format!("\n{} ", space)),
            ),
            RenderMode::Buffer => (post.tags.join(", "), post.text.clone()),
        };

        Self {
            mode,
            indent_level,
            id: post.id.clone().unwrap_or_default(),
            title: post.title.clone().unwrap_or_default(),
            date: format_org_date(post),
            tags,
            categories: post.categories.join(", "),
            text,
        }
    }

    pub fn to_org(&self) -> String {
        match self.mode {
            RenderMode::Subtree => self.to_subtree(),
            RenderMode::Buffer => self.to_buffer(),
        }
    }

    fn to_subtree(&self) -> String {
        let stars = "*".repeat(self.indent_level);
        let space = " ".repeat(self.indent_level);

        format!(
            "{stars} {title} {tags}\n\
             {space} :PROPERTIES:\n\
             {space} :POSTID: {id}\n\
             {space} :POST_DATE: {date}\n\
             {space} :CATEGORY: {categories}\n\
             {space} :END:\n\
             \n\
             {space} {text}\n\
             \n",
            stars = stars,
            space = space,
            title = self.title,
            tags = self.tags,
            id = self.id,
            date = self.date,
            categories = self.categories,
            text = self.text,
        )
    }

    fn to_buffer(&self) -> String {
        format!(
            "#+POSTID: {id}\n\
             #+DATE: {date}\n\
             #+OPTIONS: {options}\n\
             #+CATEGORY: {categories}\n\
             #+TAGS: {tags}\n\
             #+TITLE: {title}\n\
             \n\
             {text}\n\
             \n\
             \n",
            id = self.id,
            date = self.date,
            options = BUFFER_OPTIONS,
            categories = self.categories,
            tags = self.tags,
            title = self.title,
            text = self.text,
        )
    }
}

/// `[YYYY-MM-DD Ddd HH:MM]`, or empty when the post has no usable date.
pub fn format_org_date(post: &PostRecord) -> String {
    post.published_at()
        .map(|date| date.format(ORG_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
