use crate::error::Result;
use crate::extractor::PostRecord;
use crate::renderer::{post_file_name, RenderConfig, RenderMode, RenderedPost};
use crate::ui::OutputFormatter;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub mode: RenderMode,
    /// `<name>.org` in subtree mode, `<name>/` in buffer mode.
    pub output_path: PathBuf,
    pub files: Vec<PathBuf>,
    pub posts_written: usize,
    pub posts_skipped: usize,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

impl RenderReport {
    fn new(mode: RenderMode, output_path: PathBuf) -> Self {
        Self {
            mode,
            output_path,
            files: Vec::new(),
            posts_written: 0,
            posts_skipped: 0,
            bytes_written: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Writes extracted posts as org text, either into one file or one file per post.
pub struct OrgWriter<'a> {
    config: RenderConfig,
    output: &'a OutputFormatter,
}

impl<'a> OrgWriter<'a> {
    pub fn new(config: RenderConfig, output: &'a OutputFormatter) -> Self {
        Self { config, output }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn output_path(&self) -> PathBuf {
        match self.config.mode() {
            RenderMode::Subtree => PathBuf::from(format!("{}.org", self.config.output_name)),
            RenderMode::Buffer => PathBuf::from(&self.config.output_name),
        }
    }

    pub fn write_posts(&self, posts: &[PostRecord]) -> Result<RenderReport> {
        self.write_posts_with(posts, |_, _| Ok(()))
    }

    /// `on_post` runs after each post is handled and may stop the run.
    pub fn write_posts_with<F>(&self, posts: &[PostRecord], on_post: F) -> Result<RenderReport>
    where
        F: FnMut(usize, &PostRecord) -> Result<()>,
    {
        let start = Instant::now();
        let mut report = match self.config.mode() {
            RenderMode::Subtree => self.write_subtrees(posts, on_post)?,
            RenderMode::Buffer => self.write_buffers(posts, on_post)?,
        };
        report.elapsed = start.elapsed();
        Ok(report)
    }

    fn write_subtrees<F>(&self, posts: &[PostRecord], mut on_post: F) -> Result<RenderReport>
    where
        F: FnMut(usize, &PostRecord) -> Result<()>,
    {
        let path = self.output_path();
        let mut report = RenderReport::new(RenderMode::Subtree, path.clone());
        let mut writer = BufWriter::new(File::create(&path)?);

        for (index, post) in posts.iter().enumerate() {
            self.warn_on_bad_date(post);

            let org = RenderedPost::new(post, RenderMode::Subtree, self.config.indent_level).to_org();
            writer.write_all(org.as_bytes())?;

            report.posts_written += 1;
            report.bytes_written += org.len() as u64;
            on_post(index, post)?;
        }

        writer.flush()?;
        report.files.push(path);
        Ok(report)
    }

    fn write_buffers<F>(&self, posts: &[PostRecord], mut on_post: F) -> Result<RenderReport>
    where
        F: FnMut(usize, &PostRecord) -> Result<()>,
    {
        let directory = self.output_path();
        let mut report = RenderReport::new(RenderMode::Buffer, directory.clone());
        let mut written = HashSet::new();

        for (index, post) in posts.iter().enumerate() {
            self.warn_on_bad_date(post);

            if !directory.exists() {
                fs::create_dir_all(&directory)?;
                self.output.debug(&format!("Created directory {}", directory.display()));

                if self.config.skip_first_post_on_create {
                    self.output.warning(&format!(
                        "Not writing '{}': it triggered creation of {} (use --keep-first-post to write it)",
                        post.display_name(),
                        directory.display()
                    ));
                    report.posts_skipped += 1;
                    on_post(index, post)?;
                    continue;
                }
            }

            let file_path = directory.join(post_file_name(post, self.config.prefix_date));
            let first_write = written.insert(file_path.clone());
            if !first_write {
                self.output.warning(&format!(
                    "{} is written by more than one post, keeping the last one",
                    file_path.display()
                ));
            }

            let org = RenderedPost::new(post, RenderMode::Buffer, self.config.indent_level).to_org();
            fs::write(&file_path, org.as_bytes())?;
            self.output.debug(&format!("Wrote {}", file_path.display()));

            report.posts_written += 1;
            report.bytes_written += org.len() as u64;
            if first_write {
                report.files.push(file_path);
            }
            on_post(index, post)?;
        }

        Ok(report)
    }

    fn warn_on_bad_date(&self, post: &PostRecord) {
        if let Some(raw) = post.date.as_deref() {
            if post.published_at().is_none() {
                self.output.warning(&format!(
                    "Could not parse date '{}' of '{}', leaving it empty",
                    raw,
                    post.display_name()
                ));
            }
        }
    }
}
