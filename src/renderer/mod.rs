pub mod file_naming;
pub mod org_writer;
pub mod rendered_post;

pub use file_naming::{link_to_file, post_file_name};
pub use org_writer::{OrgWriter, RenderReport};
pub use rendered_post::{format_org_date, RenderedPost};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Every post becomes a heading in one `<name>.org` file.
    Subtree,
    /// Every post becomes its own file under `<name>/`.
    Buffer,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub output_name: String,
    pub indent_level: usize,
    pub separate_files: bool,
    pub prefix_date: bool,
    /// When the output directory has to be created, the post that triggered
    /// the creation is not written.
    pub skip_first_post_on_create: bool,
}

impl RenderConfig {
    pub fn mode(&self) -> RenderMode {
        if self.separate_files {
            RenderMode::Buffer
        } else {
            RenderMode::Subtree
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_name: "org-posts".to_string(),
            indent_level: 1,
            separate_files: false,
            prefix_date: false,
            skip_first_post_on_create: true,
        }
    }
}
