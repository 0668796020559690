pub mod process;

pub use process::ProcessConverter;

use crate::error::Result;

/// Turns an HTML fragment into org-mode markup.
pub trait MarkupConverter {
    fn convert(&self, html: &str) -> Result<String>;
}
