pub mod post;
pub mod wxr_reader;

pub use post::{parse_wxr_date, PostRecord};
pub use wxr_reader::{ExtractionProgress, WxrReader, NEWLINE_MARKER};
