pub mod format_flow;
pub mod prompt;

pub use format_flow::{FormatterStats, ReadingTestFormatter};
pub use prompt::build_format_prompt;
