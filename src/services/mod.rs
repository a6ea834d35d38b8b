pub mod fallback_formatter;
pub mod grader;
pub mod quiz_converter;
pub mod remote_formatter;

pub use fallback_formatter::format_fallback;
pub use grader::grade_response;
pub use quiz_converter::convert_to_quiz_questions;
pub use remote_formatter::{parse_formatted_response, RemoteFormatter};
