//! 文本处理层
//!
//! - `normalizer` - 空格、换行、分段清理
//! - `question_extractor` - 题目切分、题型识别、答案解析

pub mod normalizer;
pub mod question_extractor;

pub use normalizer::{cleanup, paragraphize};
pub use question_extractor::{extract_questions, split_passage_and_questions, to_formatted_question};
