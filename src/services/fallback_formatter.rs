//! 兜底格式化服务 - 业务能力层
//!
//! 远程格式化不可用时，用规则把原始文本转成结构化阅读测试。
//! 对任何输入都返回可用结果，不会失败，结果完全由输入决定。

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::FormatError;
use crate::models::{FormattedQuestion, FormattedReadingTest};
use crate::text::{cleanup, extract_questions, paragraphize, split_passage_and_questions, to_formatted_question};

static RE_PASSAGE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:reading\s+)?passage\s*:\s*").unwrap());

/// 占位文章中截取的原文字符数
const PLACEHOLDER_EXCERPT_CHARS: usize = 500;

/// 把原始文本格式化为阅读测试
///
/// 解析出错时降级为最小占位结构（主题摘要 + 两道简答题）。
pub fn format_fallback(raw_content: &str, topic: &str) -> FormattedReadingTest {
    match try_format(raw_content, topic) {
        Ok(test) => {
            debug!("兜底解析完成: {} 道题目", test.questions.len());
            test
        }
        Err(e) => {
            warn!("兜底解析失败，使用最小占位结构: {}", e);
            minimal_placeholder(raw_content, topic)
        }
    }
}

fn try_format(raw_content: &str, topic: &str) -> Result<FormattedReadingTest, FormatError> {
    let (passage_text, questions_text) = split_passage_and_questions(raw_content);

    let passage_text = RE_PASSAGE_LABEL.replace(passage_text, "");
    let mut passage = paragraphize(&cleanup(&passage_text));
    if passage.is_empty() {
        passage = placeholder_passage(topic);
    }

    // 不合格的题目单独丢弃，不影响其他题目
    let mut questions: Vec<FormattedQuestion> = extract_questions(questions_text)
        .iter()
        .map(to_formatted_question)
        .filter(|question| match question.validate() {
            Ok(()) => true,
            Err(reason) => {
                warn!("丢弃无效题目: {}", reason);
                false
            }
        })
        .collect();
    if questions.is_empty() {
        debug!("未识别到题目，生成一道主题简答题");
        questions.push(FormattedQuestion::short_answer(
            format!("What is the main idea of this passage about {}?", topic_label(topic)),
            topic,
        ));
    }

    let test = FormattedReadingTest { passage, questions };
    test.validate()
        .map_err(|reason| FormatError::InvalidStructure { reason })?;
    Ok(test)
}

/// 最后一道防线：只依赖主题和原文前若干字符
fn minimal_placeholder(raw_content: &str, topic: &str) -> FormattedReadingTest {
    let excerpt: String = cleanup(raw_content)
        .chars()
        .take(PLACEHOLDER_EXCERPT_CHARS)
        .collect();
    let passage = if excerpt.trim().is_empty() {
        placeholder_passage(topic)
    } else {
        format!("{}\n\n{}", placeholder_passage(topic), excerpt.trim())
    };

    FormattedReadingTest {
        passage,
        questions: vec![
            FormattedQuestion::short_answer(
                format!("What is the main idea of the passage about {}?", topic_label(topic)),
                topic,
            ),
            FormattedQuestion::short_answer(
                "List two important details from the passage.",
                "Answers will vary",
            ),
        ],
    }
}

fn placeholder_passage(topic: &str) -> String {
    format!(
        "This reading passage is about {}. Read it carefully and answer the questions that follow.",
        topic_label(topic)
    )
}

fn topic_label(topic: &str) -> &str {
    let topic = topic.trim();
    if topic.is_empty() {
        "the assigned topic"
    } else {
        topic
    }
}
