//! 远程格式化适配 - 服务层
//!
//! 发送一次提示词，并把返回文本解析为结构合法的阅读测试。
//! 本层不做重试，也不关心调用频率，失败原样返回给调用方。

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::ChatBackend;
use crate::error::LlmError;
use crate::models::{FormattedQuestion, FormattedReadingTest, QuestionType};
use crate::text::question_extractor::{resolve_choice_answer, resolve_true_false};

/// 远程格式化适配器
#[derive(Clone)]
pub struct RemoteFormatter {
    backend: Arc<dyn ChatBackend>,
}

impl RemoteFormatter {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// 发送一次请求并解析结果
    pub async fn call(&self, prompt: &str) -> Result<FormattedReadingTest, LlmError> {
        let response = self.backend.complete(prompt).await?;
        debug!("收到远程响应: {} 字符", response.len());
        parse_formatted_response(&response)
    }
}

/// 从远程响应文本中解析阅读测试
///
/// 依次尝试：去掉 Markdown 代码块后整体解析 → 截取第一个完整的 `{...}` 解析。
/// 解析成功后补齐分值、修复字母形式的选择题答案，最后做整体校验。
pub fn parse_formatted_response(response: &str) -> Result<FormattedReadingTest, LlmError> {
    let text = strip_code_fence(response);

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(strict_err) => {
            let candidate = first_json_object(text).ok_or(LlmError::InvalidJson(strict_err))?;
            serde_json::from_str(candidate).map_err(LlmError::InvalidJson)?
        }
    };

    check_shape(&value)?;

    let mut test: FormattedReadingTest =
        serde_json::from_value(value).map_err(LlmError::InvalidJson)?;

    for question in &mut test.questions {
        question.fill_default_points();
        repair_choice_answer(question);
    }

    test.validate().map_err(|reason| {
        warn!("远程结果校验失败: {}", reason);
        LlmError::validation(reason)
    })?;

    Ok(test)
}

/// 去掉 ```json ... ``` 包裹
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 跳过语言标记所在的首行
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// 找到第一个括号配平的 JSON 对象，忽略字符串中的括号
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn check_shape(value: &Value) -> Result<(), LlmError> {
    let passage = value
        .get("passage")
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::validation("缺少 passage 字段或类型不是字符串"))?;
    if passage.trim().is_empty() {
        return Err(LlmError::validation("passage 为空"));
    }

    let questions = value
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| LlmError::validation("缺少 questions 字段或类型不是数组"))?;
    if questions.is_empty() {
        return Err(LlmError::validation("questions 为空"));
    }
    Ok(())
}

/// 把 `B`、`B) Lyon`、`true` 之类的答案改写为选项原文
fn repair_choice_answer(question: &mut FormattedQuestion) {
    let Some(answer) = question.correct_answer.primary().map(str::to_string) else {
        return;
    };

    match question.question_type {
        QuestionType::TrueFalse => {
            // 答案能识别时统一为标准选项，避免 "true"/"false" 之类的大小写差异
            let resolved = resolve_true_false(&answer);
            if resolved.is_some() || question.options.as_ref().map_or(true, Vec::is_empty) {
                question.options = Some(vec!["True".to_string(), "False".to_string()]);
            }
            if let Some(resolved) = resolved {
                question.correct_answer = resolved.into();
            }
        }
        QuestionType::MultipleChoice => {
            let resolved = question
                .options
                .as_deref()
                .and_then(|options| resolve_choice_answer(&answer, options));
            if let Some(resolved) = resolved {
                question.correct_answer = resolved.into();
            }
        }
        QuestionType::ShortAnswer | QuestionType::FillInTheBlank => {}
    }
}
