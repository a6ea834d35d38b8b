use serde::{Deserialize, Serialize};

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 选择题
    MultipleChoice,
    /// 判断题
    TrueFalse,
    /// 简答题
    ShortAnswer,
    /// 填空题
    FillInTheBlank,
}

impl QuestionType {
    /// 题型对应的固定分值
    pub fn points(self) -> u32 {
        match self {
            QuestionType::MultipleChoice => 2,
            QuestionType::FillInTheBlank => 2,
            QuestionType::ShortAnswer => 3,
            QuestionType::TrueFalse => 1,
        }
    }

    /// 是否为需要选项的题型
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::TrueFalse)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::FillInTheBlank => "fill_in_the_blank",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 正确答案：单个答案，或按空位顺序排列的多个答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Single(String),
    Multiple(Vec<String>),
}

impl CorrectAnswer {
    /// 第一个答案（多答案时取第一个空）
    pub fn primary(&self) -> Option<&str> {
        match self {
            CorrectAnswer::Single(answer) => Some(answer.as_str()),
            CorrectAnswer::Multiple(answers) => answers.first().map(String::as_str),
        }
    }

    /// 按顺序展开为答案列表
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            CorrectAnswer::Single(answer) => vec![answer.clone()],
            CorrectAnswer::Multiple(answers) => answers.clone(),
        }
    }
}

impl From<&str> for CorrectAnswer {
    fn from(answer: &str) -> Self {
        CorrectAnswer::Single(answer.to_string())
    }
}

impl From<String> for CorrectAnswer {
    fn from(answer: String) -> Self {
        CorrectAnswer::Single(answer)
    }
}

/// 格式化后的单道题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: CorrectAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// 为 0 表示来源未提供分值，由 `fill_default_points` 补齐
    #[serde(default)]
    pub points: u32,
}

impl FormattedQuestion {
    /// 创建简答题
    pub fn short_answer(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question_type: QuestionType::ShortAnswer,
            question: question.into(),
            options: None,
            correct_answer: CorrectAnswer::Single(answer.into()),
            explanation: None,
            points: QuestionType::ShortAnswer.points(),
        }
    }

    /// 分值缺失时按题型补齐
    pub fn fill_default_points(&mut self) {
        if self.points == 0 {
            self.points = self.question_type.points();
        }
    }

    /// 校验单道题目：题干非空、分值非 0、选择题答案在选项中
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("题干为空".to_string());
        }
        if self.points == 0 {
            return Err(format!("题目 '{}' 分值为 0", self.question));
        }
        if self.question_type.is_choice() {
            let options = self
                .options
                .as_ref()
                .filter(|options| !options.is_empty())
                .ok_or_else(|| format!("{} 题目 '{}' 缺少选项", self.question_type, self.question))?;
            let answer = self.correct_answer.primary().unwrap_or_default();
            if !options.iter().any(|option| option == answer) {
                return Err(format!(
                    "{} 题目 '{}' 的答案 '{}' 不在选项中",
                    self.question_type, self.question, answer
                ));
            }
        }
        Ok(())
    }
}

/// 格式化后的阅读测试
///
/// 缓存与返回的基本单位，生成后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedReadingTest {
    pub passage: String,
    pub questions: Vec<FormattedQuestion>,
}

impl FormattedReadingTest {
    /// 校验结构不变量：文章非空、题目非空、选择题答案在选项中
    pub fn validate(&self) -> Result<(), String> {
        if self.passage.trim().is_empty() {
            return Err("passage 为空".to_string());
        }
        if self.questions.is_empty() {
            return Err("questions 为空".to_string());
        }
        self.questions.iter().try_for_each(FormattedQuestion::validate)
    }
}

/// 兜底解析器内部使用的题目记录
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuestion {
    /// 原文中的题号，仅供参考，不保证连续
    pub number: u32,
    pub question: String,
    pub answer: String,
    pub options: Option<Vec<String>>,
    pub explanation: Option<String>,
    pub question_type: QuestionType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_test() -> FormattedReadingTest {
        FormattedReadingTest {
            passage: "Paris is the capital of France.".to_string(),
            questions: vec![FormattedQuestion {
                question_type: QuestionType::MultipleChoice,
                question: "What is the capital of France?".to_string(),
                options: Some(vec!["Paris".to_string(), "Lyon".to_string()]),
                correct_answer: "Paris".into(),
                explanation: None,
                points: 2,
            }],
        }
    }

    #[test]
    fn test_points_table() {
        assert_eq!(QuestionType::MultipleChoice.points(), 2);
        assert_eq!(QuestionType::FillInTheBlank.points(), 2);
        assert_eq!(QuestionType::ShortAnswer.points(), 3);
        assert_eq!(QuestionType::TrueFalse.points(), 1);
    }

    #[test]
    fn test_validate_rejects_answer_outside_options() {
        let mut test = sample_test();
        assert!(test.validate().is_ok());

        test.questions[0].correct_answer = "Marseille".into();
        assert!(test.validate().is_err());
    }

    #[test]
    fn test_deserialize_uses_wire_field_names() {
        let json = r#"{
            "passage": "Text.",
            "questions": [
                {"type": "fill_in_the_blank", "question": "___ and ___", "correctAnswer": ["salt", "pepper"]},
                {"type": "true_false", "question": "Sky is blue", "options": ["True", "False"], "correctAnswer": "True", "points": 1}
            ]
        }"#;
        let mut test: FormattedReadingTest = serde_json::from_str(json).unwrap();
        assert_eq!(
            test.questions[0].correct_answer,
            CorrectAnswer::Multiple(vec!["salt".to_string(), "pepper".to_string()])
        );
        assert_eq!(test.questions[0].points, 0);

        test.questions[0].fill_default_points();
        assert_eq!(test.questions[0].points, 2);
        assert!(test.validate().is_ok());

        let value = serde_json::to_value(&test.questions[1]).unwrap();
        assert_eq!(value["type"], "true_false");
        assert_eq!(value["correctAnswer"], "True");
        assert!(value.get("explanation").is_none());
    }
}
