use serde::{Deserialize, Serialize};

use crate::models::reading_test::QuestionType;

/// 可用于判分的测验题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// 从 1 开始的题目顺序
    pub order: usize,
    pub question: String,
    pub points: u32,
    #[serde(flatten)]
    pub payload: QuizPayload,
}

/// 按题型区分的判分数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizPayload {
    /// 选择题 / 判断题
    #[serde(rename_all = "camelCase")]
    Choice {
        options: Vec<QuizOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correct_option_index: Option<usize>,
    },
    /// 填空题
    FillInTheBlank { blanks: Vec<BlankDefinition> },
    /// 简答题
    #[serde(rename_all = "camelCase")]
    ShortAnswer {
        keywords: Vec<String>,
        requires_manual_grading: bool,
    },
}

/// 选项（id 为 A、B、C…）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

/// 单个空位的定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankDefinition {
    /// 从 1 开始的空位序号
    pub position: usize,
    pub correct_answers: Vec<String>,
    pub case_sensitive: bool,
}

/// 学生作答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizResponse {
    /// 选项标签（"B"）或选项文本
    Choice(String),
    /// 按空位顺序的作答
    Blanks(Vec<String>),
    /// 简答内容
    Text(String),
}

/// 判分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeOutcome {
    /// 自动判分得到的分数
    Scored { awarded: u32, possible: u32 },
    /// 需要人工批改
    NeedsManualReview,
}
