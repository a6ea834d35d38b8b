//! # Reading Test Formatter
//!
//! 把杂乱的阅读测试原文（文章 + 题目 + 答案）整理为结构化、可自动判分的测验
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有共享状态，只暴露能力
//! - `RequestScheduler` - 远程调用的唯一入口，FIFO 排队、单飞、限速
//! - `ResultCache` - 按 主题 + 原文前缀 缓存结果，过期惰性判断
//!
//! ### ② 文本处理层（Text）
//! - `text/` - 纯函数，不做 IO
//! - `normalizer` - 空格、换行、分段
//! - `question_extractor` - 题目切分、题型识别、答案解析
//!
//! ### ③ 业务能力层（Services）
//! - `RemoteFormatter` - 调用远程服务并校验返回结构
//! - `format_fallback` - 本地兜底解析，任何输入都能得到合法结果
//! - `convert_to_quiz_questions` - 转为测验题目
//! - `grade_response` - 自动判分
//!
//! ### ④ 流程层（Workflow）
//! - `ReadingTestFormatter` - 单篇流程（缓存 → 远程 → 兜底），对调用方不会失败
//!
//! ### ⑤ 编排层（Orchestration）
//! - `format_batch` - 批量任务并发调度
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod text;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ChatBackend, LlmClient};
pub use config::Config;
pub use error::{AppError, AppResult, LlmError};
pub use models::{
    FormattedQuestion, FormattedReadingTest, GradeOutcome, QuestionType, QuizQuestion,
    QuizResponse,
};
pub use orchestrator::{format_batch, FormatJob};
pub use services::{convert_to_quiz_questions, format_fallback, grade_response};
pub use workflow::{FormatterStats, ReadingTestFormatter};
