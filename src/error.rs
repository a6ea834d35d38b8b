use thiserror::Error;

/// 应用程序错误类型
///
/// 远程调用和兜底解析的错误都在格式化流程内部消化，不会出现在这里。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// LLM 错误分类（仅用于日志和诊断，不影响流程走向）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// 限流 / 配额耗尽
    RateLimited,
    /// 网络或 API 调用失败
    Transport,
    /// 返回内容无法解析或结构不完整
    MalformedResponse,
    /// 调度器已关闭
    Internal,
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LlmErrorKind::RateLimited => "rate_limited",
            LlmErrorKind::Transport => "transport",
            LlmErrorKind::MalformedResponse => "malformed_response",
            LlmErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },

    /// 请求频率限制 / 配额耗尽
    #[error("LLM API请求频率限制 (模型: {model}): {message}")]
    RateLimited { model: String, message: String },

    /// 调用超时
    #[error("LLM API调用超时 (模型: {model}, {timeout_secs}秒)")]
    Timeout { model: String, timeout_secs: u64 },

    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },

    /// JSON 解析失败
    #[error("无法解析LLM返回的JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// 返回结构校验失败
    #[error("LLM返回结构校验失败: {reason}")]
    Validation { reason: String },

    /// 调度器在返回结果前被丢弃
    #[error("请求调度器已关闭")]
    SchedulerClosed,
}

/// 判定为限流的错误特征
const RATE_LIMIT_MARKERS: [&str; 5] = [
    "429",
    "too many requests",
    "resource exhausted",
    "resource_exhausted",
    "quota",
];

impl LlmError {
    /// 根据错误信息创建 API 调用错误，限流类错误会被单独标记
    pub fn from_api_failure(model: impl Into<String>, message: impl Into<String>) -> Self {
        let model = model.into();
        let message = message.into();
        if is_rate_limit_message(&message) {
            LlmError::RateLimited { model, message }
        } else {
            LlmError::ApiCallFailed { model, message }
        }
    }

    /// 创建结构校验错误
    pub fn validation(reason: impl Into<String>) -> Self {
        LlmError::Validation {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> LlmErrorKind {
        match self {
            LlmError::RateLimited { .. } => LlmErrorKind::RateLimited,
            LlmError::ApiCallFailed { .. }
            | LlmError::Timeout { .. }
            | LlmError::EmptyContent { .. } => LlmErrorKind::Transport,
            LlmError::InvalidJson(_) | LlmError::Validation { .. } => {
                LlmErrorKind::MalformedResponse
            }
            LlmError::SchedulerClosed => LlmErrorKind::Internal,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind() == LlmErrorKind::RateLimited
    }
}

fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// 兜底格式化内部错误
#[derive(Debug, Error)]
pub enum FormatError {
    /// 生成的结构不满足不变量
    #[error("生成的阅读测试结构无效: {reason}")]
    InvalidStructure { reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值无效
    #[error("配置项 {name} 的值 '{value}' 无效: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(name: &str, value: impl ToString, reason: &str) -> Self {
        ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
