use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次 LLM 调用的超时时间（秒）
    pub request_timeout_secs: u64,
    // --- 调度与缓存 ---
    /// 两次 LLM 调用之间的最小间隔（秒）
    pub min_request_interval_secs: u64,
    /// 缓存有效期（秒）
    pub cache_ttl_secs: u64,
    /// 缓存键中截取原文的字符数
    pub cache_key_prefix_chars: usize,
    /// 批量格式化时的最大并发任务数
    pub max_concurrent_jobs: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.0-flash".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 4096,
            request_timeout_secs: 60,
            min_request_interval_secs: 10,
            cache_ttl_secs: 24 * 60 * 60,
            cache_key_prefix_chars: 100,
            max_concurrent_jobs: 4,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            min_request_interval_secs: std::env::var("MIN_REQUEST_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.min_request_interval_secs),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.cache_ttl_secs),
            cache_key_prefix_chars: std::env::var("CACHE_KEY_PREFIX_CHARS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.cache_key_prefix_chars),
            max_concurrent_jobs: std::env::var("MAX_CONCURRENT_JOBS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_jobs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 检查配置值是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs", self.request_timeout_secs, "必须大于 0"));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::invalid("cache_ttl_secs", self.cache_ttl_secs, "必须大于 0"));
        }
        if self.cache_key_prefix_chars == 0 {
            return Err(ConfigError::invalid("cache_key_prefix_chars", self.cache_key_prefix_chars, "必须大于 0"));
        }
        if self.max_concurrent_jobs == 0 {
            return Err(ConfigError::invalid("max_concurrent_jobs", self.max_concurrent_jobs, "必须大于 0"));
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(ConfigError::invalid("llm_temperature", self.llm_temperature, "必须在 [0, 2] 范围内"));
        }
        Ok(())
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_secs(self.min_request_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
