//! 阅读测试格式化流程 - 流程层
//!
//! 核心职责：定义"一篇阅读测试"的完整格式化流程
//!
//! 流程顺序：
//! 1. 查缓存，命中直接返回
//! 2. 构建提示词 → 调度器排队 → 远程格式化
//! 3. 远程失败（限流 / 网络 / 返回格式错误）→ 本地兜底解析
//!
//! 无论走哪条路径，结果都会写入缓存；对调用方来说本流程不会失败。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::{ChatBackend, LlmClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{RequestScheduler, ResultCache};
use crate::models::FormattedReadingTest;
use crate::services::{format_fallback, RemoteFormatter};
use crate::utils::logging::{log_startup, truncate_text};
use crate::workflow::prompt::build_format_prompt;

/// 各条路径的累计次数，仅用于诊断
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatterStats {
    pub cache_hits: usize,
    pub remote_successes: usize,
    pub fallbacks: usize,
}

#[derive(Default)]
struct StatCounters {
    cache_hits: AtomicUsize,
    remote_successes: AtomicUsize,
    fallbacks: AtomicUsize,
}

/// 阅读测试格式化器
///
/// - 持有缓存和调度器，不使用任何全局状态
/// - 对外只暴露 `format_reading_test`，任何输入都返回合法结果
pub struct ReadingTestFormatter {
    cache: ResultCache,
    scheduler: RequestScheduler,
    stats: StatCounters,
    verbose_logging: bool,
}

impl ReadingTestFormatter {
    /// 使用配置中的 LLM 服务创建格式化器
    pub fn new(config: &Config) -> AppResult<Self> {
        let backend: Arc<dyn ChatBackend> = Arc::new(LlmClient::new(config));
        Self::with_backend(config, backend)
    }

    /// 使用指定的远程服务创建格式化器
    pub fn with_backend(config: &Config, backend: Arc<dyn ChatBackend>) -> AppResult<Self> {
        config.validate()?;

        log_startup(
            &config.llm_model_name,
            config.min_request_interval_secs,
            config.cache_ttl_secs,
        );

        Ok(Self {
            cache: ResultCache::new(config.cache_ttl(), config.cache_key_prefix_chars),
            scheduler: RequestScheduler::new(
                RemoteFormatter::new(backend),
                config.min_request_interval(),
            ),
            stats: StatCounters::default(),
            verbose_logging: config.verbose_logging,
        })
    }

    /// 格式化一篇阅读测试
    ///
    /// 同一 (主题, 原文前缀) 在缓存有效期内最多触发一次远程调用或兜底解析。
    pub async fn format_reading_test(
        &self,
        raw_content: &str,
        topic: &str,
    ) -> Arc<FormattedReadingTest> {
        let key = self.cache.key_for(topic, raw_content);

        if let Some(cached) = self.cache.get(&key) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            info!("✓ 命中缓存: {}", topic);
            return cached;
        }

        if self.verbose_logging {
            debug!("原文预览: {}", truncate_text(raw_content, 80));
        }

        let prompt = build_format_prompt(raw_content, topic);
        let result = match self.scheduler.enqueue(prompt).await {
            Ok(test) => {
                self.stats.remote_successes.fetch_add(1, Ordering::Relaxed);
                info!("✓ 远程格式化完成: {} ({} 道题)", topic, test.questions.len());
                test
            }
            Err(e) => {
                self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
                warn!("⚠️ 远程格式化失败 ({}), 使用本地解析: {}", e.kind(), e);
                format_fallback(raw_content, topic)
            }
        };

        let result = Arc::new(result);
        self.cache.put(key, Arc::clone(&result));
        result
    }

    pub fn stats(&self) -> FormatterStats {
        FormatterStats {
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            remote_successes: self.stats.remote_successes.load(Ordering::Relaxed),
            fallbacks: self.stats.fallbacks.load(Ordering::Relaxed),
        }
    }
}
