//! 批量格式化 - 编排层
//!
//! ## 职责
//!
//! 1. **并发控制**：使用 Semaphore 限制同时进行的格式化任务数
//! 2. **结果保序**：返回结果与输入任务一一对应
//! 3. **兜底补齐**：任务异常退出时用本地解析结果补位，整批不会失败
//!
//! 所有任务共用同一个格式化器，因此远程调用仍由同一个调度器串行限速。

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::models::FormattedReadingTest;
use crate::services::format_fallback;
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::ReadingTestFormatter;

/// 单个格式化任务
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatJob {
    pub topic: String,
    pub raw_content: String,
}

impl FormatJob {
    pub fn new(topic: impl Into<String>, raw_content: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            raw_content: raw_content.into(),
        }
    }
}

/// 批量格式化，结果顺序与 `jobs` 一致
pub async fn format_batch(
    formatter: Arc<ReadingTestFormatter>,
    jobs: Vec<FormatJob>,
    max_concurrent: usize,
) -> Vec<Arc<FormattedReadingTest>> {
    let total = jobs.len();
    let max_concurrent = max_concurrent.max(1);
    log_batch_start(total, max_concurrent);

    let semaphore = Arc::new(Semaphore::new(max_concurrent));
    let mut handles = Vec::with_capacity(total);

    for (idx, job) in jobs.into_iter().enumerate() {
        let job_index = idx + 1;
        let formatter = Arc::clone(&formatter);
        let semaphore = Arc::clone(&semaphore);
        let job_clone = job.clone();

        let handle = tokio::spawn(async move {
            // 信号量不会被关闭，获取失败时直接继续
            let _permit = semaphore.acquire_owned().await.ok();
            info!("[任务 {}] 📝 开始格式化: {}", job_index, job_clone.topic);
            formatter
                .format_reading_test(&job_clone.raw_content, &job_clone.topic)
                .await
        });
        handles.push((job_index, job, handle));
    }

    let mut results = Vec::with_capacity(total);
    let mut recovered = 0;

    for (job_index, job, handle) in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                error!("[任务 {}] ❌ 任务执行失败: {}", job_index, e);
                recovered += 1;
                results.push(Arc::new(format_fallback(&job.raw_content, &job.topic)));
            }
        }
    }

    log_batch_complete(total - recovered, recovered, total);
    results
}
