//! 结果缓存 - 基础设施层
//!
//! 进程内缓存：键为 主题 + 原文前缀，过期条目在读取时视为不存在，不做后台清理。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::models::FormattedReadingTest;

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub data: Arc<FormattedReadingTest>,
    pub timestamp: Instant,
}

/// 格式化结果缓存
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    key_prefix_chars: usize,
}

impl ResultCache {
    pub fn new(ttl: Duration, key_prefix_chars: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            key_prefix_chars,
        }
    }

    /// 计算缓存键：主题 + 原文前 N 个字符
    pub fn key_for(&self, topic: &str, raw_content: &str) -> String {
        let prefix: String = raw_content.chars().take(self.key_prefix_chars).collect();
        format!("{}{}", topic, prefix)
    }

    /// 读取缓存，过期条目视为不存在
    pub fn get(&self, key: &str) -> Option<Arc<FormattedReadingTest>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;
        if entry.timestamp.elapsed() >= self.ttl {
            debug!("缓存已过期: {}", key_preview(key));
            return None;
        }
        Some(Arc::clone(&entry.data))
    }

    /// 写入缓存，已有条目会被覆盖并刷新时间
    pub fn put(&self, key: String, data: Arc<FormattedReadingTest>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.clone(),
            CacheEntry {
                key,
                data,
                timestamp: Instant::now(),
            },
        );
    }

    /// 条目数量（包含尚未被覆盖的过期条目）
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key_preview(key: &str) -> String {
    crate::utils::logging::truncate_text(key, 40)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormattedQuestion;

    fn sample(passage: &str) -> Arc<FormattedReadingTest> {
        Arc::new(FormattedReadingTest {
            passage: passage.to_string(),
            questions: vec![FormattedQuestion::short_answer("Why?", "Because")],
        })
    }

    #[test]
    fn test_key_uses_topic_and_prefix() {
        let cache = ResultCache::new(Duration::from_secs(60), 5);
        assert_eq!(cache.key_for("Bees", "Honeybees live in hives"), "BeesHoney");

        let long_a = format!("{}tail-a", "x".repeat(10));
        let long_b = format!("{}tail-b", "x".repeat(10));
        assert_eq!(cache.key_for("t", &long_a), cache.key_for("t", &long_b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_put() {
        let cache = ResultCache::new(Duration::from_secs(60), 100);
        assert!(cache.get("k").is_none());

        let data = sample("Passage.");
        cache.put("k".to_string(), Arc::clone(&data));
        let hit = cache.get("k").unwrap();
        assert!(Arc::ptr_eq(&hit, &data));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_lazily() {
        let cache = ResultCache::new(Duration::from_secs(24 * 60 * 60), 100);
        cache.put("k".to_string(), sample("Passage."));

        tokio::time::advance(Duration::from_secs(23 * 60 * 60)).await;
        assert!(cache.get("k").is_some());

        tokio::time::advance(Duration::from_secs(60 * 60)).await;
        assert!(cache.get("k").is_none());
        // 过期条目不会被主动删除
        assert_eq!(cache.len(), 1);

        cache.put("k".to_string(), sample("Fresh."));
        assert_eq!(cache.get("k").unwrap().passage, "Fresh.");
    }
}
