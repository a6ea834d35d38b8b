/// 日志工具模块
///
/// 提供日志初始化和日志格式化的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 日志级别由 `RUST_LOG` 控制，默认 `info`。重复调用不会报错。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// 记录格式化服务启动信息
///
/// # 参数
/// - `model`: 模型名称
/// - `min_interval_secs`: 两次调用的最小间隔
/// - `cache_ttl_secs`: 缓存有效期
pub fn log_startup(model: &str, min_interval_secs: u64, cache_ttl_secs: u64) {
    info!("{}", "=".repeat(60));
    info!("🚀 阅读测试格式化服务启动");
    info!("🤖 模型: {}", model);
    info!("⏱️ 调用间隔: {} 秒, 缓存有效期: {} 秒", min_interval_secs, cache_ttl_secs);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `total`: 任务总数
/// - `max_concurrent`: 最大并发数
pub fn log_batch_start(total: usize, max_concurrent: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量格式化: 共 {} 篇, 最大并发 {}", total, max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `completed`: 正常完成数量
/// - `recovered`: 任务异常后由兜底解析补齐的数量
/// - `total`: 任务总数
pub fn log_batch_complete(completed: usize, recovered: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 批量格式化完成: 正常 {}/{}", completed, total);
    if recovered > 0 {
        info!("🛟 兜底补齐: {}", recovered);
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
