//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量任务的并发调度，不做任何格式化判断。
//!
//! ## 层次关系
//!
//! ```text
//! batch_formatter (处理 Vec<FormatJob>)
//!     ↓
//! workflow::ReadingTestFormatter (处理单篇阅读测试：缓存 → 远程 → 兜底)
//!     ↓
//! services (能力层：remote / fallback / quiz / grader)
//!     ↓
//! infrastructure (基础设施：RequestScheduler、ResultCache)
//! ```

pub mod batch_formatter;

pub use batch_formatter::{format_batch, FormatJob};
