pub mod request_scheduler;
pub mod result_cache;

pub use request_scheduler::RequestScheduler;
pub use result_cache::{CacheEntry, ResultCache};
