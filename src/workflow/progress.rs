//! 进度上报通道
//!
//! 从流程层到调用方的单向文本反馈：只发不收，没有背压，
//! 也不消费任何返回值。

use tracing::info;

/// 进度上报器
pub trait ProgressReporter: Send + Sync {
    /// 上报一条进度消息（即发即弃）
    fn report(&self, message: &str);
}

/// 默认实现：写入 tracing 日志
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, message: &str) {
        info!("{}", message);
    }
}
