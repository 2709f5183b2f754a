//! 产品处理上下文
//!
//! 封装"我正在处理第几个产品"这一信息

use std::fmt::Display;

/// 产品处理上下文
///
/// 包含处理单个产品所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct ProductCtx {
    /// 产品 Handle
    pub handle: String,

    /// 产品在本次运行中的序号（从1开始，仅用于日志显示）
    pub row_index: usize,

    /// 本次运行的产品总数
    pub total: usize,

    /// 产品名称
    pub title: String,
}

impl ProductCtx {
    /// 创建新的产品上下文
    pub fn new(handle: String, row_index: usize, total: usize, title: String) -> Self {
        Self {
            handle,
            row_index,
            total,
            title,
        }
    }
}

impl Display for ProductCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "产品 {}/{} #{}", self.row_index, self.total, self.handle)
    }
}
