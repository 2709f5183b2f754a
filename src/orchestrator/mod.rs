//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量产品处理器
//! - 管理应用生命周期（初始化、运行、导出、收尾）
//! - 批量加载产品（Vec<Product>）
//! - 顺序处理，一次一个产品
//! - 持有 HistoryStore，运行结束统一持久化
//! - 输出全局统计信息
//!
//! ### `product_processor` - 单个产品处理器
//! - 校验并处理单个 Product
//! - 委托 FaqFlow 执行生成-重试循环
//! - 把最佳结果转成导出行
//! - 输出单个产品的尝试历史
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Product>)
//!     ↓
//! product_processor (处理单个 Product)
//!     ↓
//! workflow::FaqFlow (生成-评分-重试循环)
//!     ↓
//! services (能力层：question_bank / llm / scorer / shaper / store)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，product_processor 管单个
//! 2. **资源隔离**：只有编排层持有 HistoryStore
//! 3. **向下依赖**：编排层 → workflow → services
//! 4. **无业务逻辑**：只做调度和统计，不做具体评分判断

pub mod batch_processor;
pub mod product_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use product_processor::{process_product, ProductResult};
