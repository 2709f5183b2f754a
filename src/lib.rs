//! # Shopify FAQ Gen
//!
//! 一个为 Shopify 产品目录批量生成 FAQ 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 产品、FAQ、画像、指标与统计的结构化定义
//! - `loaders` - 产品 CSV 的加载入口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次调用
//! - `TextMetrics` / `QualityScorer` - 词法指标与整组评分
//! - `QuestionBank` - 模板化问题生成（带历史软过滤）
//! - `LlmService` - LLM 生成能力（画像分析 / 回答 / 专家咨询）
//! - `AnswerShaper` - 回答长度整形
//! - `HistoryStore` - 问题指纹的持久化存储
//! - `ReportWriter` - CSV / 报告 / JSON 摘要导出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个产品"的完整处理流程
//! - `ProductCtx` - 上下文封装（handle + 序号）
//! - `FaqFlow` - 生成 → 评分 → 保留最佳 → 重试/提前结束
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量产品处理器，管理资源与统计
//! - `orchestrator/product_processor` - 单个产品处理器
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, GenerationError};
pub use models::{Faq, FaqBatch, Product, QualityTier};
pub use orchestrator::{process_product, App};
pub use services::{ContentSynthesizer, HistoryStore, LlmService, QualityScorer};
pub use workflow::{FaqFlow, FlowResult, LogProgress, ProductCtx, ProgressReporter};
