//! 单个产品处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单个产品，是产品级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **前置校验**：拒绝缺少 Handle 的行
//! 2. **流程调度**：委托 FaqFlow 执行生成-重试循环
//! 3. **结果转换**：把最佳结果转成导出行
//! 4. **统计输出**：记录单个产品的尝试历史摘要

use tracing::info;

use crate::error::{AppError, AppResult, BusinessError};
use crate::models::faq::BatchMetrics;
use crate::models::product::Product;
use crate::services::history_store::HistoryStore;
use crate::services::llm_service::ContentSynthesizer;
use crate::services::report_writer::FaqExportRow;
use crate::utils::logging::truncate_text;
use crate::workflow::faq_flow::FaqFlow;
use crate::workflow::product_ctx::ProductCtx;
use crate::workflow::progress::ProgressReporter;

/// 单个产品的处理结果
#[derive(Debug)]
pub struct ProductResult {
    pub export_row: FaqExportRow,
    pub metrics: BatchMetrics,
}

/// 处理单个产品
///
/// # 参数
/// - `flow`: FAQ 生成流程（复用，不重复构建）
/// - `product`: 产品记录
/// - `ctx`: 产品上下文
/// - `store`: 问题历史存储
/// - `progress`: 进度上报通道
///
/// # 返回
/// 成功返回导出行与指标；失败返回行级错误，由上层记录后继续
pub async fn process_product<S: ContentSynthesizer>(
    flow: &FaqFlow<S>,
    product: &Product,
    ctx: &ProductCtx,
    store: &mut HistoryStore,
    progress: &dyn ProgressReporter,
) -> AppResult<ProductResult> {
    if product.handle.trim().is_empty() {
        return Err(AppError::Business(BusinessError::EmptyHandle {
            row_index: ctx.row_index,
        }));
    }

    log_product_start(ctx);

    let result = flow.run(product, ctx, store, progress).await;

    log_attempt_history(ctx, &result.history);

    let Some(outcome) = result.best else {
        return Err(AppError::Business(BusinessError::NoBatchCompleted {
            handle: product.handle.clone(),
            attempts: result.history.len(),
        }));
    };

    info!(
        "[{}] ✅ 完成：评级 {}，平均分 {:.2}，买家画像 {}",
        ctx, outcome.metrics.quality_tier, outcome.metrics.average_score, outcome.buyer_persona
    );

    Ok(ProductResult {
        export_row: FaqExportRow::from_batch(&product.handle, &outcome.batch),
        metrics: outcome.metrics,
    })
}

// ========== 日志辅助函数 ==========

fn log_product_start(ctx: &ProductCtx) {
    info!("\n[{}] {}", ctx, "─".repeat(30));
    info!("[{}] 名称: {}", ctx, truncate_text(&ctx.title, 50));
}

fn log_attempt_history(ctx: &ProductCtx, history: &[crate::models::faq::AttemptRecord]) {
    for record in history {
        info!(
            "[{}] 尝试 {}: {}（平均分 {:.2}，重复率 {:.2}，主题多样性 {:.2}）",
            ctx,
            record.attempt_number,
            record.quality_tier,
            record.average_score,
            record.metrics.repetition_ratio,
            record.metrics.topical_diversity
        );
    }
}
