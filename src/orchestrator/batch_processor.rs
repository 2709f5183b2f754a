//! 批量产品处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量产品的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、加载问题历史（失败即终止）
//! 2. **批量加载**：读取产品 CSV（`Vec<Product>`）
//! 3. **顺序处理**：一次一个产品、一次一个 LLM 调用，无并发
//! 4. **全局统计**：汇总成功/失败、评级分布、平均分与耗时
//! 5. **结果导出**：CSV + 质量报告 + JSON 摘要
//! 6. **历史持久化**：运行结束整体覆盖写回（失败即报错）
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个产品的细节
//! - **资源所有者**：唯一持有 HistoryStore 的模块
//! - **单行失败不中断**：行级错误记入清单，运行继续
//! - **向下委托**：委托 product_processor 处理单个产品

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::loaders::load_products_csv;
use crate::models::product::Product;
use crate::models::stats::{RowError, RunStats};
use crate::orchestrator::product_processor;
use crate::services::history_store::HistoryStore;
use crate::services::llm_service::LlmService;
use crate::services::report_writer::{FaqExportRow, ReportWriter};
use crate::workflow::faq_flow::FaqFlow;
use crate::workflow::product_ctx::ProductCtx;
use crate::workflow::progress::LogProgress;

/// 应用主结构
pub struct App {
    config: Config,
    store: HistoryStore,
    flow: FaqFlow<LlmService>,
}

impl App {
    /// 初始化应用
    ///
    /// 问题历史加载失败视为致命错误：静默丢失指纹会让
    /// 防重复机制失效，宁可启动失败。
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        config.validate()?;

        log_startup(&config);

        // 加载问题历史
        let mut store = HistoryStore::new(&config.cache_dir);
        store.load()?;

        // 创建生成流程（持有 LLM 服务）
        let synthesizer = LlmService::new(&config);
        let flow = FaqFlow::new(&config, synthesizer);

        Ok(Self { config, store, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<()> {
        // 加载所有待处理的产品
        let products = self.load_products()?;

        if products.is_empty() {
            warn!("⚠️ 没有找到待处理的产品，程序结束");
            return Ok(());
        }

        let total = products.len();
        log_products_loaded(total, self.config.max_attempts);

        // 顺序处理所有产品
        let (stats, rows, errors) = self.process_all_products(products).await;

        // 导出产物
        let writer = ReportWriter::new(&self.config);
        writer.write_all(&rows, &stats, &errors)?;

        // 持久化问题历史（整体覆盖写回）
        self.store.persist()?;

        // 输出最终统计
        print_final_stats(&stats, &self.config);

        Ok(())
    }

    /// 加载产品列表，按配置截断数量
    fn load_products(&self) -> Result<Vec<Product>> {
        info!("\n📁 正在读取产品 CSV...");
        let mut products = load_products_csv(Path::new(&self.config.csv_input_path))?;

        if self.config.product_limit > 0 && products.len() > self.config.product_limit {
            info!(
                "按配置截断产品数量: {} → {}",
                products.len(),
                self.config.product_limit
            );
            products.truncate(self.config.product_limit);
        }

        Ok(products)
    }

    /// 顺序处理所有产品
    ///
    /// 单个产品失败只记录行级错误，绝不中断整体运行。
    async fn process_all_products(
        &mut self,
        products: Vec<Product>,
    ) -> (RunStats, Vec<FaqExportRow>, Vec<RowError>) {
        let total = products.len();
        let mut stats = RunStats::start(total);
        let mut rows: Vec<FaqExportRow> = Vec::new();
        let mut errors: Vec<RowError> = Vec::new();
        let progress = LogProgress;

        for (index, product) in products.iter().enumerate() {
            let ctx = ProductCtx::new(
                product.handle.clone(),
                index + 1,
                total,
                product.title.clone(),
            );

            match product_processor::process_product(
                &self.flow,
                product,
                &ctx,
                &mut self.store,
                &progress,
            )
            .await
            {
                Ok(result) => {
                    stats.record_success(
                        result.metrics.quality_tier,
                        result.metrics.average_score,
                    );
                    rows.push(result.export_row);
                }
                Err(e) => {
                    error!("[{}] ❌ 处理失败: {}", ctx, e);
                    stats.record_failure();
                    errors.push(RowError {
                        handle: if product.handle.trim().is_empty() {
                            "Sin handle".to_string()
                        } else {
                            product.handle.clone()
                        },
                        product: if product.title.trim().is_empty() {
                            "Producto sin título".to_string()
                        } else {
                            product.title.clone()
                        },
                        error: e.to_string(),
                    });
                }
            }
        }

        stats.finish();

        (stats, rows, errors)
    }
}

// ========== 日志辅助函数 ==========

fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n产品 FAQ 生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 产品 FAQ 批量生成模式");
    info!("📊 每个产品最多尝试 {} 次", config.max_attempts);
    info!("🤖 模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

fn log_products_loaded(total: usize, max_attempts: usize) {
    info!("✓ 找到 {} 个待处理的产品", total);
    info!("📋 将逐个顺序处理，每个最多 {} 次尝试", max_attempts);
    info!("💡 未达标时保留历史最佳一组\n");
}

fn print_final_stats(stats: &RunStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.successful, stats.total_products);
    info!("❌ 失败: {}", stats.failed);
    info!("⭐ 平均质量分: {:.2}/20", stats.average_score());
    for tier in crate::models::faq::QualityTier::ALL_DESCENDING {
        let count = stats.tier_count(tier);
        if count > 0 {
            info!("   {} × {}", tier, count);
        }
    }
    info!("⏱️ 总耗时: {}", stats.elapsed_display());
    info!("{}", "=".repeat(60));
    info!("\n产物已保存至: {}", config.output_dir);
}
