//! FAQ 生成流程 - 流程层
//!
//! 核心职责：定义"一个产品"的完整生成-评分-重试流程
//!
//! 流程顺序：
//! 1. 画像分析（失败退回基础画像）
//! 2. 生成候选问题 → 逐条生成回答 → 整形 → 评分
//! 3. 保留历史最佳，评级达标提前结束，否则重试直至次数用尽
//!
//! 失败语义：
//! - 单条回答生成失败：丢弃该条，不单独重试
//! - 一次尝试凑不满 5 条：整次作废，继续下一次尝试
//! - 全部尝试都失败：返回空结果，由上层按行级错误处理

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::warn;

use crate::config::Config;
use crate::error::GenerationError;
use crate::models::faq::{AttemptRecord, BatchMetrics, Faq, FaqBatch};
use crate::models::product::Product;
use crate::models::profile::{BuyerPersona, ProductProfile};
use crate::services::answer_shaper::AnswerShaper;
use crate::services::history_store::HistoryStore;
use crate::services::llm_service::ContentSynthesizer;
use crate::services::quality_scorer::QualityScorer;
use crate::services::question_bank::{CandidateQuestion, QuestionBank};
use crate::workflow::product_ctx::ProductCtx;
use crate::workflow::progress::ProgressReporter;

/// 一个产品的最终生成结果
#[derive(Debug, Clone)]
pub struct FaqOutcome {
    pub batch: FaqBatch,
    pub metrics: BatchMetrics,
    pub profile: ProductProfile,
    /// 本次选中的买家画像
    pub buyer_persona: &'static str,
}

/// 流程返回值：最佳结果（可能为空）加完整尝试历史
#[derive(Debug)]
pub struct FlowResult {
    pub best: Option<FaqOutcome>,
    pub history: Vec<AttemptRecord>,
}

/// FAQ 生成流程
///
/// - 编排完整的生成-评分-重试循环
/// - 决定何时重试、何时提前结束
/// - 只依赖业务能力（services）
/// - 不持有产品列表，也不做行级统计
pub struct FaqFlow<S: ContentSynthesizer> {
    synthesizer: S,
    question_bank: QuestionBank,
    scorer: QualityScorer,
    shaper: AnswerShaper,
    max_attempts: usize,
    attempt_pause: Duration,
}

impl<S: ContentSynthesizer> FaqFlow<S> {
    /// 创建新的生成流程
    pub fn new(config: &Config, synthesizer: S) -> Self {
        Self {
            synthesizer,
            question_bank: QuestionBank::new(),
            scorer: QualityScorer::new(config),
            shaper: AnswerShaper::new(),
            max_attempts: config.max_attempts,
            attempt_pause: Duration::from_millis(config.attempt_pause_ms),
        }
    }

    /// 为一个产品生成 FAQ
    ///
    /// # 参数
    /// - `product`: 产品记录
    /// - `ctx`: 产品上下文（用于日志）
    /// - `store`: 问题历史存储（软性防重复）
    /// - `progress`: 进度上报通道
    ///
    /// # 返回
    /// 历次尝试中平均分最高的一组 FAQ；所有尝试都失败时 best 为空
    pub async fn run(
        &self,
        product: &Product,
        ctx: &ProductCtx,
        store: &mut HistoryStore,
        progress: &dyn ProgressReporter,
    ) -> FlowResult {
        let mut rng = rand::rng();

        // ========== 画像分析 ==========
        progress.report("🔍 正在深度分析产品...");

        let profile = match self.synthesizer.analyze_product(product).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("[{}] 画像分析失败，退回基础画像: {}", ctx, e);
                ProductProfile::basic_fallback(product)
            }
        };

        // 本产品随机选定一种买家画像
        let persona = BuyerPersona::pick(&mut rng);

        let mut best: Option<FaqOutcome> = None;
        let mut best_score = f64::NEG_INFINITY;
        let mut history: Vec<AttemptRecord> = Vec::new();

        // ========== 生成-评分-重试循环 ==========
        for attempt in 1..=self.max_attempts {
            progress.report(&format!(
                "🎯 生成 FAQ（第 {}/{} 次尝试）",
                attempt, self.max_attempts
            ));

            // 候选问题不足：整次作废，继续下一次尝试
            let questions =
                self.question_bank
                    .generate_questions(product, &profile, store, &mut rng);
            if questions.len() < FaqBatch::SIZE {
                let shortfall = GenerationError::QuestionShortfall {
                    produced: questions.len(),
                    required: FaqBatch::SIZE,
                };
                warn!("[{}] {}，放弃本次尝试", ctx, shortfall);
                continue;
            }

            // 逐条生成回答；凑不满 5 条时整次作废
            let Some(batch) = self
                .build_batch(&questions, product, &profile, persona, ctx, &mut rng)
                .await
            else {
                continue;
            };

            let metrics = self.scorer.score_batch(&batch);

            // 只有完成评分的尝试才进入历史
            history.push(AttemptRecord {
                attempt_number: attempt,
                quality_tier: metrics.quality_tier,
                average_score: metrics.average_score,
                metrics: metrics.clone(),
            });

            // 保留历史最佳（分数只增不减）
            if metrics.average_score > best_score {
                best_score = metrics.average_score;
                best = Some(FaqOutcome {
                    batch,
                    metrics: metrics.clone(),
                    profile: profile.clone(),
                    buyer_persona: persona.id,
                });
            }

            progress.report(&format!(
                "✨ 质量评级: {}（平均分 {:.1}/20）",
                metrics.quality_tier, metrics.average_score
            ));

            // 评级达标，提前结束
            if metrics.quality_tier.is_premium() {
                progress.report(&format!("🏆 达到 {} 评级！", metrics.quality_tier));
                break;
            }

            // 尝试之间稍作等待（对外部服务的礼貌限速），最后一次不等待
            if attempt < self.max_attempts {
                sleep(self.attempt_pause).await;
            }
        }

        FlowResult { best, history }
    }

    /// 为一组候选问题逐条生成回答
    ///
    /// 单条失败只丢弃该条；完成数不足 5 条时返回 None
    async fn build_batch(
        &self,
        questions: &[CandidateQuestion],
        product: &Product,
        profile: &ProductProfile,
        persona: &'static BuyerPersona,
        ctx: &ProductCtx,
        rng: &mut impl Rng,
    ) -> Option<FaqBatch> {
        let mut faqs = Vec::with_capacity(FaqBatch::SIZE);

        for (index, question) in questions.iter().take(FaqBatch::SIZE).enumerate() {
            match self
                .synthesizer
                .generate_answer(question, product, profile, persona)
                .await
            {
                Ok(answer) => {
                    let shaped = self.shaper.shape(answer, profile, rng);
                    faqs.push(Faq {
                        question: question.text.clone(),
                        answer: shaped,
                    });
                }
                Err(e) => {
                    warn!("[{}] 第 {} 条 FAQ 生成失败，跳过: {}", ctx, index + 1, e);
                }
            }
        }

        if faqs.len() < FaqBatch::SIZE {
            warn!(
                "[{}] 仅完成 {}/{} 条 FAQ，放弃本次尝试",
                ctx,
                faqs.len(),
                FaqBatch::SIZE
            );
            return None;
        }

        FaqBatch::from_faqs(faqs)
    }
}
