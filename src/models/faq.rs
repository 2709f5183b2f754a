//! FAQ 核心数据结构
//!
//! 一个产品一次尝试产出一组 5 条 FAQ，评分后整组不可变；
//! 重试会整组替换，从不单条修补。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单条 FAQ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// 一组 FAQ（固定 5 条）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqBatch {
    faqs: [Faq; 5],
}

impl FaqBatch {
    /// 每组 FAQ 的固定数量
    pub const SIZE: usize = 5;

    /// 从完整的 5 条 FAQ 构建一组；数量不足返回 None
    pub fn from_faqs(faqs: Vec<Faq>) -> Option<Self> {
        let faqs: [Faq; Self::SIZE] = faqs.try_into().ok()?;
        Some(Self { faqs })
    }

    pub fn faqs(&self) -> &[Faq; Self::SIZE] {
        &self.faqs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Faq> {
        self.faqs.iter()
    }
}

/// 质量评级
///
/// 按平均分从高到低匹配首个阈值。单条 FAQ 的理论满分是 23，
/// 但评级阶梯按经验平均分标定在 18 封顶，保持原有标定不做缩放。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    Insuficiente,
    Aceptable,
    Buena,
    Excelente,
    Excepcional,
    Legendaria,
}

impl QualityTier {
    /// 所有评级，从高到低（用于统计输出）
    pub const ALL_DESCENDING: [QualityTier; 6] = [
        QualityTier::Legendaria,
        QualityTier::Excepcional,
        QualityTier::Excelente,
        QualityTier::Buena,
        QualityTier::Aceptable,
        QualityTier::Insuficiente,
    ];

    /// 按平均分评定等级，阈值从高到低依次匹配
    pub fn from_average(average_score: f64) -> Self {
        if average_score >= 18.0 {
            QualityTier::Legendaria
        } else if average_score >= 15.0 {
            QualityTier::Excepcional
        } else if average_score >= 12.0 {
            QualityTier::Excelente
        } else if average_score >= 9.0 {
            QualityTier::Buena
        } else if average_score >= 6.0 {
            QualityTier::Aceptable
        } else {
            QualityTier::Insuficiente
        }
    }

    /// 导出产物中使用的标签
    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Legendaria => "LEGENDARIA",
            QualityTier::Excepcional => "EXCEPCIONAL",
            QualityTier::Excelente => "EXCELENTE",
            QualityTier::Buena => "BUENA",
            QualityTier::Aceptable => "ACEPTABLE",
            QualityTier::Insuficiente => "INSUFICIENTE",
        }
    }

    /// 是否达到可提前结束重试的等级
    pub fn is_premium(&self) -> bool {
        matches!(self, QualityTier::Excepcional | QualityTier::Legendaria)
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 单条 FAQ 的指标记录
#[derive(Debug, Clone, Serialize)]
pub struct FaqMetrics {
    /// 回答长度（字符数）
    pub answer_length: usize,
    /// 问题词数
    pub question_word_count: usize,
    /// 带单位的数字数据个数
    pub numeric_data_count: usize,
    /// 命中的专业术语个数
    pub technical_term_count: usize,
    /// 是否含使用指引
    pub has_instruction: bool,
    /// 具体性比率 [0,1]
    pub specificity_ratio: f64,
    /// 词汇多样性 [0,1]
    pub lexical_diversity: f64,
    /// 是否含对比表述
    pub has_comparison: bool,
    /// 问句格式是否规范
    pub well_formed_question: bool,
    /// 累加得分 [0,23]
    pub score: f64,
}

/// 一组 FAQ 的整体指标
#[derive(Debug, Clone, Serialize)]
pub struct BatchMetrics {
    /// 逐条指标（5 条）
    pub per_faq: Vec<FaqMetrics>,
    pub total_score: f64,
    pub average_score: f64,
    pub quality_tier: QualityTier,
    /// 句子重复率 [0,1]
    pub repetition_ratio: f64,
    /// 主题多样性 [0,1]
    pub topical_diversity: f64,
    pub is_valid: bool,
}

/// 单次尝试记录
///
/// 只记录完成评分的尝试，追加后不再修改。
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub attempt_number: usize,
    pub quality_tier: QualityTier,
    pub average_score: f64,
    pub metrics: BatchMetrics,
}
